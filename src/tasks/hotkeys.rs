//! Console hotkey background task

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::commands::{Action, Command, CommandSender};

/// Read one key per line and forward the bound action to the controller.
///
/// Stops after a quit key, at end of input, or when the controller is gone.
pub async fn hotkey_task<R>(input: R, commands: CommandSender)
where
    R: AsyncBufRead + Unpin,
{
    info!("Starting hotkey task (s=start p=pause x=reset space=extend g=start-game esc=quit)");

    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Hotkey input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read hotkey input: {}", e);
                break;
            }
        };

        let Some(action) = Action::from_hotkey(&line) else {
            debug!("No action bound to {:?}", line);
            continue;
        };

        debug!("Hotkey {:?} -> {}", line, action);
        if commands
            .send(Command::Action {
                action,
                reply: None,
            })
            .await
            .is_err()
        {
            warn!("Clock controller is gone, stopping hotkey task");
            break;
        }

        if action == Action::Quit {
            break;
        }
    }
}
