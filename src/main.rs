//! Shot Clock - A shot clock controller service
//!
//! This is the main entry point for the shot-clock application.

use std::{collections::HashMap, sync::Arc};
use tokio::{io::BufReader, net::TcpListener};
use tracing::info;

use shot_clock::{
    api::create_router,
    commands::{create_command_channel, Command},
    config::Config,
    engine::{AlertTrigger, ChannelSurface, DisplayFrame, DisplaySync, TimerEngine, TokioScheduler},
    services::{create_audio_channel, AccessGate, AudioService},
    state::{AppState, TimerState},
    tasks::{hotkey_task, ClockController},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("shot_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting shot-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, start={}s, shot={}s, extension={}s, alert_at={}s",
          config.host, config.port, config.start_value, config.shot_duration,
          config.extension, config.alert_at);

    // Stdin is shared by the access prompt and the hotkeys
    let mut stdin = BufReader::new(tokio::io::stdin());

    // The controller is only created once the access gate has passed
    let gate = AccessGate::from_env(config.access_code_env.as_deref())
        .map_err(anyhow::Error::msg)?;
    if let Err(e) = gate.challenge(&mut stdin, tokio::io::stdout()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let features = config.features();
    let clock_config = config.clock_config();

    // Alert playback runs on its own task
    let (audio_tx, audio_rx) = create_audio_channel();
    tokio::spawn(AudioService::new(audio_rx).run());

    // Controller display always, spectator display when enabled
    let mut display = DisplaySync::new();
    let mut displays = HashMap::new();
    let blank = DisplayFrame::project(&TimerState::stopped(0), &clock_config);
    let mut surface_names = vec!["controller"];
    if features.secondary_display {
        surface_names.push("spectator");
    }
    for name in surface_names {
        let (surface, rx) = ChannelSurface::new(name, blank.clone());
        display.register(Box::new(surface));
        displays.insert(name.to_string(), rx);
    }

    // Create the engine and its controller task
    let (command_tx, command_rx) = create_command_channel();
    let engine = TimerEngine::new(
        clock_config,
        features,
        TokioScheduler::new(command_tx.clone(), Command::Tick),
        AlertTrigger::new(Box::new(audio_tx)),
        display,
    )
    .with_tick_interval(config.tick_interval());

    let controller = ClockController::new(engine, command_rx);
    let snapshot_rx = controller.subscribe_snapshots();
    let quit_rx = controller.subscribe_quit();
    tokio::spawn(controller.run());

    if !config.no_hotkeys {
        let hotkey_tx = command_tx.clone();
        tokio::spawn(async move {
            hotkey_task(stdin, hotkey_tx).await;
        });
    }

    // Create HTTP router with all endpoints
    let state = Arc::new(AppState::new(
        command_tx,
        snapshot_rx,
        displays,
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start-game    - Load the start-game value");
    info!("  POST /start         - Start the countdown");
    info!("  POST /pause         - Pause the countdown");
    info!("  POST /reset         - Load the shot duration");
    info!("  POST /extend        - Add the extension (or {{\"amount\": n}})");
    info!("  POST /quit          - Stop the clock and exit");
    info!("  PUT  /config        - Edit settings while stopped");
    info!("  POST /config/focus  - Switch edit/hotkey mode");
    info!("  GET  /display/:name - Latest display frame");
    info!("  GET  /status        - Clock status");
    info!("  GET  /health        - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal(quit_rx) => {
            info!("Shutdown requested");
        }
    }

    info!("Server shutdown complete");

    // A pending stdin read would keep the runtime from shutting down
    std::process::exit(0)
}
