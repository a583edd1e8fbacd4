//! Optional access gate checked before the controller starts
//!
//! The expected code comes from the environment (typically injected by a
//! secret store), never from the binary. How the operator receives the code
//! is outside this service.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGate {
    /// No precondition
    Open,
    /// Operator must type this code
    SharedCode { expected: String },
}

impl AccessGate {
    /// Build the gate from the name of an environment variable holding the code
    pub fn from_env(var: Option<&str>) -> Result<Self, String> {
        let Some(var) = var else {
            return Ok(AccessGate::Open);
        };
        let expected = std::env::var(var)
            .map_err(|e| format!("Access code variable {} is not usable: {}", var, e))?;
        let expected = expected.trim().to_string();
        if expected.is_empty() {
            return Err(format!("Access code variable {} is empty", var));
        }
        Ok(AccessGate::SharedCode { expected })
    }

    pub fn verify(&self, attempt: &str) -> bool {
        match self {
            AccessGate::Open => true,
            AccessGate::SharedCode { expected } => attempt.trim() == expected,
        }
    }

    /// Prompt for the code on `output` and read one line from `input`
    pub async fn challenge<R, W>(&self, input: R, mut output: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if *self == AccessGate::Open {
            return Ok(());
        }

        output
            .write_all(b"Access code: ")
            .await
            .map_err(|e| format!("Failed to prompt for access code: {}", e))?;
        output
            .flush()
            .await
            .map_err(|e| format!("Failed to prompt for access code: {}", e))?;

        let attempt = input
            .lines()
            .next_line()
            .await
            .map_err(|e| format!("Failed to read access code: {}", e))?
            .unwrap_or_default();

        if self.verify(&attempt) {
            info!("Access granted");
            Ok(())
        } else {
            warn!("Access denied");
            Err("Invalid access code".to_string())
        }
    }
}
