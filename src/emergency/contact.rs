//! Emergency contact action

use std::process::Command;

use tracing::{error, info};

/// Errors from an emergency contact attempt
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Reaches an emergency service. May block.
pub trait EmergencyContact: Send + Sync {
    fn contact(&self, identifier: &str) -> Result<(), ContactError>;
}

/// Hands the identifier (e.g. a `tel:` URI) to an opener program such as `xdg-open`
#[derive(Debug, Clone)]
pub struct OpenerContact {
    program: String,
}

impl OpenerContact {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl EmergencyContact for OpenerContact {
    fn contact(&self, identifier: &str) -> Result<(), ContactError> {
        info!(program = %self.program, identifier, "contacting emergency service");

        let status = Command::new(&self.program)
            .arg(identifier)
            .status()
            .map_err(|source| ContactError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            error!(%status, "emergency contact command failed");
            Err(ContactError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}
