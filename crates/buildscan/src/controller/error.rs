use thiserror::Error;

use super::state::Lifecycle;
use crate::model::ValidationError;
use crate::transport::TransportError;

/// Errors reported by the lifecycle controller.
///
/// Only `Validation`, `Upload` and `JobFailed` are meant for the user;
/// `TransientPoll` is logged and retried on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Upload { message: String },

    #[error("Poll failed, retrying on next tick: {0}")]
    TransientPoll(TransportError),

    #[error("{message}")]
    JobFailed { message: String },

    #[error("Cannot {action} while {state}")]
    InvalidState {
        state: Lifecycle,
        action: &'static str,
    },

    /// A new scan started while this operation was in flight.
    #[error("Operation superseded by a newer scan")]
    Superseded,
}

impl ControllerError {
    /// Whether this error belongs in the user-facing error banner.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ControllerError::Validation(_)
                | ControllerError::Upload { .. }
                | ControllerError::JobFailed { .. }
        )
    }
}
