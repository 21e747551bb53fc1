//! Typed errors for the timeout correction path.
//!
//! Run-level failures use `anyhow`; these are typed so callers can tell a rejected
//! instruction apart from a collaborator that failed to answer.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    /// Collaborator reply is outside the instruction vocabulary. Never executed.
    #[error("invalid correction instruction: {text:?}")]
    InvalidInstruction { text: String },

    /// Collaborator could not produce a reply.
    #[error("collaborator failed: {message}")]
    Collaborator { message: String },
}

impl CorrectionError {
    pub(crate) fn invalid(text: &str) -> Self {
        Self::InvalidInstruction {
            text: text.to_string(),
        }
    }

    pub(crate) fn collaborator(err: &anyhow::Error) -> Self {
        Self::Collaborator {
            message: format!("{err:#}"),
        }
    }
}
