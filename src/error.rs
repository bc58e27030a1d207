//! Error taxonomy for a single alter-config invocation.
//!
//! Every variant is terminal. The binary prints [`AlterError::report`] to
//! stderr and exits with status 1.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::cli::ArgsError;

pub type AlterResult<T> = Result<T, AlterError>;

/// Which part of the request could not be built before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    /// Building the topic descriptor or attaching the key/value pair.
    SetConfig,
    /// Creating the admin options or applying the request timeout.
    SetTimeout,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStage::SetConfig => f.write_str("set config"),
            SetupStage::SetTimeout => f.write_str("set timeout"),
        }
    }
}

/// Errors reported by the broker or the admin queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("({code}) {message}")]
    Event { code: i32, message: String },

    #[error("({event_type}) {name}")]
    UnexpectedEventType { event_type: i32, name: String },

    #[error("({code}) {message}")]
    Resource {
        resource: String,
        code: i32,
        message: String,
    },

    #[error("expected exactly one resource result, got {0}")]
    ResourceCount(usize),
}

#[derive(Debug, Error)]
pub enum AlterError {
    #[error(transparent)]
    InvalidArgs(#[from] ArgsError),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    ClientCreate(String),

    #[error("{message}")]
    DispatchSetup { stage: SetupStage, message: String },

    #[error("no response within {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl AlterError {
    /// Short tag printed as `[ERROR <category>]`.
    pub fn category(&self) -> String {
        match self {
            AlterError::InvalidArgs(_) => "invalid args".to_string(),
            AlterError::Config(_) => "config".to_string(),
            AlterError::ClientCreate(_) => "client create".to_string(),
            AlterError::DispatchSetup { stage, .. } => stage.to_string(),
            AlterError::TimedOut(_) => "timed out".to_string(),
            AlterError::Protocol(ProtocolError::Event { .. }) => "event".to_string(),
            AlterError::Protocol(ProtocolError::UnexpectedEventType { .. }) => {
                "unexpected event type".to_string()
            }
            AlterError::Protocol(ProtocolError::Resource { .. })
            | AlterError::Protocol(ProtocolError::ResourceCount(_)) => {
                "config resource".to_string()
            }
        }
    }

    /// The single diagnostic line written to stderr.
    pub fn report(&self) -> String {
        format!("[ERROR {}] {}", self.category(), self)
    }
}
