//! Classification of the one event taken off the admin queue.

use std::time::Duration;

use crate::error::{AlterError, AlterResult, ProtocolError};

/// An error code with librdkafka's text for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    AlterConfigsResult,
    Error,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceResult {
    pub name: String,
    pub error: Option<ErrorDetail>,
}

/// Owned copy of everything needed from a polled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub kind: EventKind,
    pub event_type: i32,
    pub name: String,
    pub error: Option<ErrorDetail>,
    /// The event's error string, which librdkafka may set even without a code.
    pub error_string: Option<String>,
    /// Per-resource results; only filled for AlterConfigs results.
    pub resources: Vec<ResourceResult>,
}

/// Maps the poll result onto success or a terminal error.
///
/// Returns the name of the acknowledged resource.
pub fn classify(event: Option<EventSummary>, waited: Duration) -> AlterResult<String> {
    let event = event.ok_or(AlterError::TimedOut(waited))?;

    if let Some(err) = event.error {
        return Err(ProtocolError::Event {
            code: err.code,
            message: err.message,
        }
        .into());
    }

    match event.kind {
        EventKind::AlterConfigsResult => {}
        EventKind::Error => {
            return Err(ProtocolError::Event {
                code: event.event_type,
                message: event.error_string.unwrap_or(event.name),
            }
            .into())
        }
        EventKind::Other => {
            return Err(ProtocolError::UnexpectedEventType {
                event_type: event.event_type,
                name: event.name,
            }
            .into())
        }
    }

    let mut resources = event.resources;
    if resources.len() != 1 {
        return Err(ProtocolError::ResourceCount(resources.len()).into());
    }

    let resource = resources.remove(0);
    match resource.error {
        Some(err) => Err(ProtocolError::Resource {
            resource: resource.name,
            code: err.code,
            message: err.message,
        }
        .into()),
        None => Ok(resource.name),
    }
}
