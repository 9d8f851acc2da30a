//! Error taxonomy for handler execution, dispatch and registry wiring.

use allocation_core::DomainError;
use thiserror::Error;

/// Failure raised inside a handler body.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Deterministic domain failure (unknown SKU, validation, conflict, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The unit of work could not load or commit state.
    #[error("unit of work failed: {0}")]
    UnitOfWork(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// A registered handler received a message of another variant.
    ///
    /// Only reachable through a hand-written `CommandVariant`/`EventVariant`
    /// impl whose tag disagrees with the enum's `command_type`/`event_type`.
    #[error("handler expected a {expected} message")]
    VariantMismatch { expected: &'static str },

    /// Anything else a handler body reports.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error returned by the message bus to its caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The value handed to the bus is neither a command nor an event.
    #[error("{type_name} was not an Event or Command")]
    InvalidMessageKind { type_name: &'static str },

    /// No handler is registered for the command type (configuration error).
    #[error("no handler registered for command {command_type}")]
    HandlerNotFound { command_type: &'static str },

    /// The command's handler failed; `source` is the handler's own error.
    #[error("handler {handler} failed for command {command_type}: {source}")]
    Handler {
        command_type: &'static str,
        handler: &'static str,
        #[source]
        source: HandlerError,
    },

    /// A single `handle` call processed more messages than allowed.
    #[error("message cascade exceeded {limit} messages")]
    CascadeLimitExceeded { limit: usize },
}

impl DispatchError {
    /// The original handler error, for callers that branch on it.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            DispatchError::Handler { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            DispatchError::Handler { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error raised while building a [`HandlerRegistry`](crate::HandlerRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("command {command_type} already has handler {existing}; refusing {rejected}")]
    DuplicateCommandHandler {
        command_type: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },

    #[error("no handler registered for commands: {}", missing.join(", "))]
    MissingCommandHandler { missing: Vec<&'static str> },

    /// Two command variants were declared with the same type tag.
    #[error("command type {command_type} is declared by more than one command")]
    DuplicateCommandType { command_type: &'static str },
}
