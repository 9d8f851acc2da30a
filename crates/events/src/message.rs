//! Messages: the tagged union the bus dispatches.

use std::any::Any;

use crate::error::DispatchError;
use crate::{Command, Event};

/// Whether a message is a command or an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Command,
    Event,
}

/// A message is exactly one of a command or an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<C, E> {
    Command(C),
    Event(E),
}

impl<C, E> Message<C, E>
where
    C: Command,
    E: Event,
{
    pub fn command(command: impl Into<C>) -> Self {
        Message::Command(command.into())
    }

    pub fn event(event: impl Into<E>) -> Self {
        Message::Event(event.into())
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Command(_) => MessageKind::Command,
            Message::Event(_) => MessageKind::Event,
        }
    }

    /// Type tag of the concrete command or event.
    pub fn message_type(&self) -> &'static str {
        match self {
            Message::Command(c) => c.command_type(),
            Message::Event(e) => e.event_type(),
        }
    }

    /// Classify an arbitrary value at runtime.
    ///
    /// Accepts a `Message<C, E>`, a bare `C` or a bare `E`. Anything else is
    /// rejected with [`DispatchError::InvalidMessageKind`].
    pub fn classify<T>(value: T) -> Result<Self, DispatchError>
    where
        T: Any,
    {
        let boxed: Box<dyn Any> = Box::new(value);

        let boxed = match boxed.downcast::<Self>() {
            Ok(message) => return Ok(*message),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<C>() {
            Ok(command) => return Ok(Message::Command(*command)),
            Err(other) => other,
        };
        match boxed.downcast::<E>() {
            Ok(event) => Ok(Message::Event(*event)),
            Err(_) => Err(DispatchError::InvalidMessageKind {
                type_name: std::any::type_name::<T>(),
            }),
        }
    }
}
