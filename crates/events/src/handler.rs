//! Type-erased handler entries stored in the registry.

use crate::error::HandlerError;
use crate::{Command, CommandVariant, Event, EventVariant};

type CommandFn<C, U> =
    Box<dyn Fn(&C, &mut U) -> Result<<C as Command>::Reply, HandlerError> + Send + Sync>;

type EventFn<E, U> = Box<dyn Fn(&E, &mut U) -> Result<(), HandlerError> + Send + Sync>;

/// The single handler registered for one command type.
///
/// Wraps a typed handler `Fn(&V, &mut U)` for a concrete command `V` so the
/// registry can store handlers for every variant of `C` side by side.
pub struct CommandHandler<C: Command, U> {
    name: &'static str,
    call: CommandFn<C, U>,
}

impl<C, U> CommandHandler<C, U>
where
    C: Command,
{
    pub fn new<V, F>(name: &'static str, handler: F) -> Self
    where
        U: 'static,
        V: CommandVariant<C>,
        F: Fn(&V, &mut U) -> Result<C::Reply, HandlerError> + Send + Sync + 'static,
    {
        let call = move |command: &C, uow: &mut U| match V::from_command(command) {
            Some(inner) => handler(inner, uow),
            None => Err(HandlerError::VariantMismatch {
                expected: V::COMMAND_TYPE,
            }),
        };

        Self {
            name,
            call: Box::new(call),
        }
    }

    /// Handler identity used in logs and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, command: &C, uow: &mut U) -> Result<C::Reply, HandlerError> {
        (self.call)(command, uow)
    }
}

impl<C: Command, U> core::fmt::Debug for CommandHandler<C, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandHandler").field("name", &self.name).finish()
    }
}

/// One of the handlers subscribed to an event type.
pub struct EventHandler<E: Event, U> {
    name: &'static str,
    call: EventFn<E, U>,
}

impl<E, U> EventHandler<E, U>
where
    E: Event,
{
    pub fn new<V, F>(name: &'static str, handler: F) -> Self
    where
        U: 'static,
        V: EventVariant<E>,
        F: Fn(&V, &mut U) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let call = move |event: &E, uow: &mut U| match V::from_event(event) {
            Some(inner) => handler(inner, uow),
            None => Err(HandlerError::VariantMismatch {
                expected: V::EVENT_TYPE,
            }),
        };

        Self {
            name,
            call: Box::new(call),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, event: &E, uow: &mut U) -> Result<(), HandlerError> {
        (self.call)(event, uow)
    }
}

impl<E: Event, U> core::fmt::Debug for EventHandler<E, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventHandler").field("name", &self.name).finish()
    }
}
