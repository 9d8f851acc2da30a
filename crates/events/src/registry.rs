//! Handler registry: the immutable routing table of the message bus.
//!
//! Built once at wiring time through [`HandlerRegistryBuilder`], then handed to
//! the [`MessageBus`](crate::MessageBus). There is no way to add or remove a
//! handler from a built registry.

use std::collections::HashMap;

use crate::error::{HandlerError, RegistryError};
use crate::handler::{CommandHandler, EventHandler};
use crate::{Command, CommandVariant, Event, EventVariant};

/// Command type → single handler; event type → ordered handlers.
pub struct HandlerRegistry<C: Command, E: Event, U> {
    commands: HashMap<&'static str, CommandHandler<C, U>>,
    events: HashMap<&'static str, Vec<EventHandler<E, U>>>,
}

impl<C, E, U> HandlerRegistry<C, E, U>
where
    C: Command,
    E: Event,
{
    pub fn builder() -> HandlerRegistryBuilder<C, E, U> {
        HandlerRegistryBuilder::default()
    }

    pub fn command_handler(&self, command_type: &str) -> Option<&CommandHandler<C, U>> {
        self.commands.get(command_type)
    }

    /// Handlers for `event_type` in registration order (empty if none).
    pub fn event_handlers(&self, event_type: &str) -> &[EventHandler<E, U>] {
        self.events
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn command_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }
}

impl<C: Command, E: Event, U> core::fmt::Debug for HandlerRegistry<C, E, U> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("commands", &self.commands)
            .field("events", &self.events)
            .finish()
    }
}

/// Collects handlers, then freezes them into a [`HandlerRegistry`].
///
/// Registration errors are remembered and reported by `build`, so wiring code
/// reads as one chain.
pub struct HandlerRegistryBuilder<C: Command, E: Event, U> {
    commands: HashMap<&'static str, CommandHandler<C, U>>,
    events: HashMap<&'static str, Vec<EventHandler<E, U>>>,
    errors: Vec<RegistryError>,
}

impl<C: Command, E: Event, U> Default for HandlerRegistryBuilder<C, E, U> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            events: HashMap::new(),
            errors: Vec::new(),
        }
    }
}

impl<C, E, U> HandlerRegistryBuilder<C, E, U>
where
    C: Command,
    E: Event,
    U: 'static,
{
    /// Register the handler for command `V`. A command type takes exactly one.
    pub fn command<V, F>(mut self, name: &'static str, handler: F) -> Self
    where
        V: CommandVariant<C>,
        F: Fn(&V, &mut U) -> Result<C::Reply, HandlerError> + Send + Sync + 'static,
    {
        match self.commands.get(V::COMMAND_TYPE) {
            Some(existing) => self.errors.push(RegistryError::DuplicateCommandHandler {
                command_type: V::COMMAND_TYPE,
                existing: existing.name(),
                rejected: name,
            }),
            None => {
                self.commands
                    .insert(V::COMMAND_TYPE, CommandHandler::new::<V, F>(name, handler));
            }
        }
        self
    }

    /// Append a handler for event `V`; handlers run in the order registered.
    pub fn event<V, F>(mut self, name: &'static str, handler: F) -> Self
    where
        V: EventVariant<E>,
        F: Fn(&V, &mut U) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.events
            .entry(V::EVENT_TYPE)
            .or_default()
            .push(EventHandler::new::<V, F>(name, handler));
        self
    }

    /// Freeze the registry as registered.
    pub fn build(mut self) -> Result<HandlerRegistry<C, E, U>, RegistryError> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }
        Ok(HandlerRegistry {
            commands: self.commands,
            events: self.events,
        })
    }

    /// Freeze the registry, requiring a handler for every type in
    /// `C::command_types()`.
    ///
    /// Also rejects command enums that declare one tag for two variants; one
    /// of them could never be routed to its own handler.
    pub fn build_complete(self) -> Result<HandlerRegistry<C, E, U>, RegistryError> {
        let declared = C::command_types();
        for (idx, command_type) in declared.iter().enumerate() {
            if declared[..idx].contains(command_type) {
                return Err(RegistryError::DuplicateCommandType {
                    command_type: *command_type,
                });
            }
        }

        let missing: Vec<&'static str> = declared
            .iter()
            .copied()
            .filter(|command_type| !self.commands.contains_key(command_type))
            .collect();

        let registry = self.build()?;
        if !missing.is_empty() {
            return Err(RegistryError::MissingCommandHandler { missing });
        }
        Ok(registry)
    }
}
