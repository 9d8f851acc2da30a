/// A command: a directive to change state (command abstraction).
///
/// Commands represent **intent** - a request to perform one action. They are
/// **transient** (not persisted) and handled by exactly one handler.
///
/// ## Command vs Event
///
/// - **Command**: Intent to do something (e.g., "Allocate 10 RED-CHAIR to order o1")
/// - **Event**: Fact that something happened (e.g., "RED-CHAIR is out of stock")
///
/// A failing command handler is an error the caller must see. A failing event
/// handler is only logged.
///
/// ## Type tags
///
/// Applications model their commands as one enum with a variant per concrete
/// command. `command_type()` returns the stable tag of the variant held; the
/// handler registry is keyed by that tag. `command_types()` lists every tag the
/// enum can produce so wiring can verify each one has a handler.
///
/// Use [`impl_command!`](crate::impl_command) to derive this trait and the
/// per-variant [`CommandVariant`] impls from a single tag table.
pub trait Command: core::fmt::Debug + Send + Sync + 'static {
    /// Value produced by a successful handler (an acknowledgement, an id, ...).
    type Reply: core::fmt::Debug + Send + 'static;

    /// Stable command type identifier (e.g. "allocation.allocate").
    fn command_type(&self) -> &'static str;

    /// Every command type identifier this command enum can produce.
    fn command_types() -> &'static [&'static str];
}

/// One concrete command carried by the command enum `C`.
pub trait CommandVariant<C: Command>: Sized + 'static {
    /// Tag shared with `C::command_type()` for values holding this variant.
    const COMMAND_TYPE: &'static str;

    /// Borrow the concrete command out of the enum, if it holds this variant.
    fn from_command(command: &C) -> Option<&Self>;
}

/// Implements [`Command`] for a command enum and [`CommandVariant`] for each
/// of its payload types.
///
/// Every enum variant must be a single-field tuple variant named after its
/// payload type (`Allocate(Allocate)`), and the enum must be in scope by name.
///
/// ```ignore
/// impl_command!(AllocationCommand, reply = Option<BatchRef>, {
///     CreateBatch => "allocation.batch.create",
///     Allocate => "allocation.allocate",
/// });
/// ```
#[macro_export]
macro_rules! impl_command {
    ($enum:ident, reply = $reply:ty, { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $crate::Command for $enum {
            type Reply = $reply;

            fn command_type(&self) -> &'static str {
                match self {
                    $($enum::$variant(_) => $tag,)+
                }
            }

            fn command_types() -> &'static [&'static str] {
                &[$($tag),+]
            }
        }

        $(
            impl $crate::CommandVariant<$enum> for $variant {
                const COMMAND_TYPE: &'static str = $tag;

                #[allow(unreachable_patterns)]
                fn from_command(command: &$enum) -> Option<&Self> {
                    match command {
                        $enum::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$variant> for $enum {
                fn from(value: $variant) -> Self {
                    $enum::$variant(value)
                }
            }
        )+
    };
}
