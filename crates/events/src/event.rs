/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **fan-out** notifications: zero, one or many handlers react to each
/// - **fire-and-forget** from the publisher's perspective (no reply)
pub trait Event: core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "allocation.out_of_stock").
    fn event_type(&self) -> &'static str;
}

/// One concrete event carried by the event enum `E`.
pub trait EventVariant<E: Event>: Sized + 'static {
    /// Tag shared with `E::event_type()` for values holding this variant.
    const EVENT_TYPE: &'static str;

    /// Borrow the concrete event out of the enum, if it holds this variant.
    fn from_event(event: &E) -> Option<&Self>;
}

/// Implements [`Event`] for an event enum and [`EventVariant`] for each of its
/// payload types. Same variant shape rules as [`impl_command!`](crate::impl_command).
#[macro_export]
macro_rules! impl_event {
    ($enum:ident, { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $crate::Event for $enum {
            fn event_type(&self) -> &'static str {
                match self {
                    $($enum::$variant(_) => $tag,)+
                }
            }
        }

        $(
            impl $crate::EventVariant<$enum> for $variant {
                const EVENT_TYPE: &'static str = $tag;

                #[allow(unreachable_patterns)]
                fn from_event(event: &$enum) -> Option<&Self> {
                    match event {
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
