use crate::Message;

/// Unit of work as seen by the message bus.
///
/// The bus never looks inside a unit of work: it threads `&mut U` through
/// every handler of a dispatch call and, when draining, asks it for the
/// messages handlers raised as side effects (e.g. an `OutOfStock` event
/// recorded by an aggregate during `Allocate`).
///
/// Transaction boundaries (commit/rollback) belong to the implementation and
/// the handlers that drive it.
pub trait UnitOfWork<C, E> {
    /// Take every message raised since the last call, oldest first.
    ///
    /// Returning an empty `Vec` tells the draining loop there is nothing left.
    fn collect_new_messages(&mut self) -> Vec<Message<C, E>>;
}
