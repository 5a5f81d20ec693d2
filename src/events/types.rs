//! Core types shared across the event system.
//!
//! Payload types are plain owned values: anything `Any + Send + Sync +
//! 'static` can be broadcast, and dispatch identity is the concrete type
//! itself. Listener identity for removal is the `Arc` pointer of the
//! registered callback; the owner label travels alongside it for diagnostics
//! only and never affects dispatch.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::events::registry::TypeKey;

/// Marker bound for event payload types.
///
/// Implemented for every plain `'static` value type that is safe to share
/// across threads. Payloads must be concrete types — a trait object cannot be
/// a dispatch identity, which keeps type-key resolution exact.
pub trait Event: Any + Send + Sync + 'static {}

impl<T: Any + Send + Sync + 'static> Event for T {}

/// Callback invoked with a payload of type `E`.
///
/// Identity for [`remove_listener`](crate::events::bus::EventBus::remove_listener)
/// is the `Arc` pointer, so keep the clone you registered if you intend to
/// remove the listener later.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Wraps a closure into a [`Listener`].
pub fn listener<E, F>(f: F) -> Listener<E>
where
    E: Event,
    F: Fn(&E) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Opaque label for the owner of a subscription or the invoker of a dispatch.
///
/// Cheap to clone (shared string). Used for diagnostics and removal
/// bookkeeping only; dispatch never branches on it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ident(Arc<str>);

impl Ident {
    /// Creates an identity from any string-like label.
    pub fn new(label: impl Into<String>) -> Self {
        Ident(label.into().into())
    }

    /// The label this identity was created with.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ident").field(&self.as_str()).finish()
    }
}

impl From<&str> for Ident {
    fn from(label: &str) -> Self {
        Ident::new(label)
    }
}

impl From<String> for Ident {
    fn from(label: String) -> Self {
        Ident::new(label)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Errors produced by the event system.
///
/// The dispatch surface itself is infallible (missing channels and absent
/// subscribers are normal states); errors show up on reverse type lookups,
/// configuration loading, and global-bus initialization.
#[derive(Debug, Error)]
pub enum EventError {
    /// Reverse lookup of a key that was never allocated. Indicates a stale
    /// key held by the caller; logged and non-fatal.
    #[error("no type registered for {0}")]
    TypeNotFound(TypeKey),

    /// An untyped payload did not match the channel it was routed to.
    #[error("payload is not a {expected}")]
    PayloadMismatch {
        /// Payload type the channel carries.
        expected: &'static str,
    },

    /// The process-global bus was configured after first use.
    #[error("global event bus is already initialized")]
    AlreadyInitialized,

    /// Invalid configuration value or parse failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO failure while loading configuration.
    #[error("IO error: {0}")]
    Io(String),
}

/// Result alias used across the event system.
pub type EventResult<T> = Result<T, EventError>;
