//! Typed in-process publish/subscribe.
//!
//! Components register interest in a payload *type* and publishers broadcast
//! payload values synchronously to every current subscriber. Two scopes
//! exist: instance-local buses ([`EventBus`]) owned by host objects, and one
//! process-global bus reached through the free functions in [`bus`].
//!
//! Routing is driven by a [`TypeRegistry`](registry::TypeRegistry) that
//! assigns a stable integer key to each payload type on first use, so the
//! hot path is an integer map lookup plus one downcast — no string hashing,
//! no reflection-style walks.

pub mod bus;
pub mod channel;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod host;
pub mod registry;
pub mod types;

pub use bus::{
    add_global_listener, global, init_global, remove_global_listener, send_global_any,
    send_global_event, EventBus,
};
pub use channel::EventChannel;
pub use clock::LogicalClock;
pub use config::EventBusConfig;
pub use diagnostics::{ChannelSnapshot, InvocationRecord, SnapshotFilter};
pub use host::{resolve_bus, send_event_from, RegistryHost};
pub use registry::{GlobalTypeRegistry, TypeInfo, TypeKey, TypeRegistry};
pub use types::{listener, Event, EventError, EventResult, Ident, Listener};
