//! # event-core
//!
//! Typed, in-process publish/subscribe: components subscribe callbacks to a
//! payload type, and publishers broadcast payload values synchronously to
//! every current subscriber — either on a local bus instance owned by a host
//! object, or on one process-wide bus.
//!
//! - Routing is type-keyed: each payload type gets a stable integer
//!   [`TypeKey`](events::TypeKey) on first use, and the hot path is an
//!   integer map lookup plus a single downcast.
//! - Dispatch is synchronous, best-effort, fire-and-forget: `send_event`
//!   runs every listener on the caller's thread in subscription order and
//!   returns when they are done. No queueing, no delivery guarantees, no
//!   isolation between subscribers.
//! - Subscribing and unsubscribing are safe while a dispatch is in progress;
//!   changes take effect on the next dispatch.
//! - Optional diagnostics (who is subscribed, who invoked recently) feed an
//!   external inspector through [`EventBus::snapshot`](events::EventBus::snapshot)
//!   without affecting dispatch.
//!
//! ## Example
//!
//! ```
//! use event_core::events::{listener, EventBus, Ident};
//!
//! #[derive(Debug, Clone)]
//! struct Damage {
//!     amount: i32,
//! }
//!
//! let bus = EventBus::new();
//! let on_damage = listener(|d: &Damage| println!("took {} damage", d.amount));
//! bus.add_listener("health-system", on_damage.clone());
//!
//! bus.send_event(&Ident::from("spike-trap"), &Damage { amount: 5 });
//!
//! bus.remove_listener(&Ident::from("health-system"), &on_damage);
//! ```

pub mod events;
pub mod logging;

pub use events::{
    add_global_listener, global, init_global, listener, remove_global_listener, resolve_bus,
    send_event_from, send_global_any, send_global_event, ChannelSnapshot, Event, EventBus,
    EventBusConfig, EventError, EventResult, Ident, InvocationRecord, Listener, LogicalClock,
    RegistryHost, SnapshotFilter, TypeKey,
};
