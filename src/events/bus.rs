//! Scoped event registries ("buses") and the process-global bus.
//!
//! A bus maps each payload type's [`TypeKey`] to the channel carrying that
//! type, creating channels lazily on the first subscription. Two scopes
//! exist: instance buses owned by host objects, and one process-global bus
//! that is created on first use, lives for the lifetime of the process, and
//! is never torn down. Both scopes run the same algorithm over different
//! backing maps.
//!
//! Dispatch is synchronous and runs on the caller's thread; `send_event`
//! returns once every subscriber has run (or one has panicked). Map guards
//! are always released before listeners run, so listeners may freely
//! subscribe, unsubscribe, or send on the same bus from inside a callback.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::events::channel::{AnyChannel, EventChannel};
use crate::events::config::EventBusConfig;
use crate::events::registry::{GlobalTypeRegistry, TypeKey};
use crate::events::types::{Event, EventError, EventResult, Ident, Listener};

/// A scoped event registry: one channel per payload type, created on first
/// subscription and kept for the lifetime of the bus.
pub struct EventBus {
    channels: DashMap<TypeKey, Arc<dyn AnyChannel>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Creates a bus with an explicit configuration.
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            channels: DashMap::new(),
            config,
        }
    }

    /// The configuration this bus was created with.
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Subscribes `listener` to payload type `E` on this bus.
    pub fn add_listener<E: Event>(&self, owner: impl Into<Ident>, listener: Listener<E>) {
        let key = GlobalTypeRegistry::key_of::<E>();
        let channel = Arc::clone(
            self.channels
                .entry(key)
                .or_insert_with(|| {
                    debug!(event = std::any::type_name::<E>(), %key, "creating channel");
                    Arc::new(EventChannel::<E>::new(&self.config))
                })
                .value(),
        );
        match channel.as_any().downcast_ref::<EventChannel<E>>() {
            Some(channel) => channel.subscribe(owner.into(), listener),
            // Unreachable while type-key allocation stays exact.
            None => warn!(
                event = std::any::type_name::<E>(),
                %key,
                "channel carries a different type, listener dropped"
            ),
        }
    }

    /// Removes a previously added listener (matched by `Arc` pointer). No-op
    /// when the listener was never added or was already removed.
    pub fn remove_listener<E: Event>(&self, owner: &Ident, listener: &Listener<E>) {
        let key = GlobalTypeRegistry::key_of::<E>();
        let Some(channel) = self.channel(key) else {
            return;
        };
        if let Some(channel) = channel.as_any().downcast_ref::<EventChannel<E>>() {
            channel.unsubscribe(owner, listener);
        }
    }

    /// Broadcasts `payload` to every listener subscribed for `E`, in
    /// subscription order, on the caller's thread.
    ///
    /// Absence of a channel (nobody ever subscribed) is a normal state and a
    /// silent no-op. A panicking listener propagates to the caller and the
    /// remaining listeners of that dispatch are not called.
    pub fn send_event<E: Event>(&self, invoker: &Ident, payload: &E) {
        let key = GlobalTypeRegistry::key_of::<E>();
        let Some(channel) = self.channel(key) else {
            return;
        };
        match channel.as_any().downcast_ref::<EventChannel<E>>() {
            Some(channel) => channel.invoke(invoker, payload),
            None => warn!(
                event = std::any::type_name::<E>(),
                %key,
                "channel carries a different type, event dropped"
            ),
        }
    }

    /// Broadcasts a payload whose type is only known at runtime, dispatching
    /// on the payload's concrete type.
    ///
    /// Types nobody ever subscribed to are silently dropped, like the typed
    /// path.
    pub fn send_any(&self, invoker: &Ident, payload: &dyn Any) {
        let Some(key) = GlobalTypeRegistry::lookup(payload.type_id()) else {
            return;
        };
        let Some(channel) = self.channel(key) else {
            return;
        };
        if let Err(error) = channel.invoke_any(invoker, payload) {
            warn!(%key, %error, "untyped dispatch failed");
        }
    }

    /// Number of channels created so far in this scope.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel(&self, key: TypeKey) -> Option<Arc<dyn AnyChannel>> {
        // Clone the Arc out so no map guard is held while listeners run.
        self.channels.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn channel_handles(&self) -> Vec<Arc<dyn AnyChannel>> {
        self.channels
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// --- process-global scope ---

static GLOBAL: OnceCell<EventBus> = OnceCell::new();

/// Configures the process-global bus. Must run before anything touches the
/// global bus; fails once it exists.
pub fn init_global(config: EventBusConfig) -> EventResult<()> {
    GLOBAL
        .set(EventBus::with_config(config))
        .map_err(|_| EventError::AlreadyInitialized)
}

/// The process-global bus, created with the default configuration on first
/// use. Lives for the process and is never torn down; channels created here
/// are permanent.
pub fn global() -> &'static EventBus {
    GLOBAL.get_or_init(EventBus::new)
}

/// [`EventBus::add_listener`] on the process-global bus.
pub fn add_global_listener<E: Event>(owner: impl Into<Ident>, listener: Listener<E>) {
    global().add_listener(owner, listener);
}

/// [`EventBus::remove_listener`] on the process-global bus.
pub fn remove_global_listener<E: Event>(owner: &Ident, listener: &Listener<E>) {
    global().remove_listener(owner, listener);
}

/// [`EventBus::send_event`] on the process-global bus.
pub fn send_global_event<E: Event>(invoker: &Ident, payload: &E) {
    global().send_event(invoker, payload);
}

/// [`EventBus::send_any`] on the process-global bus.
pub fn send_global_any(invoker: &Ident, payload: &dyn Any) {
    global().send_any(invoker, payload);
}
