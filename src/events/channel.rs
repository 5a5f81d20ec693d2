//! Per-type subscriber channels.
//!
//! A channel owns the ordered subscriber list for exactly one payload type
//! and the dispatch loop over it. Channels are created by their owning
//! [`EventBus`](crate::events::bus::EventBus) on first subscription and live
//! as long as the bus.

use std::any::{type_name, Any};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::events::clock::LogicalClock;
use crate::events::config::EventBusConfig;
use crate::events::diagnostics::{ChannelSnapshot, InvocationRecord};
use crate::events::types::{Event, EventError, EventResult, Ident, Listener};

/// One registered (owner, callback) pair.
struct Subscription<E> {
    owner: Ident,
    listener: Listener<E>,
}

/// Bounded FIFO of recent invocations, kept only when diagnostics are on.
struct InvocationHistory {
    records: VecDeque<InvocationRecord>,
    capacity: usize,
}

impl InvocationHistory {
    fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn record(&mut self, invoker: &Ident) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(InvocationRecord {
            invoker: invoker.clone(),
            tick: LogicalClock::current(),
        });
    }
}

/// Ordered subscriber list and dispatch logic for one payload type.
pub struct EventChannel<E> {
    subscriptions: RwLock<Vec<Subscription<E>>>,
    history: Option<Mutex<InvocationHistory>>,
}

impl<E: Event> EventChannel<E> {
    pub(crate) fn new(config: &EventBusConfig) -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            history: config
                .diagnostics
                .then(|| Mutex::new(InvocationHistory::new(config.history_capacity))),
        }
    }

    /// Appends a listener. One owner may register any number of distinct
    /// listeners; dispatch order is registration order.
    pub fn subscribe(&self, owner: Ident, listener: Listener<E>) {
        debug!(event = type_name::<E>(), %owner, "subscribe");
        self.subscriptions
            .write()
            .unwrap()
            .push(Subscription { owner, listener });
    }

    /// Removes the first subscription whose callback is the same `Arc` as
    /// `listener`. The callback pointer alone identifies the entry; the owner
    /// label is bookkeeping. No-op when absent — removal is idempotent.
    pub fn unsubscribe(&self, owner: &Ident, listener: &Listener<E>) {
        let mut subscriptions = self.subscriptions.write().unwrap();
        if let Some(position) = subscriptions
            .iter()
            .position(|s| Arc::ptr_eq(&s.listener, listener))
        {
            subscriptions.remove(position);
            debug!(event = type_name::<E>(), %owner, "unsubscribe");
        }
    }

    /// Calls every listener subscribed at the moment of the call, in
    /// subscription order, on the caller's thread.
    ///
    /// The subscriber list is snapshotted before any listener runs:
    /// subscriptions added or removed from inside a callback take effect on
    /// the next invoke, never the current one. A panicking listener
    /// propagates to the caller and the remaining listeners of this dispatch
    /// are not called; there is no isolation between subscribers.
    pub fn invoke(&self, invoker: &Ident, payload: &E) {
        let snapshot: Vec<Listener<E>> = {
            let subscriptions = self.subscriptions.read().unwrap();
            subscriptions
                .iter()
                .map(|s| Arc::clone(&s.listener))
                .collect()
        };
        for listener in &snapshot {
            listener(payload);
        }
        if let Some(history) = &self.history {
            history.lock().unwrap().record(invoker);
        }
    }

    /// Number of current subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().unwrap().len()
    }
}

/// Object-safe surface of a channel, used where the payload type is only
/// known at runtime (the untyped send path and the diagnostics view).
pub(crate) trait AnyChannel: Send + Sync {
    /// Downcasts `payload` and dispatches it on the typed path.
    fn invoke_any(&self, invoker: &Ident, payload: &dyn Any) -> EventResult<()>;

    /// Fully qualified name of the payload type this channel carries.
    fn type_name(&self) -> &'static str;

    /// Number of current subscriptions.
    fn subscriber_count(&self) -> usize;

    /// Owned read-only view of this channel for the diagnostics API.
    fn snapshot(&self) -> ChannelSnapshot;

    /// Concrete-channel escape hatch for the typed bus paths.
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> AnyChannel for EventChannel<E> {
    fn invoke_any(&self, invoker: &Ident, payload: &dyn Any) -> EventResult<()> {
        let payload = payload
            .downcast_ref::<E>()
            .ok_or(EventError::PayloadMismatch {
                expected: type_name::<E>(),
            })?;
        self.invoke(invoker, payload);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        type_name::<E>()
    }

    fn subscriber_count(&self) -> usize {
        EventChannel::subscriber_count(self)
    }

    fn snapshot(&self) -> ChannelSnapshot {
        let subscriptions = self.subscriptions.read().unwrap();
        ChannelSnapshot {
            type_name: type_name::<E>().to_string(),
            subscriber_count: subscriptions.len(),
            subscribers: if self.history.is_some() {
                subscriptions.iter().map(|s| s.owner.to_string()).collect()
            } else {
                Vec::new()
            },
            recent_invocations: self
                .history
                .as_ref()
                .map(|history| history.lock().unwrap().records.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::listener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    fn diagnostics_channel(capacity: usize) -> EventChannel<Ping> {
        EventChannel::new(
            &EventBusConfig::default()
                .with_diagnostics()
                .with_history_capacity(capacity),
        )
    }

    fn plain_channel() -> EventChannel<Ping> {
        EventChannel::new(&EventBusConfig::default().without_diagnostics())
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let channel = plain_channel();
        let order = Arc::new(StdMutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            channel.subscribe(
                Ident::from(tag),
                listener(move |_: &Ping| order.lock().unwrap().push(tag)),
            );
        }
        channel.invoke(&Ident::from("test"), &Ping(1));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn invoke_with_no_subscribers_is_a_no_op() {
        let channel = plain_channel();
        channel.invoke(&Ident::from("test"), &Ping(1));
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_leaves_others_untouched() {
        let channel = plain_channel();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let kept = listener(move |_: &Ping| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let never_added = listener(|_: &Ping| panic!("must not run"));
        let owner = Ident::from("owner");

        channel.subscribe(owner.clone(), kept.clone());
        channel.unsubscribe(&owner, &never_added);
        channel.unsubscribe(&owner, &never_added);
        channel.invoke(&Ident::from("test"), &Ping(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        channel.unsubscribe(&owner, &kept);
        channel.unsubscribe(&owner, &kept);
        channel.invoke(&Ident::from("test"), &Ping(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_listener_registrations_are_removed_one_at_a_time() {
        let channel = plain_channel();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let twice = listener(move |_: &Ping| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let owner = Ident::from("owner");
        channel.subscribe(owner.clone(), twice.clone());
        channel.subscribe(owner.clone(), twice.clone());

        channel.invoke(&Ident::from("test"), &Ping(1));
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        channel.unsubscribe(&owner, &twice);
        channel.invoke(&Ident::from("test"), &Ping(2));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn history_is_bounded_fifo() {
        let channel = diagnostics_channel(10);
        for i in 0..15 {
            channel.invoke(&Ident::from(format!("invoker-{i}")), &Ping(i));
        }
        let snapshot = AnyChannel::snapshot(&channel);
        assert_eq!(snapshot.recent_invocations.len(), 10);
        assert_eq!(snapshot.recent_invocations[0].invoker.as_str(), "invoker-5");
        assert_eq!(snapshot.recent_invocations[9].invoker.as_str(), "invoker-14");
    }

    #[test]
    fn snapshot_hides_owners_and_history_when_diagnostics_off() {
        let channel = plain_channel();
        channel.subscribe(Ident::from("owner"), listener(|_: &Ping| {}));
        channel.invoke(&Ident::from("test"), &Ping(1));
        let snapshot = AnyChannel::snapshot(&channel);
        assert_eq!(snapshot.subscriber_count, 1);
        assert!(snapshot.subscribers.is_empty());
        assert!(snapshot.recent_invocations.is_empty());
    }

    #[test]
    fn untyped_invoke_rejects_the_wrong_payload_type() {
        let channel = plain_channel();
        let err = channel
            .invoke_any(&Ident::from("test"), &"not a ping")
            .unwrap_err();
        assert!(matches!(err, EventError::PayloadMismatch { .. }));
        assert!(channel
            .invoke_any(&Ident::from("test"), &Ping(3))
            .is_ok());
    }
}
