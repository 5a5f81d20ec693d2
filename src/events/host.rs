//! Hookup for host object models that own bus instances.
//!
//! The core does not know how host objects nest; it only needs "give me your
//! bus, or your parent". Hosts implement [`RegistryHost`] on their node type
//! and the helpers here walk the containment chain upward to the nearest
//! enclosing bus.

use tracing::debug;

use crate::events::bus::EventBus;
use crate::events::types::{Event, Ident};

/// A node in the host's containment hierarchy.
pub trait RegistryHost {
    /// The bus attached directly to this node, if any.
    fn local_bus(&self) -> Option<&EventBus>;

    /// The enclosing node; `None` at the root.
    fn parent(&self) -> Option<&dyn RegistryHost>;
}

/// Nearest bus at or above `node`, walking the parent chain; `None` when the
/// chain has no bus.
pub fn resolve_bus<'a>(node: &'a dyn RegistryHost) -> Option<&'a EventBus> {
    let mut current = Some(node);
    while let Some(host) = current {
        if let Some(bus) = host.local_bus() {
            return Some(bus);
        }
        current = host.parent();
    }
    None
}

/// Broadcasts `payload` on the nearest bus enclosing `node`. A node outside
/// any bus scope drops the event, which is a normal state.
pub fn send_event_from<E: Event>(node: &dyn RegistryHost, invoker: &Ident, payload: &E) {
    match resolve_bus(node) {
        Some(bus) => bus.send_event(invoker, payload),
        None => debug!(
            event = std::any::type_name::<E>(),
            "no enclosing bus, event dropped"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::listener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct Footstep;

    struct Node<'a> {
        bus: Option<EventBus>,
        parent: Option<&'a Node<'a>>,
    }

    impl RegistryHost for Node<'_> {
        fn local_bus(&self) -> Option<&EventBus> {
            self.bus.as_ref()
        }

        fn parent(&self) -> Option<&dyn RegistryHost> {
            self.parent.map(|p| p as &dyn RegistryHost)
        }
    }

    #[test]
    fn resolve_walks_up_to_the_nearest_bus() {
        let root = Node {
            bus: Some(EventBus::new()),
            parent: None,
        };
        let mid = Node {
            bus: None,
            parent: Some(&root),
        };
        let leaf = Node {
            bus: None,
            parent: Some(&mid),
        };

        let bus = resolve_bus(&leaf).unwrap();
        assert!(std::ptr::eq(bus, root.bus.as_ref().unwrap()));
    }

    #[test]
    fn resolve_prefers_the_closest_bus() {
        let root = Node {
            bus: Some(EventBus::new()),
            parent: None,
        };
        let mid = Node {
            bus: Some(EventBus::new()),
            parent: Some(&root),
        };

        let bus = resolve_bus(&mid).unwrap();
        assert!(std::ptr::eq(bus, mid.bus.as_ref().unwrap()));
    }

    #[test]
    fn send_from_a_node_outside_any_scope_is_dropped() {
        let orphan = Node {
            bus: None,
            parent: None,
        };
        assert!(resolve_bus(&orphan).is_none());
        send_event_from(&orphan, &"walker".into(), &Footstep);
    }

    #[test]
    fn send_from_a_leaf_reaches_the_enclosing_bus() {
        let hits = Arc::new(AtomicUsize::new(0));
        let root = Node {
            bus: Some(EventBus::new()),
            parent: None,
        };
        let counter = hits.clone();
        root.bus.as_ref().unwrap().add_listener(
            "audio",
            listener(move |_: &Footstep| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let leaf = Node {
            bus: None,
            parent: Some(&root),
        };

        send_event_from(&leaf, &"walker".into(), &Footstep);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
