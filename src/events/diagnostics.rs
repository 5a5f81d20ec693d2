//! Read-only introspection over a bus.
//!
//! Consumed by external inspectors and tooling; never required for dispatch.
//! Snapshots are owned clones of the diagnostic state, taken without blocking
//! dispatch on other channels, and may already be stale by the time the
//! caller looks at them. That is acceptable: diagnostics are best-effort.

use serde::Serialize;

use crate::events::bus::EventBus;
use crate::events::types::Ident;

/// One recorded invocation of a channel.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationRecord {
    /// Who sent the event.
    pub invoker: Ident,
    /// Logical tick at which it was sent (see
    /// [`LogicalClock`](crate::events::clock::LogicalClock)).
    pub tick: u64,
}

/// Read-only view of one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    /// Fully qualified payload type name.
    pub type_name: String,
    /// Number of current subscriptions.
    pub subscriber_count: usize,
    /// Owner labels in subscription order; empty when diagnostics are off.
    pub subscribers: Vec<String>,
    /// Most recent invocations, oldest first; empty when diagnostics are off.
    pub recent_invocations: Vec<InvocationRecord>,
}

/// Filter for [`EventBus::snapshot_filtered`]. Substring matches are
/// case-insensitive.
#[derive(Debug, Clone)]
pub enum SnapshotFilter {
    /// Every channel.
    All,
    /// Channels whose payload type name contains the substring.
    TypeName(String),
    /// Channels with at least one subscriber label containing the substring.
    Subscriber(String),
}

impl SnapshotFilter {
    fn matches(&self, snapshot: &ChannelSnapshot) -> bool {
        match self {
            SnapshotFilter::All => true,
            SnapshotFilter::TypeName(needle) => contains_ignore_case(&snapshot.type_name, needle),
            SnapshotFilter::Subscriber(needle) => snapshot
                .subscribers
                .iter()
                .any(|label| contains_ignore_case(label, needle)),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl EventBus {
    /// Snapshot of every channel in this bus, sorted by type name ascending.
    pub fn snapshot(&self) -> Vec<ChannelSnapshot> {
        self.snapshot_filtered(&SnapshotFilter::All)
    }

    /// Filtered variant of [`snapshot`](Self::snapshot).
    pub fn snapshot_filtered(&self, filter: &SnapshotFilter) -> Vec<ChannelSnapshot> {
        let mut snapshots: Vec<ChannelSnapshot> = self
            .channel_handles()
            .iter()
            .map(|channel| channel.snapshot())
            .filter(|snapshot| filter.matches(snapshot))
            .collect();
        snapshots.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::config::EventBusConfig;
    use crate::events::types::listener;

    #[derive(Debug, Clone)]
    struct AlphaHit;
    #[derive(Debug, Clone)]
    struct BetaMiss;

    fn diagnostics_bus() -> EventBus {
        let bus = EventBus::with_config(EventBusConfig::default().with_diagnostics());
        bus.add_listener("alpha-system", listener(|_: &AlphaHit| {}));
        bus.add_listener("beta-system", listener(|_: &BetaMiss| {}));
        bus.add_listener("shared-system", listener(|_: &BetaMiss| {}));
        bus
    }

    #[test]
    fn snapshot_lists_channels_sorted_by_type_name() {
        let bus = diagnostics_bus();
        let snapshots = bus.snapshot();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].type_name < snapshots[1].type_name);
        let beta = snapshots
            .iter()
            .find(|s| s.type_name.contains("BetaMiss"))
            .unwrap();
        assert_eq!(beta.subscriber_count, 2);
        assert_eq!(beta.subscribers, vec!["beta-system", "shared-system"]);
    }

    #[test]
    fn filter_by_type_name_substring_is_case_insensitive() {
        let bus = diagnostics_bus();
        let hits = bus.snapshot_filtered(&SnapshotFilter::TypeName("alphahit".into()));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].type_name.contains("AlphaHit"));
    }

    #[test]
    fn filter_by_subscriber_substring() {
        let bus = diagnostics_bus();
        let hits = bus.snapshot_filtered(&SnapshotFilter::Subscriber("SHARED".into()));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].type_name.contains("BetaMiss"));
    }

    #[test]
    fn snapshot_records_invocations_without_disturbing_dispatch() {
        let bus = diagnostics_bus();
        bus.send_event(&"attacker".into(), &AlphaHit);
        let before = bus.snapshot_filtered(&SnapshotFilter::TypeName("AlphaHit".into()));
        assert_eq!(before[0].recent_invocations.len(), 1);
        assert_eq!(before[0].recent_invocations[0].invoker.as_str(), "attacker");

        // Reading a snapshot must not consume or mutate anything.
        bus.send_event(&"attacker".into(), &AlphaHit);
        let after = bus.snapshot_filtered(&SnapshotFilter::TypeName("AlphaHit".into()));
        assert_eq!(after[0].recent_invocations.len(), 2);
    }

    #[test]
    fn snapshots_serialize_for_external_inspectors() {
        let bus = diagnostics_bus();
        bus.send_event(&"attacker".into(), &AlphaHit);
        let json = serde_json::to_string(&bus.snapshot()).unwrap();
        assert!(json.contains("AlphaHit"));
        assert!(json.contains("attacker"));
    }
}
