//! Topic registry: maps well-known event topic hashes to [`EventKind`].
//!
//! Each known topic is the keccak-256 hash of a fixed ASCII event name.

use std::{collections::HashMap, fmt, sync::LazyLock};

use alloy::primitives::{B256, keccak256};

/// Semantic kind of an exchange event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Trades,
    Cancel,
    CanceledIds,
    TriggeredIds,
    TriggerAbove,
    /// Topic not in the registry, or log without topics.
    Unknown(Option<B256>),
}

/// Event names in registry order, paired with their kinds.
const EVENT_NAMES: [(&str, EventKind); 5] = [
    ("Trades", EventKind::Trades),
    ("Cancel", EventKind::Cancel),
    ("CanceledIds", EventKind::CanceledIds),
    ("TriggeredIds", EventKind::TriggeredIds),
    ("TopicTriggerAbove", EventKind::TriggerAbove),
];

static REGISTRY: LazyLock<HashMap<B256, EventKind>> = LazyLock::new(|| {
    EVENT_NAMES
        .iter()
        .map(|(name, kind)| (keccak256(name.as_bytes()), *kind))
        .collect()
});

/// Classifies a topic hash. Never fails: unregistered hashes map to
/// [`EventKind::Unknown`] carrying the hash.
pub fn classify(topic: &B256) -> EventKind {
    REGISTRY
        .get(topic)
        .copied()
        .unwrap_or(EventKind::Unknown(Some(*topic)))
}

/// Classifies a log by its (optional) first topic.
pub fn classify_opt(topic: Option<&B256>) -> EventKind {
    topic.map_or(EventKind::Unknown(None), classify)
}

/// Topic hash of a known event kind, `None` for [`EventKind::Unknown`].
pub fn topic_of(kind: EventKind) -> Option<B256> {
    EVENT_NAMES
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(name, _)| keccak256(name.as_bytes()))
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Trades => "TRADES",
            EventKind::Cancel => "CANCEL",
            EventKind::CanceledIds => "CANCELED IDS",
            EventKind::TriggeredIds => "TRIGGERED IDS",
            EventKind::TriggerAbove => "TRIGGER ABOVE",
            EventKind::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
