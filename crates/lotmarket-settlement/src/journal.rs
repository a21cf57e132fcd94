//! Hash-chained event journal.
//!
//! Every committed operation appends one [`MarketEvent`]. Entries carry a
//! sequence number and a SHA-256 digest over the previous digest, the
//! sequence, and the event's JSON encoding:
//!
//! ```text
//! digest[n] = SHA256("lotmarket:event:v1:" || digest[n-1] || seq_le || json)
//! ```
//!
//! An indexer that replays the chain detects gaps, reordering and
//! tampering. The journal keeps at most `capacity` entries; the oldest are
//! evicted first and the chain is verified from the first retained entry.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use lotmarket_types::{MarketError, MarketEvent, Result, constants};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const DOMAIN_TAG: &[u8] = b"lotmarket:event:v1:";

/// One journaled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub event: MarketEvent,
    pub prev_digest: [u8; 32],
    pub digest: [u8; 32],
    pub recorded_at: DateTime<Utc>,
}

impl JournalEntry {
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// An event already encoded for the journal. Encoding happens before any
/// external effect runs, so appending can no longer fail afterwards.
#[derive(Debug, Clone)]
pub struct EncodedEvent {
    event: MarketEvent,
    payload: Vec<u8>,
}

impl EncodedEvent {
    #[must_use]
    pub fn event(&self) -> &MarketEvent {
        &self.event
    }
}

/// Append-only, bounded, hash-chained event log.
#[derive(Debug)]
pub struct EventJournal {
    entries: VecDeque<JournalEntry>,
    next_sequence: u64,
    head: [u8; 32],
    capacity: usize,
}

impl EventJournal {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EventJournal capacity must be > 0");
        Self {
            entries: VecDeque::new(),
            next_sequence: 0,
            head: [0u8; 32],
            capacity,
        }
    }

    /// # Errors
    /// Returns `Serialization` if the event cannot be encoded.
    pub fn encode(event: MarketEvent) -> Result<EncodedEvent> {
        let payload = serde_json::to_vec(&event)?;
        Ok(EncodedEvent { event, payload })
    }

    /// Append an encoded event and return its sequence number.
    pub fn append(&mut self, encoded: EncodedEvent) -> u64 {
        let sequence = self.next_sequence;
        let prev_digest = self.head;
        let digest = chain_digest(&prev_digest, sequence, &encoded.payload);

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        tracing::debug!(
            sequence,
            event = encoded.event.name(),
            digest = %hex::encode(&digest[..8]),
            "Journal append"
        );
        self.entries.push_back(JournalEntry {
            sequence,
            event: encoded.event,
            prev_digest,
            digest,
            recorded_at: Utc::now(),
        });
        self.head = digest;
        self.next_sequence += 1;
        sequence
    }

    /// Entries from `sequence` on, oldest first.
    pub fn since(&self, sequence: u64) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.entries.iter().filter(move |e| e.sequence >= sequence)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    /// Retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence number the next append will get.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    #[must_use]
    pub fn head_hex(&self) -> String {
        hex::encode(self.head)
    }

    /// Recompute the chain over the retained entries.
    ///
    /// # Errors
    /// `LedgerInvariantViolation` on a broken link, a sequence gap, or a
    /// digest mismatch. `Serialization` if an event cannot be re-encoded.
    pub fn verify_chain(&self) -> Result<()> {
        let mut iter = self.entries.iter();
        let Some(first) = iter.next() else {
            return Ok(());
        };
        let mut prev = verify_entry(first, first.prev_digest, first.sequence)?;
        let mut expected_seq = first.sequence + 1;
        for entry in iter {
            prev = verify_entry(entry, prev, expected_seq)?;
            expected_seq += 1;
        }
        if prev != self.head {
            return Err(MarketError::LedgerInvariantViolation {
                reason: "journal head does not match last entry".into(),
            });
        }
        Ok(())
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(constants::DEFAULT_JOURNAL_CAPACITY)
    }
}

fn verify_entry(entry: &JournalEntry, prev: [u8; 32], expected_seq: u64) -> Result<[u8; 32]> {
    if entry.sequence != expected_seq {
        return Err(MarketError::LedgerInvariantViolation {
            reason: format!(
                "journal sequence gap: expected {expected_seq}, found {}",
                entry.sequence
            ),
        });
    }
    if entry.prev_digest != prev {
        return Err(MarketError::LedgerInvariantViolation {
            reason: format!("journal link broken at sequence {}", entry.sequence),
        });
    }
    let payload = serde_json::to_vec(&entry.event)?;
    let digest = chain_digest(&prev, entry.sequence, &payload);
    if digest != entry.digest {
        return Err(MarketError::LedgerInvariantViolation {
            reason: format!("journal digest mismatch at sequence {}", entry.sequence),
        });
    }
    Ok(digest)
}

fn chain_digest(prev: &[u8; 32], sequence: u64, payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(prev);
    hasher.update(sequence.to_le_bytes());
    hasher.update(payload);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

#[cfg(test)]
mod tests {
    use lotmarket_types::OfferId;

    use super::*;

    fn toggled(id: u64) -> MarketEvent {
        MarketEvent::BiddingToggled {
            offer_id: OfferId(id),
            bidding_open: id % 2 == 0,
        }
    }

    fn append(journal: &mut EventJournal, id: u64) -> u64 {
        journal.append(EventJournal::encode(toggled(id)).unwrap())
    }

    #[test]
    fn sequences_and_links() {
        let mut journal = EventJournal::new(16);
        assert_eq!(append(&mut journal, 0), 0);
        assert_eq!(append(&mut journal, 1), 1);
        let entries: Vec<_> = journal.iter().collect();
        assert_eq!(entries[0].prev_digest, [0u8; 32]);
        assert_eq!(entries[1].prev_digest, entries[0].digest);
        assert_eq!(journal.head_hex(), entries[1].digest_hex());
        journal.verify_chain().unwrap();
    }

    #[test]
    fn same_events_same_chain() {
        let mut a = EventJournal::new(8);
        let mut b = EventJournal::new(8);
        for id in 0..5 {
            append(&mut a, id);
            append(&mut b, id);
        }
        assert_eq!(a.head_hex(), b.head_hex());
    }

    #[test]
    fn tampering_detected() {
        let mut journal = EventJournal::new(8);
        for id in 0..3 {
            append(&mut journal, id);
        }
        if let Some(entry) = journal.entries.get_mut(1) {
            entry.event = toggled(42);
        }
        let err = journal.verify_chain().unwrap_err();
        assert!(matches!(err, MarketError::LedgerInvariantViolation { .. }));
    }

    #[test]
    fn eviction_keeps_chain_verifiable() {
        let mut journal = EventJournal::new(3);
        for id in 0..10 {
            append(&mut journal, id);
        }
        assert_eq!(journal.len(), 3);
        assert_eq!(journal.next_sequence(), 10);
        assert_eq!(journal.iter().next().map(|e| e.sequence), Some(7));
        journal.verify_chain().unwrap();
    }

    #[test]
    fn since_filters_by_sequence() {
        let mut journal = EventJournal::new(8);
        for id in 0..4 {
            append(&mut journal, id);
        }
        let seqs: Vec<_> = journal.since(2).map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert_eq!(journal.last().map(|e| e.sequence), Some(3));
    }
}
