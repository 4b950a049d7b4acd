//! Cooperative timer facility.
//!
//! A virtual clock plus a set of pending callbacks, owned by a single
//! session. Nothing here spawns threads: time only moves when the owner
//! calls [`Scheduler::pop_due`] with a later instant, and each due entry
//! is handed back to the owner to run to completion before the next one.
//!
//! Entries fire in due-time order; entries due at the same instant fire
//! in the order they were scheduled.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Cancellation token for a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<K> {
    kind: K,
    /// Re-armed with this period after firing.
    every: Option<Duration>,
}

/// Ordering key: due instant, then a monotonically increasing sequence.
type Slot = (Duration, u64);

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<Slot, (TimerId, Entry<K>)>,
    /// TimerId -> current slot, so cancellation survives re-arming.
    index: HashMap<TimerId, Slot>,
}

impl<K: Clone> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Virtual time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Fire `kind` once, `delay` from now.
    pub fn schedule_once(&mut self, delay: Duration, kind: K) -> TimerId {
        let id = TimerId(self.bump());
        self.insert(id, self.now + delay, Entry { kind, every: None });
        id
    }

    /// Fire `kind` every `period`, first firing one period from now.
    ///
    /// A zero period would never let time advance, so it is treated as
    /// one millisecond.
    pub fn schedule_every(&mut self, period: Duration, kind: K) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        let id = TimerId(self.bump());
        self.insert(
            id,
            self.now + period,
            Entry {
                kind,
                every: Some(period),
            },
        );
        id
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(slot) => self.pending.remove(&slot).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.index.clear();
    }

    /// Take the earliest entry due at or before `until`.
    ///
    /// Moves the clock to that entry's due time. Repeating entries are
    /// re-armed before they are returned, keeping their id. Returns `None`
    /// once nothing is due, leaving the clock at `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, K)> {
        let slot = match self.pending.keys().next() {
            Some(&slot) if slot.0 <= until => slot,
            _ => {
                self.now = self.now.max(until);
                return None;
            }
        };
        let (id, entry) = self.pending.remove(&slot)?;
        self.index.remove(&id);
        self.now = slot.0;

        if let Some(period) = entry.every {
            self.insert(id, slot.0 + period, entry.clone());
        }
        Some((id, entry.kind))
    }

    fn insert(&mut self, id: TimerId, due: Duration, entry: Entry<K>) {
        let slot = (due, self.bump());
        self.pending.insert(slot, (id, entry));
        self.index.insert(id, slot);
    }

    fn bump(&mut self) -> u64 {
        let n = self.next_seq;
        self.next_seq += 1;
        n
    }
}

impl<K: Clone> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
