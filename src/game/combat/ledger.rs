// Hit deduplication
//
// A weapon overlapping a hurtbox reports contact every physics tick. The
// defender remembers the last swing timestamp seen from each attacker so one
// swing lands once.

use std::collections::HashMap;

use crate::engine::game_loop::Tick;
use crate::engine::physics::EntityId;
use crate::game::config::LedgerPolicy;

/// Defender-side record of attacker id -> last credited attack timestamp
#[derive(Debug, Clone, Default)]
pub struct HitLedger {
    entries: HashMap<EntityId, Tick>,
    policy: LedgerPolicy,
}

impl HitLedger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    /// True (and recorded) the first time a (attacker, timestamp) pair is seen.
    ///
    /// A new attacker arriving while the ledger holds `threshold` entries
    /// first evicts every entry older than `timestamp - retention`.
    pub fn is_new_attack(&mut self, attacker: EntityId, timestamp: Tick) -> bool {
        if let Some(last) = self.entries.get_mut(&attacker) {
            if *last == timestamp {
                return false;
            }
            *last = timestamp;
            return true;
        }

        if self.entries.len() >= self.policy.threshold {
            let oldest_kept = timestamp.saturating_sub(self.policy.retention);
            let before = self.entries.len();
            self.entries.retain(|_, seen| *seen >= oldest_kept);
            log::trace!(
                "Hit ledger evicted {} stale entries",
                before - self.entries.len()
            );
        }

        self.entries.insert(attacker, timestamp);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_seen(&self, attacker: EntityId) -> Option<Tick> {
        self.entries.get(&attacker).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(retention: u64) -> HitLedger {
        HitLedger::new(LedgerPolicy {
            threshold: 16,
            retention,
        })
    }

    #[test]
    fn test_same_swing_counts_once() {
        let mut ledger = ledger(1);
        assert!(ledger.is_new_attack(7, 100));
        assert!(!ledger.is_new_attack(7, 100));
        assert!(!ledger.is_new_attack(7, 100));
        assert!(ledger.is_new_attack(7, 101));
        assert!(!ledger.is_new_attack(7, 101));
    }

    #[test]
    fn test_attackers_are_independent() {
        let mut ledger = ledger(1);
        assert!(ledger.is_new_attack(1, 50));
        assert!(ledger.is_new_attack(2, 50));
        assert!(!ledger.is_new_attack(1, 50));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_eviction_when_full() {
        let mut ledger = ledger(1);
        for id in 0..16u32 {
            assert!(ledger.is_new_attack(id, 100 + id as Tick));
        }
        assert_eq!(ledger.len(), 16);

        assert!(ledger.is_new_attack(16, 116));

        // Only entries at or after 115 survive
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_seen(15), Some(115));
        assert_eq!(ledger.last_seen(16), Some(116));
        assert_eq!(ledger.last_seen(14), None);
    }

    #[test]
    fn test_no_eviction_below_threshold() {
        let mut ledger = ledger(1);
        for id in 0..15u32 {
            ledger.is_new_attack(id, id as Tick);
        }
        ledger.is_new_attack(99, 1000);
        assert_eq!(ledger.len(), 16);
    }

    #[test]
    fn test_known_attacker_never_triggers_eviction() {
        let mut ledger = ledger(1);
        for id in 0..16u32 {
            ledger.is_new_attack(id, 0);
        }
        assert!(ledger.is_new_attack(3, 500));
        assert_eq!(ledger.len(), 16);
    }

    #[test]
    fn test_early_timestamps_do_not_underflow() {
        let mut ledger = ledger(60);
        for id in 0..16u32 {
            ledger.is_new_attack(id, 0);
        }
        assert!(ledger.is_new_attack(100, 5));
        assert_eq!(ledger.len(), 17);
    }
}
