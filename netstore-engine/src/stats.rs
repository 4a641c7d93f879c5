//! Per-player transfer counters.
//!
//! Counters only grow. Withdrawals never reduce the deposited counter and
//! vice versa, so `balance` may go negative for a player who mostly takes.

use netstore_types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifetime totals for one player on one network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub deposited: u64,
    pub withdrawn: u64,
}

impl PlayerStat {
    /// Deposited minus withdrawn, clamped to the `i64` range.
    #[must_use]
    pub fn balance(&self) -> i64 {
        let deposited = i64::try_from(self.deposited).unwrap_or(i64::MAX);
        let withdrawn = i64::try_from(self.withdrawn).unwrap_or(i64::MAX);
        deposited.saturating_sub(withdrawn)
    }
}

/// Thread-safe map of player counters with get-or-create semantics.
#[derive(Debug, Default)]
pub struct StatsLedger {
    entries: Mutex<HashMap<PlayerId, PlayerStat>>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (PlayerId, PlayerStat)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerId, PlayerStat>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds to a player's deposited counter and returns the updated stat.
    pub fn record_deposited(&self, player: PlayerId, amount: u32) -> PlayerStat {
        let mut entries = self.lock();
        let stat = entries.entry(player).or_default();
        stat.deposited = stat.deposited.saturating_add(u64::from(amount));
        *stat
    }

    /// Adds to a player's withdrawn counter and returns the updated stat.
    pub fn record_withdrawn(&self, player: PlayerId, amount: u32) -> PlayerStat {
        let mut entries = self.lock();
        let stat = entries.entry(player).or_default();
        stat.withdrawn = stat.withdrawn.saturating_add(u64::from(amount));
        *stat
    }

    pub fn get(&self, player: PlayerId) -> Option<PlayerStat> {
        self.lock().get(&player).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Point-in-time copy, ordered by player for stable output.
    pub fn snapshot(&self) -> BTreeMap<PlayerId, PlayerStat> {
        self.lock().iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Players ranked by amount deposited, highest first.
    pub fn leaderboard(&self) -> Vec<(PlayerId, PlayerStat)> {
        let mut ranked: Vec<_> = self.snapshot().into_iter().collect();
        ranked.sort_by(|a, b| b.1.deposited.cmp(&a.1.deposited).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let ledger = StatsLedger::new();
        let p = PlayerId::random();

        ledger.record_deposited(p, 10);
        let stat = ledger.record_withdrawn(p, 25);

        assert_eq!(stat.deposited, 10);
        assert_eq!(stat.withdrawn, 25);
        assert_eq!(stat.balance(), -15);
    }

    #[test]
    fn counters_saturate() {
        let ledger = StatsLedger::from_entries([(
            PlayerId::random(),
            PlayerStat {
                deposited: u64::MAX - 1,
                withdrawn: 0,
            },
        )]);
        let (player, _) = ledger.leaderboard()[0];
        assert_eq!(ledger.record_deposited(player, 5).deposited, u64::MAX);
        assert_eq!(ledger.get(player).map(|s| s.balance()), Some(i64::MAX));
    }

    #[test]
    fn leaderboard_orders_by_deposits() {
        let ledger = StatsLedger::new();
        let low = PlayerId::random();
        let high = PlayerId::random();
        ledger.record_deposited(low, 1);
        ledger.record_deposited(high, 100);
        ledger.record_withdrawn(low, 500);

        let ranked: Vec<_> = ledger.leaderboard().into_iter().map(|(p, _)| p).collect();
        assert_eq!(ranked, vec![high, low]);
    }

    #[test]
    fn unknown_player_has_no_entry() {
        assert_eq!(StatsLedger::new().get(PlayerId::random()), None);
    }
}
