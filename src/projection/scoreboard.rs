//! Scoreboard View
//!
//! Read model over the accounts document, sorted by balance. Recomputed on
//! every call, never cached.

use serde::Serialize;

use crate::error::AppResult;
use crate::model::Account;
use crate::repository::AccountRepository;
use crate::store::KeyValueStore;

/// How many rows the leaderboard shows by default
pub const DEFAULT_TOP: usize = 10;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardEntry {
    pub rank: usize,
    pub display_name: String,
    pub balance: u64,
}

#[derive(Debug, Clone)]
pub struct ScoreboardView {
    accounts: AccountRepository,
}

impl ScoreboardView {
    pub fn new(accounts: AccountRepository) -> Self {
        Self { accounts }
    }

    /// All accounts, highest balance first. Ties keep storage order.
    pub fn snapshot<S: KeyValueStore + ?Sized>(&self, store: &S) -> AppResult<Vec<Account>> {
        let mut all = self.accounts.list_all(store)?;
        all.sort_by(|a, b| b.balance().cmp(&a.balance()));
        Ok(all)
    }

    /// First `n` rows of the snapshot
    pub fn top<S: KeyValueStore + ?Sized>(&self, store: &S, n: usize) -> AppResult<Vec<ScoreboardEntry>> {
        Ok(self
            .snapshot(store)?
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, account)| ScoreboardEntry {
                rank: i + 1,
                display_name: account.display_name().to_string(),
                balance: account.balance().value(),
            })
            .collect())
    }

    /// 1-based position of `identifier` in the snapshot
    pub fn rank_of<S: KeyValueStore + ?Sized>(&self, store: &S, identifier: &str) -> AppResult<Option<usize>> {
        Ok(self
            .snapshot(store)?
            .iter()
            .position(|a| a.identifier() == identifier)
            .map(|i| i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seeded() -> (MemoryStore, ScoreboardView) {
        let mut store = MemoryStore::new();
        let repo = AccountRepository::new("sb_users");
        for (id, balance) in [("a@x.io", 5), ("b@x.io", 40), ("c@x.io", 12)] {
            repo.create(&mut store, Account::create(id.into(), id[..1].into(), "secret".into()))
                .unwrap();
            repo.set_balance(&mut store, id, balance).unwrap();
        }
        (store, ScoreboardView::new(repo))
    }

    #[test]
    fn test_snapshot_descending() {
        let (store, view) = seeded();
        let balances: Vec<u64> = view
            .snapshot(&store)
            .unwrap()
            .iter()
            .map(|a| a.balance().value())
            .collect();
        assert_eq!(balances, vec![40, 12, 5]);
    }

    #[test]
    fn test_top_and_rank() {
        let (store, view) = seeded();

        let top = view.top(&store, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].display_name, "b");
        assert_eq!(top[1].balance, 12);

        assert_eq!(view.rank_of(&store, "a@x.io").unwrap(), Some(3));
        assert_eq!(view.rank_of(&store, "nobody@x.io").unwrap(), None);
    }

    #[test]
    fn test_empty() {
        let view = ScoreboardView::new(AccountRepository::new("sb_users"));
        assert!(view.snapshot(&MemoryStore::new()).unwrap().is_empty());
    }
}
