//! Per-user fairness accounting

use sidrf_core::resources;
use sidrf_core::UserId;
use std::collections::BTreeMap;

/// Resource and service totals for one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Sum of the demands of the user's running tasks
    pub allocated: Vec<f64>,
    /// Service received over the whole run; never decreases
    pub cumulative_runtime: f64,
    /// Last computed dominant share
    pub dominant_share: f64,
}

impl UserAccount {
    fn zeroed(num_resources: usize) -> Self {
        Self {
            allocated: vec![0.0; num_resources],
            cumulative_runtime: 0.0,
            dominant_share: 0.0,
        }
    }
}

/// Accounting records keyed by user.
///
/// A user that has never been seen reads as an all-zero account, and the
/// first mutable access inserts that zero record. This is what gives a newly
/// arriving user a share of 0 and therefore top admission priority.
#[derive(Debug, Clone)]
pub struct UserLedger {
    accounts: BTreeMap<UserId, UserAccount>,
    num_resources: usize,
}

impl UserLedger {
    pub fn new(num_resources: usize) -> Self {
        Self {
            accounts: BTreeMap::new(),
            num_resources,
        }
    }

    /// Account for `user`, inserting a zero-valued record on first access
    pub fn account_mut(&mut self, user: UserId) -> &mut UserAccount {
        let num_resources = self.num_resources;
        self.accounts
            .entry(user)
            .or_insert_with(|| UserAccount::zeroed(num_resources))
    }

    pub fn get(&self, user: UserId) -> Option<&UserAccount> {
        self.accounts.get(&user)
    }

    /// Current dominant share; 0 for users without a record
    pub fn share(&self, user: UserId) -> f64 {
        self.get(user).map_or(0.0, |a| a.dominant_share)
    }

    /// Cumulative runtime; 0 for users without a record
    pub fn cumulative_runtime(&self, user: UserId) -> f64 {
        self.get(user).map_or(0.0, |a| a.cumulative_runtime)
    }

    /// Recompute `user`'s dominant share:
    /// `p * max_i(allocated[i] / capacity[i]) + (1 - p) * cumulative_runtime`
    pub fn recompute_share(&mut self, user: UserId, capacity: &[f64], p: f64) -> f64 {
        let account = self.account_mut(user);
        let peak = resources::max_ratio(&account.allocated, capacity);
        account.dominant_share = p * peak + (1.0 - p) * account.cumulative_runtime;
        account.dominant_share
    }

    /// Iterate accounts in ascending user order
    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &UserAccount)> {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_reads_as_zero() {
        let ledger = UserLedger::new(2);
        assert_eq!(ledger.share(9), 0.0);
        assert_eq!(ledger.cumulative_runtime(9), 0.0);
        assert!(ledger.get(9).is_none());
    }

    #[test]
    fn test_account_mut_inserts_zero_record() {
        let mut ledger = UserLedger::new(2);
        let account = ledger.account_mut(4);
        assert_eq!(account.allocated, vec![0.0, 0.0]);
        assert_eq!(account.cumulative_runtime, 0.0);
        assert!(ledger.get(4).is_some());
    }

    #[test]
    fn test_recompute_share_blends_allocation_and_runtime() {
        let mut ledger = UserLedger::new(2);
        let capacity = [10.0, 4.0];
        {
            let account = ledger.account_mut(1);
            account.allocated = vec![5.0, 3.0];
            account.cumulative_runtime = 2.0;
        }

        // Pure DRF: max(0.5, 0.75)
        assert_eq!(ledger.recompute_share(1, &capacity, 1.0), 0.75);
        // Pure service time
        assert_eq!(ledger.recompute_share(1, &capacity, 0.0), 2.0);
        // Blend
        let share = ledger.recompute_share(1, &capacity, 0.5);
        assert!((share - (0.375 + 1.0)).abs() < 1e-12);
        assert_eq!(ledger.share(1), share);
    }

    #[test]
    fn test_iter_is_ordered_by_user() {
        let mut ledger = UserLedger::new(1);
        ledger.account_mut(3);
        ledger.account_mut(1);
        ledger.account_mut(2);
        let users: Vec<UserId> = ledger.iter().map(|(u, _)| *u).collect();
        assert_eq!(users, vec![1, 2, 3]);
    }
}
