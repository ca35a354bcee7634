//! The in-memory CRM snapshot.
//!
//! A [`Dataset`] is loaded once at startup and shared read-only for the
//! lifetime of the process.

pub mod loader;

use crate::models::{Account, Activity, Deal, Rep, Target};

/// Immutable snapshot of the five record collections.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub accounts: Vec<Account>,
    pub reps: Vec<Rep>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
    pub targets: Vec<Target>,
}

impl Dataset {
    /// True when the snapshot holds no deals.
    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    /// One-line record counts, for logs.
    pub fn describe(&self) -> String {
        format!(
            "{} accounts, {} reps, {} deals, {} activities, {} targets",
            self.accounts.len(),
            self.reps.len(),
            self.deals.len(),
            self.activities.len(),
            self.targets.len()
        )
    }
}
