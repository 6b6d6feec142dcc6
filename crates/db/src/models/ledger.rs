//! Star ledger read models and outcomes.

use serde::Serialize;
use sqlx::FromRow;
use starquest_core::ledger;
use starquest_core::types::{EntityId, Stars};

use crate::models::redemption::PrizeRedemption;

/// Both views of a seeker's balance, read in one statement.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct SeekerBalance {
    pub seeker_id: EntityId,
    /// Rewards of completed quests assigned to the seeker.
    pub earned: Stars,
    /// Costs of the seeker's redemptions.
    pub spent: Stars,
    /// The `seekers.stars` cache, expected to equal `earned - spent`.
    pub cached: Stars,
}

impl SeekerBalance {
    /// Earned minus spent.
    pub fn derived(&self) -> Stars {
        ledger::derived_balance(self.earned, self.spent)
    }

    /// The balance shown to clients: derived, floored at zero.
    pub fn spendable(&self) -> Stars {
        ledger::spendable(self.derived())
    }

    /// Whether the cache disagrees with the ledger.
    pub fn has_drift(&self) -> bool {
        self.cached != self.derived()
    }
}

/// Result of a guarded redemption attempt.
#[derive(Debug)]
pub enum RedeemOutcome {
    /// Debit applied and ledger row written.
    Redeemed(PrizeRedemption),
    /// No seeker with that id.
    SeekerNotFound,
    /// The conditional debit matched no row; nothing was written.
    /// `available` is the cached balance as re-read, possibly negative.
    InsufficientBalance { available: Stars },
}
