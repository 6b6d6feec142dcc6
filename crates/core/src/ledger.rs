//! Star ledger arithmetic and redemption certificates.
//!
//! A seeker's balance is derived: stars earned from completed quests minus
//! stars spent on redemptions. The `seekers.stars` column caches that exact
//! value so the store can guard debits atomically. Clients are shown the
//! balance floored at zero.

use chrono::Utc;
use rand::Rng;

use crate::error::CoreError;
use crate::types::{EntityId, Stars, Timestamp};

/// Prefix of every certificate id.
pub const CERTIFICATE_PREFIX: &str = "QM";

/// Number of random base-36 characters in a certificate id.
pub const CERTIFICATE_RANDOM_LEN: usize = 6;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Earned-minus-spent, as stored in the ledger tables.
pub fn derived_balance(earned: Stars, spent: Stars) -> Stars {
    earned - spent
}

/// The balance shown to a seeker. A derived balance dips below zero when a
/// rewarded quest is deleted after its stars were spent; the debt stays in
/// the ledger and must be earned back before anything can be redeemed.
pub fn spendable(derived: Stars) -> Stars {
    derived.max(0)
}

/// Reject negative star amounts (rewards, prize costs, redemption costs).
pub fn validate_star_amount(field: &str, amount: Stars) -> Result<(), CoreError> {
    if amount < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative, got {amount}"
        )));
    }
    Ok(())
}

/// Check that `available` covers `required`.
pub fn ensure_sufficient(
    seeker_id: EntityId,
    available: Stars,
    required: Stars,
) -> Result<(), CoreError> {
    if available < required {
        return Err(CoreError::InsufficientBalance {
            seeker_id,
            required,
            available,
        });
    }
    Ok(())
}

/// Resolve the cost a redemption is charged.
///
/// The prize's current price is authoritative. A caller-quoted cost is
/// accepted only when it matches, so a price change between display and
/// redemption surfaces as a conflict instead of charging the wrong amount.
pub fn resolve_redemption_cost(
    prize_id: EntityId,
    prize_cost: Stars,
    quoted: Option<Stars>,
) -> Result<Stars, CoreError> {
    match quoted {
        None => Ok(prize_cost),
        Some(q) if q < 0 => Err(CoreError::Validation(format!(
            "stars_cost must not be negative, got {q}"
        ))),
        Some(q) if q == prize_cost => Ok(q),
        Some(q) => Err(CoreError::Conflict(format!(
            "Prize {prize_id} costs {prize_cost} stars, not {q}"
        ))),
    }
}

/// Generate a certificate id for a redemption at `now`.
///
/// Format: `QM-<milliseconds since epoch, base 36>-<6 random base-36 chars>`.
pub fn generate_certificate_id(now: Timestamp) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let mut rng = rand::rng();
    let suffix: String = (0..CERTIFICATE_RANDOM_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{CERTIFICATE_PREFIX}-{}-{suffix}", to_base36(millis))
}

/// Certificate id stamped with the current time.
pub fn new_certificate_id() -> String {
    generate_certificate_id(Utc::now())
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
