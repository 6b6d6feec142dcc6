//! Integration tests for the star ledger:
//! - Balances derived from completed quests and redemptions
//! - Guarded redemption debit, including concurrent attempts
//! - Cache resynchronisation and drift reporting

use assert_matches::assert_matches;
use chrono::Utc;
use sqlx::PgPool;
use starquest_core::ledger::new_certificate_id;
use starquest_core::quest_lifecycle::GuardedAction;
use starquest_core::types::EntityId;
use starquest_db::models::ledger::RedeemOutcome;
use starquest_db::models::prize::CreatePrize;
use starquest_db::models::quest::CreateQuest;
use starquest_db::models::redemption::NewRedemption;
use starquest_db::models::seeker::CreateSeeker;
use starquest_db::repositories::{LedgerRepo, PrizeRepo, QuestRepo, RedemptionRepo, SeekerRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_seeker(pool: &PgPool, name: &str) -> EntityId {
    let input = CreateSeeker {
        id: EntityId::new_v4(),
        name: name.to_string(),
        pin_hash: "not-a-real-hash".to_string(),
        avatar_url: None,
    };
    SeekerRepo::create(pool, &input).await.unwrap().id
}

/// Give a seeker `reward` stars through an approved quest.
async fn earn(pool: &PgPool, seeker: EntityId, reward: i64) -> EntityId {
    let input = CreateQuest {
        id: None,
        title: "Water plants".to_string(),
        description: None,
        reward,
        duration: "10 min".to_string(),
        assigned_to: seeker,
    };
    let quest = QuestRepo::create(pool, EntityId::new_v4(), &input)
        .await
        .unwrap()
        .id;
    QuestRepo::transition(pool, quest, Some(seeker), GuardedAction::Complete)
        .await
        .unwrap();
    QuestRepo::approve(pool, quest, seeker).await.unwrap();
    quest
}

async fn seed_prize(pool: &PgPool, name: &str, cost: i64) -> EntityId {
    let input = CreatePrize {
        id: None,
        name: name.to_string(),
        description: None,
        stars_cost: cost,
        image_url: None,
        available: None,
    };
    PrizeRepo::create(pool, EntityId::new_v4(), &input)
        .await
        .unwrap()
        .id
}

fn redemption(prize_id: EntityId, seeker_id: EntityId, cost: i64) -> NewRedemption {
    NewRedemption {
        id: EntityId::new_v4(),
        prize_id,
        seeker_id,
        stars_cost: cost,
        redeemed_at: Utc::now(),
        certificate_id: new_certificate_id(),
    }
}

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_seeker_balance_is_zero(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.earned, 0);
    assert_eq!(balance.spent, 0);
    assert_eq!(balance.derived(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_balance_of_missing_seeker_is_none(pool: PgPool) {
    assert!(LedgerRepo::balance(&pool, EntityId::new_v4())
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Redeem
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redeem_debits_and_records(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 10).await;
    let prize = seed_prize(&pool, "Ice cream", 8).await;

    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, seeker, 8))
        .await
        .unwrap();
    let record = assert_matches!(outcome, RedeemOutcome::Redeemed(r) => r);
    assert_eq!(record.stars_cost, 8);
    assert!(record.certificate_id.starts_with("QM-"));

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.spent, 8);
    assert_eq!(balance.derived(), 2);
    assert_eq!(balance.cached, 2);

    let history = RedemptionRepo::list_for_seeker(&pool, seeker).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].prize_name, "Ice cream");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redeem_insufficient_writes_nothing(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 4).await;
    let prize = seed_prize(&pool, "Movie night", 10).await;

    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, seeker, 10))
        .await
        .unwrap();
    assert_matches!(outcome, RedeemOutcome::InsufficientBalance { available: 4 });

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.spent, 0);
    assert_eq!(balance.cached, 4);
    assert!(RedemptionRepo::list_all(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redeem_exact_balance_succeeds(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 10).await;
    let prize = seed_prize(&pool, "Movie night", 10).await;

    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, seeker, 10))
        .await
        .unwrap();
    assert_matches!(outcome, RedeemOutcome::Redeemed(_));
    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.derived(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redeem_missing_seeker(pool: PgPool) {
    let prize = seed_prize(&pool, "Sticker", 0).await;
    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, EntityId::new_v4(), 0))
        .await
        .unwrap();
    assert_matches!(outcome, RedeemOutcome::SeekerNotFound);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_insert_rolls_back_debit(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 10).await;

    // Unknown prize: the debit succeeds, the insert hits the foreign key.
    let result = LedgerRepo::redeem(&pool, &redemption(EntityId::new_v4(), seeker, 5)).await;
    assert!(result.is_err());

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.cached, 10);
    assert_eq!(balance.spent, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_redemptions_never_overspend(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 10).await;
    let prize = seed_prize(&pool, "Movie night", 10).await;

    let first = redemption(prize, seeker, 10);
    let second = redemption(prize, seeker, 10);
    let (a, b) = tokio::join!(
        LedgerRepo::redeem(&pool, &first),
        LedgerRepo::redeem(&pool, &second),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let redeemed = outcomes
        .iter()
        .filter(|o| matches!(o, RedeemOutcome::Redeemed(_)))
        .count();
    let refused = outcomes
        .iter()
        .filter(|o| matches!(o, RedeemOutcome::InsufficientBalance { .. }))
        .count();
    assert_eq!(redeemed, 1);
    assert_eq!(refused, 1);

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.spent, 10);
    assert_eq!(balance.derived(), 0);
}

// ---------------------------------------------------------------------------
// Resync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resync_repairs_drift(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    earn(&pool, seeker, 9).await;

    sqlx::query("UPDATE seekers SET stars = 100 WHERE id = $1")
        .bind(seeker)
        .execute(&pool)
        .await
        .unwrap();
    let drifted = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert!(drifted.has_drift());
    assert_eq!(drifted.derived(), 9);

    let stars = LedgerRepo::resync(&pool, seeker).await.unwrap();
    assert_eq!(stars, Some(9));
    let repaired = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert!(!repaired.has_drift());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_spent_reward_deleted_leaves_debt_in_cache(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    let quest = earn(&pool, seeker, 10).await;
    let prize = seed_prize(&pool, "Movie night", 10).await;
    LedgerRepo::redeem(&pool, &redemption(prize, seeker, 10))
        .await
        .unwrap();

    QuestRepo::delete(&pool, quest).await.unwrap();

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.derived(), -10);
    assert_eq!(balance.spendable(), 0);
    assert_eq!(balance.cached, -10);
    assert!(!balance.has_drift());

    // Listings show the floored value.
    let listed = SeekerRepo::find_by_id(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(listed.stars, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_debt_must_be_earned_back_before_redeeming(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    let prize = seed_prize(&pool, "Movie night", 10).await;
    let quest = earn(&pool, seeker, 10).await;
    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, seeker, 10))
        .await
        .unwrap();
    assert_matches!(outcome, RedeemOutcome::Redeemed(_));

    QuestRepo::delete(&pool, quest).await.unwrap();
    earn(&pool, seeker, 10).await;

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.derived(), 0);
    assert_eq!(balance.cached, 0);

    let outcome = LedgerRepo::redeem(&pool, &redemption(prize, seeker, 10))
        .await
        .unwrap();
    assert_matches!(outcome, RedeemOutcome::InsufficientBalance { available: 0 });

    let balance = LedgerRepo::balance(&pool, seeker).await.unwrap().unwrap();
    assert_eq!(balance.spent, 10);
    assert_eq!(balance.derived(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resync_keeps_negative_balance(pool: PgPool) {
    let seeker = seed_seeker(&pool, "Mira").await;
    let quest = earn(&pool, seeker, 6).await;
    let prize = seed_prize(&pool, "Sticker", 4).await;
    LedgerRepo::redeem(&pool, &redemption(prize, seeker, 4))
        .await
        .unwrap();
    sqlx::query("DELETE FROM quests WHERE id = $1")
        .bind(quest)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(LedgerRepo::resync(&pool, seeker).await.unwrap(), Some(-4));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resync_missing_seeker(pool: PgPool) {
    assert_eq!(LedgerRepo::resync(&pool, EntityId::new_v4()).await.unwrap(), None);
}
