//! HTTP-level tests for the prize catalogue.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_prize, create_seeker, delete, earn, get, post_json,
    put_json,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_get_prize(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/prizes",
        json!({ "name": "Ice cream", "starsCost": 8, "imageUrl": "/prizes/ice.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let prize = body_json(response).await;
    assert_eq!(prize["stars_cost"], 8);
    assert_eq!(prize["available"], true);

    let id = prize["id"].as_str().unwrap();
    let response = get(build_test_app(pool), &format!("/api/prizes/{id}")).await;
    assert_eq!(body_json(response).await["name"], "Ice cream");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_hides_unavailable_unless_asked(pool: PgPool) {
    create_prize(&pool, "Sticker", 1).await;
    post_json(
        build_test_app(pool.clone()),
        "/api/prizes",
        json!({ "name": "Pony", "stars_cost": 9000, "available": false }),
    )
    .await;

    let response = get(build_test_app(pool.clone()), "/api/prizes").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response = get(build_test_app(pool), "/api/prizes?include_unavailable=true").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_prize(pool: PgPool) {
    let prize = create_prize(&pool, "Sticker", 1).await;

    let response = put_json(
        build_test_app(pool),
        &format!("/api/prizes/{prize}"),
        json!({ "stars_cost": 2, "available": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["stars_cost"], 2);
    assert_eq!(updated["available"], false);
    assert_eq!(updated["name"], "Sticker");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_cost_is_400(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/prizes",
        json!({ "name": "Debt", "stars_cost": -5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unreferenced_prize(pool: PgPool) {
    let prize = create_prize(&pool, "Sticker", 1).await;

    let response = delete(build_test_app(pool.clone()), &format!("/api/prizes/{prize}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(pool), &format!("/api/prizes/{prize}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_redeemed_prize_is_409(pool: PgPool) {
    let seeker = create_seeker(&pool, "Mira", "1234").await;
    earn(&pool, &seeker, 5).await;
    let prize = create_prize(&pool, "Sticker", 1).await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/prizes/redeem",
        json!({ "prize_id": prize, "seeker_id": seeker }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete(build_test_app(pool.clone()), &format!("/api/prizes/{prize}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(build_test_app(pool), &format!("/api/prizes/{prize}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
