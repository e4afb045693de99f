//! Integration tests for the review flow, the daily streak gate, quest
//! claiming and leaderboard decay, run against the test database.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use qz_api::router;
use serde_json::json;

use crate::common::{TestClient, TestStateBuilder, db, jwt, test_data};

#[tokio::test]
async fn test_submit_review_schedules_and_counts() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let email = test_data::unique_email("review");
    let username = test_data::unique_username("review");
    let user_id = db::create_test_user(&state.pool, &email, &username)
        .await
        .expect("Failed to create user");
    let set_id = db::create_test_set(&state.pool, user_id, 3)
        .await
        .expect("Failed to create set");

    let token = jwt::create_test_token(user_id, &email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    let response = client
        .post_json_with_auth(
            &format!("/study/{set_id}/review"),
            &json!({ "cardIndex": 0, "quality": 4 }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["interval"].as_i64().unwrap(), 1, "first pass is 1 day");
    assert_eq!(body["cardsStudiedToday"].as_i64().unwrap(), 1);
    assert!(body["nextReviewDate"].is_string());
    let unlocked_ids: Vec<&str> = body["newAchievements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert!(unlocked_ids.contains(&"first_card"));

    // The reviewed card is scheduled for tomorrow; the other two stay due
    let response = client
        .get_with_auth(&format!("/study/{set_id}"), &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["totalCards"].as_i64().unwrap(), 3);
    assert_eq!(body["dueCards"].as_i64().unwrap(), 2);

    let response = client
        .get_with_auth("/stats/me", &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["totalCardsStudied"].as_i64().unwrap(), 1);
    assert_eq!(body["stats"]["totalCorrectAnswers"].as_i64().unwrap(), 1);

    db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_repeat_review_of_a_card_counts_once() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let email = test_data::unique_email("repeat");
    let username = test_data::unique_username("repeat");
    let user_id = db::create_test_user(&state.pool, &email, &username)
        .await
        .expect("Failed to create user");
    let set_id = db::create_test_set(&state.pool, user_id, 1)
        .await
        .expect("Failed to create set");

    let token = jwt::create_test_token(user_id, &email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    for quality in [4, 2] {
        let response = client
            .post_json_with_auth(
                &format!("/study/{set_id}/review"),
                &json!({ "cardIndex": 0, "quality": quality }),
                &token,
                &state.cookie_key,
            )
            .await;
        response.assert_status(StatusCode::OK);
    }

    // The lifetime counter moves with the is_studied flip, not with reviews
    let response = client
        .get_with_auth("/stats/me", &token, &state.cookie_key)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["totalCardsStudied"].as_i64().unwrap(), 1);
    assert_eq!(body["stats"]["cardsStudiedToday"].as_i64().unwrap(), 2);

    db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_tenth_card_of_the_day_starts_a_streak() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let email = test_data::unique_email("streak");
    let username = test_data::unique_username("streak");
    let user_id = db::create_test_user(&state.pool, &email, &username)
        .await
        .expect("Failed to create user");
    let set_id = db::create_test_set(&state.pool, user_id, 10)
        .await
        .expect("Failed to create set");

    let token = jwt::create_test_token(user_id, &email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    for card_index in 0..9 {
        let response = client
            .post_json_with_auth(
                &format!("/study/{set_id}/review"),
                &json!({ "cardIndex": card_index, "quality": 5 }),
                &token,
                &state.cookie_key,
            )
            .await;
        response.assert_status(StatusCode::OK);
    }

    // Nine cards is below the daily goal
    let response = client
        .get_with_auth("/stats/me", &token, &state.cookie_key)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["currentStreak"].as_i64().unwrap(), 0);

    let response = client
        .post_json_with_auth(
            &format!("/study/{set_id}/review"),
            &json!({ "cardIndex": 9, "quality": 5 }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["cardsStudiedToday"].as_i64().unwrap(), 10);

    let response = client
        .get_with_auth("/stats/me", &token, &state.cookie_key)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["stats"]["currentStreak"].as_i64().unwrap(), 1);
    assert_eq!(body["stats"]["longestStreak"].as_i64().unwrap(), 1);

    db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_review_rejects_bad_card_index_and_quality() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let email = test_data::unique_email("badinput");
    let username = test_data::unique_username("badinput");
    let user_id = db::create_test_user(&state.pool, &email, &username)
        .await
        .expect("Failed to create user");
    let set_id = db::create_test_set(&state.pool, user_id, 2)
        .await
        .expect("Failed to create set");

    let token = jwt::create_test_token(user_id, &email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    // Index past the end of the card array: the card does not exist
    let response = client
        .post_json_with_auth(
            &format!("/study/{set_id}/review"),
            &json!({ "cardIndex": 5, "quality": 4 }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Card not found"));

    // Quality and negative index fail validation before any lookup
    let response = client
        .post_json_with_auth(
            &format!("/study/{set_id}/review"),
            &json!({ "cardIndex": 0, "quality": 6 }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = client
        .post_json_with_auth(
            &format!("/study/{set_id}/review"),
            &json!({ "cardIndex": -1, "quality": 4 }),
            &token,
            &state.cookie_key,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_claim_quest_is_idempotent() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let email = test_data::unique_email("quest");
    let username = test_data::unique_username("quest");
    let user_id = db::create_test_user(&state.pool, &email, &username)
        .await
        .expect("Failed to create user");

    let token = jwt::create_test_token(user_id, &email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    let response = client
        .post_with_auth("/stats/claim-quest", &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["message"].as_str().unwrap(), "Achievement granted");
    assert_eq!(body["badge"]["id"].as_str().unwrap(), "newcomer");

    // Claiming again is a no-op success, never an error or a duplicate
    let response = client
        .post_with_auth("/stats/claim-quest", &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(
        body["message"].as_str().unwrap(),
        "Achievement already owned"
    );

    let response = client
        .get_with_auth("/stats/me", &token, &state.cookie_key)
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["achievementsCount"].as_i64().unwrap(), 1);

    db::delete_user(&state.pool, user_id)
        .await
        .expect("Failed to cleanup");
}

#[tokio::test]
async fn test_leaderboard_decays_stale_streaks() {
    let state = TestStateBuilder::new()
        .build()
        .await
        .expect("Failed to create test state");

    let fresh_email = test_data::unique_email("fresh");
    let fresh_username = test_data::unique_username("fresh");
    let fresh_id = db::create_test_user(&state.pool, &fresh_email, &fresh_username)
        .await
        .expect("Failed to create user");

    let stale_email = test_data::unique_email("stale");
    let stale_username = test_data::unique_username("stale");
    let stale_id = db::create_test_user(&state.pool, &stale_email, &stale_username)
        .await
        .expect("Failed to create user");

    let now = Utc::now();
    let stale_date = now - Duration::days(3);
    db::seed_streak(&state.pool, fresh_id, 5, Some(now))
        .await
        .expect("Failed to seed streak");
    db::seed_streak(&state.pool, stale_id, 9, Some(stale_date))
        .await
        .expect("Failed to seed streak");

    let token = jwt::create_test_token(fresh_id, &fresh_email, &state.jwt_secret);
    let app = router::router().with_state(state.clone());
    let client = TestClient::new(app);

    let response = client
        .get_with_auth("/stats/leaderboard?limit=100", &token, &state.cookie_key)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let rows = body.as_array().unwrap();

    let streak_of = |username: &str| {
        rows.iter()
            .find(|r| r["username"].as_str().unwrap() == username)
            .map(|r| r["streak"].as_i64().unwrap())
    };

    // The SQL rendition of the decay rule must agree with the Rust one
    assert_eq!(
        streak_of(&fresh_username),
        Some(i64::from(qz_srs::effective_streak(5, Some(now), now)))
    );
    assert_eq!(
        streak_of(&stale_username),
        Some(i64::from(qz_srs::effective_streak(9, Some(stale_date), now)))
    );
    assert_eq!(streak_of(&stale_username), Some(0));

    db::delete_user(&state.pool, fresh_id)
        .await
        .expect("Failed to cleanup");
    db::delete_user(&state.pool, stale_id)
        .await
        .expect("Failed to cleanup");
}
