// tests/leaderboard_tests.rs

mod common;

use chrono::{Duration, Utc};
use common::{TEST_SECRET, admin, bearer, daily_answers, spawn_app, spawn_app_with, student};
use quizboard::config::Config;
use serde_json::{Value, json};

const QUIZ_DATE: &str = "2025-03-01";

async fn submit_daily(
    client: &reqwest::Client,
    address: &str,
    user_id: i64,
    correct: usize,
    time_taken: i64,
) -> reqwest::Response {
    client
        .post(format!("{}/api/quiz-attempts/submit", address))
        .header("Authorization", bearer(user_id))
        .json(&json!({
            "topic": "daily",
            "date": QUIZ_DATE,
            "timeTaken": time_taken,
            "answers": daily_answers(correct)
        }))
        .send()
        .await
        .expect("Submit failed")
}

async fn daily_board(client: &reqwest::Client, address: &str, query: &str) -> Value {
    client
        .get(format!("{}/api/quiz-attempts/leaderboard/daily?{}", address, query))
        .send()
        .await
        .expect("Leaderboard request failed")
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn rank_bonuses_follow_every_submission() {
    // Arrange
    let address = spawn_app(vec![
        student(1, "Ada", "ada"),
        student(2, "Ben", "ben"),
        student(3, "Cy", "cy"),
        student(4, "Dee", "dee"),
    ])
    .await;
    let client = reqwest::Client::new();

    // Act: three students, then a fourth who overtakes everyone
    for (id, correct, time_taken) in [(1, 8, 50), (2, 8, 40), (3, 5, 30)] {
        let response = submit_daily(&client, &address, id, correct, time_taken).await;
        assert_eq!(response.status().as_u16(), 201);
    }
    let before = daily_board(&client, &address, &format!("date={}", QUIZ_DATE)).await;

    let response = submit_daily(&client, &address, 4, 9, 60).await;
    assert_eq!(response.status().as_u16(), 201);
    let latest: Value = response.json().await.unwrap();
    let after = daily_board(&client, &address, &format!("date={}", QUIZ_DATE)).await;

    // Assert
    let rows = |board: &Value| -> Vec<(i64, i64)> {
        board["top"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| (e["studentId"].as_i64().unwrap(), e["points"].as_i64().unwrap()))
            .collect()
    };
    assert_eq!(before["date"], QUIZ_DATE);
    assert_eq!(rows(&before), vec![(2, 13), (1, 11), (3, 6)]);

    assert_eq!(latest["attempt"]["points"], 14);
    assert_eq!(rows(&after), vec![(4, 14), (2, 11), (1, 9)]);
    assert_eq!(after["top"][0]["rank"], 1);
    assert_eq!(after["top"][0]["name"], "Dee Tester");
    assert_eq!(after["top"][0]["username"], "dee");

    // Displaced out of the podium: only the raw score remains.
    let everyone = daily_board(&client, &address, &format!("date={}&limit=10", QUIZ_DATE)).await;
    assert_eq!(rows(&everyone).last(), Some(&(3, 5)));

    // Aggregate reflects the recomputed points.
    let aggregate: Vec<Value> = client
        .get(format!("{}/api/quiz-attempts/leaderboard/daily/aggregate", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let totals: Vec<(i64, i64, i64)> = aggregate
        .iter()
        .map(|e| {
            (
                e["studentId"].as_i64().unwrap(),
                e["totalPoints"].as_i64().unwrap(),
                e["totalAttempts"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(totals, vec![(4, 14, 1), (2, 11, 1), (1, 9, 1), (3, 5, 1)]);
}

#[tokio::test]
async fn empty_day_has_empty_board() {
    // Arrange
    let address = spawn_app(vec![]).await;
    let client = reqwest::Client::new();

    // Act
    let board = daily_board(&client, &address, "date=2024-12-31").await;
    let malformed = client
        .get(format!("{}/api/quiz-attempts/leaderboard/daily?date=yesterday", address))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(board["date"], "2024-12-31");
    assert_eq!(board["top"].as_array().unwrap().len(), 0);
    assert_eq!(malformed.status().as_u16(), 400);
}

#[tokio::test]
async fn session_window_round_trip() {
    // Arrange
    let address = spawn_app(vec![admin(1), student(2, "Ben", "ben")]).await;
    let client = reqwest::Client::new();
    let session_url = format!("{}/api/quiz-attempts/session", address);
    let now = Utc::now();
    let window = json!({
        "date": QUIZ_DATE,
        "startAt": now - Duration::hours(1),
        "endAt": now + Duration::hours(1),
    });

    // Act
    let unconfigured: Value = client
        .get(format!("{}?date={}", session_url, QUIZ_DATE))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let anonymous = client.post(&session_url).json(&window).send().await.unwrap();
    let by_student = client
        .post(&session_url)
        .header("Authorization", bearer(2))
        .json(&window)
        .send()
        .await
        .unwrap();
    let by_admin = client
        .post(&session_url)
        .header("Authorization", bearer(1))
        .json(&window)
        .send()
        .await
        .unwrap();
    let inverted = client
        .post(&session_url)
        .header("X-User-ID", "1")
        .json(&json!({
            "date": QUIZ_DATE,
            "startAt": now + Duration::hours(1),
            "endAt": now - Duration::hours(1),
        }))
        .send()
        .await
        .unwrap();
    let configured: Value = client
        .get(format!("{}?date={}", session_url, QUIZ_DATE))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(unconfigured["isLive"], false);
    assert!(unconfigured.get("startAt").is_none());
    assert_eq!(anonymous.status().as_u16(), 401);
    assert_eq!(by_student.status().as_u16(), 403);
    assert_eq!(by_admin.status().as_u16(), 200);
    assert_eq!(inverted.status().as_u16(), 400);

    assert_eq!(configured["date"], QUIZ_DATE);
    assert_eq!(configured["isLive"], true);
    assert!(configured["startAt"].is_string());
    assert!(configured["now"].is_string());
}

async fn set_window(
    client: &reqwest::Client,
    address: &str,
    admin_id: i64,
    start_hours: i64,
    end_hours: i64,
) {
    let now = Utc::now();
    let response = client
        .post(format!("{}/api/quiz-attempts/session", address))
        .header("Authorization", bearer(admin_id))
        .json(&json!({
            "date": QUIZ_DATE,
            "startAt": now + Duration::hours(start_hours),
            "endAt": now + Duration::hours(end_hours),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn enforced_window_blocks_closed_days() {
    // Arrange
    let config = Config {
        enforce_session_window: true,
        ..Config::for_tests(TEST_SECRET)
    };
    let address = spawn_app_with(
        vec![admin(1), student(2, "Ben", "ben"), student(3, "Cy", "cy")],
        config,
    )
    .await;
    let client = reqwest::Client::new();

    set_window(&client, &address, 1, -1, 1).await;
    let on_time = submit_daily(&client, &address, 2, 6, 30).await;
    assert_eq!(on_time.status().as_u16(), 201);
    let on_time: Value = on_time.json().await.unwrap();

    // Act: the window closes
    set_window(&client, &address, 1, -3, -2).await;
    let retry = submit_daily(&client, &address, 2, 10, 5).await;
    let late = submit_daily(&client, &address, 3, 6, 30).await;
    let ungated = client
        .post(format!("{}/api/quiz-attempts/submit", address))
        .header("Authorization", bearer(3))
        .json(&json!({
            "date": "2025-03-02",
            "timeTaken": 30,
            "answers": daily_answers(6)
        }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(retry.status().as_u16(), 409);
    let retry: Value = retry.json().await.unwrap();
    assert_eq!(retry["attempt"], on_time["attempt"]);

    assert_eq!(late.status().as_u16(), 403);
    let late: Value = late.json().await.unwrap();
    assert!(late["message"].is_string());
    assert_eq!(ungated.status().as_u16(), 201);

    let board = daily_board(&client, &address, &format!("date={}", QUIZ_DATE)).await;
    let students: Vec<i64> = board["top"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["studentId"].as_i64().unwrap())
        .collect();
    assert_eq!(students, vec![2]);
}
