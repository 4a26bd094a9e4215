// tests/common/mod.rs

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use quizboard::{
    config::Config,
    db::MemoryDirectory,
    models::{quiz_date::QuizDate, user::DirectoryUser},
    routes,
    state::AppState,
    utils::jwt::sign_jwt,
};
use sqlx::{PgPool, postgres::PgPoolOptions};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub fn student(id: i64, first_name: &str, username: &str) -> DirectoryUser {
    DirectoryUser {
        id,
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        username: username.to_string(),
        role: "student".to_string(),
        is_approved: true,
    }
}

pub fn admin(id: i64) -> DirectoryUser {
    DirectoryUser {
        role: "admin".to_string(),
        ..student(id, "Root", "root")
    }
}

pub fn bearer(user_id: i64) -> String {
    let token = sign_jwt(user_id, "student", TEST_SECRET, 600).expect("Failed to sign token");
    format!("Bearer {}", token)
}

/// Spawns the app on a random port with an in-memory store and the given users.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app(users: Vec<DirectoryUser>) -> String {
    spawn_app_with(users, Config::for_tests(TEST_SECRET)).await
}

pub async fn spawn_app_with(users: Vec<DirectoryUser>, config: Config) -> String {
    let directory = Arc::new(MemoryDirectory::new());
    for user in users {
        directory.insert(user).await;
    }

    serve(AppState::in_memory(directory, config)).await
}

/// Serves `state` on a random port and returns the base URL.
async fn serve(state: AppState) -> String {
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Ten answers to a daily quiz of which the first `correct` are right.
pub fn daily_answers(correct: usize) -> serde_json::Value {
    let answers: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({
                "questionId": format!("d{}", i),
                "questionText": format!("Daily question {}", i),
                "selectedOption": if i < correct { "A" } else { "B" },
                "correctAnswer": "A"
            })
        })
        .collect();
    serde_json::Value::Array(answers)
}

/// A running app backed by Postgres, plus a pool for seeding rows.
pub struct PgApp {
    pub address: String,
    pub pool: PgPool,
}

/// Connects to `DATABASE_URL` and applies migrations.
/// Returns `None` when the variable is unset so Postgres tests can skip.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(pool)
}

pub async fn spawn_pg_app() -> Option<PgApp> {
    let pool = test_pool().await?;
    let config = Config {
        database_url: std::env::var("DATABASE_URL").ok(),
        ..Config::for_tests(TEST_SECRET)
    };

    let address = serve(AppState::postgres(pool.clone(), config)).await;
    Some(PgApp { address, pool })
}

/// Inserts an approved account with a unique username and returns its id.
pub async fn insert_user(pool: &PgPool, first_name: &str, role: &str) -> i64 {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (first_name, last_name, username, role, is_approved)
        VALUES ($1, 'Tester', $2, $3, TRUE)
        RETURNING id
        "#,
    )
    .bind(first_name)
    .bind(&username)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user")
}

/// A random quiz date with no attempts or session left over from earlier runs.
pub async fn fresh_date(pool: &PgPool) -> QuizDate {
    let offset = (uuid::Uuid::new_v4().as_u128() % 30_000) as i64;
    let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(offset);

    for table in ["daily_quiz_attempts", "daily_quiz_sessions"] {
        sqlx::query(&format!("DELETE FROM {} WHERE quiz_date = $1", table))
            .bind(date)
            .execute(pool)
            .await
            .expect("Failed to clear quiz date");
    }

    QuizDate::new(date)
}
