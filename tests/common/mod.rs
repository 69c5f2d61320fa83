#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use agenda::services::email::{EmailError, EmailMessage, EmailService};
use agenda::services::password::hash_password;
use async_trait::async_trait;
use serde_json::{Value, json};
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::net::TcpListener;
use uuid::Uuid;

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("agenda=debug")
            .with_test_writer()
            .init();
    });
}

/// A mock email service that stores sent emails for testing purposes.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl MockEmailer {
    pub fn new() -> Self {
        Self {
            sent_emails: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }

    pub fn last_sent_email(&self) -> Option<SentEmail> {
        self.sent_emails.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailService for MockEmailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent_emails.lock().unwrap().push(SentEmail {
            recipient: message.recipient(),
            subject: message.subject.clone(),
            body_html: message.body_html.clone(),
        });
        Ok(())
    }
}

/// Spawns the application and returns its address and mock emailer.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app(test_db_pool: PgPool) -> (String, Arc<MockEmailer>) {
    dotenvy::from_filename_override("tests/data/.test.env").unwrap();
    init_tracing_once();

    let mock_emailer = Arc::new(MockEmailer::new());
    let mock_cloned = Arc::clone(&mock_emailer);

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let app = agenda::app_with_email_service(test_db_pool, Some(mock_cloned));
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    (address, mock_emailer)
}

/// Inserts a user directly into the database and returns its id.
pub async fn seed_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
    provider: bool,
) -> Uuid {
    let password_hash = hash_password(password).expect("Failed to hash test password");

    sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, password_hash, provider)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(provider)
    .fetch_one(pool)
    .await
    .expect("Failed to seed test user")
}

/// Inserts an avatar file and attaches it to the given user.
pub async fn seed_avatar(pool: &PgPool, user_id: Uuid, path: &str, url: &str) -> Uuid {
    let file_id: Uuid =
        sqlx::query_scalar("INSERT INTO files (path, url) VALUES ($1, $2) RETURNING id")
            .bind(path)
            .bind(url)
            .fetch_one(pool)
            .await
            .expect("Failed to seed test file");

    sqlx::query("UPDATE users SET avatar_id = $1 WHERE id = $2")
        .bind(file_id)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to attach avatar to test user");

    file_id
}

/// Logs a seeded user in and returns the access token.
pub async fn login(
    client: &reqwest::Client,
    address: &str,
    email: &str,
    password: &str,
) -> String {
    let response = client
        .post(format!("{address}/sessions"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to create session");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse session");
    body["token"]
        .as_str()
        .expect("Session response should carry a token")
        .to_string()
}

/// Books an appointment and returns the raw response.
pub async fn book_appointment(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    provider_id: Uuid,
    date: &str,
) -> reqwest::Response {
    client
        .post(format!("{address}/appointments"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&json!({"provider_id": provider_id, "date": date}))
        .send()
        .await
        .expect("Failed to book appointment")
}

/// A timestamp `hours` from now, formatted as RFC-3339.
pub fn hours_from_now(hours: i64) -> String {
    (OffsetDateTime::now_utc() + time::Duration::hours(hours))
        .format(&Rfc3339)
        .expect("Failed to format test timestamp")
}
