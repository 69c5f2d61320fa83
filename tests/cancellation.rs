mod common;

use common::{book_appointment, hours_from_now, login, seed_user, spawn_app};
use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use agenda::utils::date::{format_pt, start_of_hour};

async fn cancel(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    appointment_id: &str,
) -> reqwest::Response {
    client
        .delete(format!("{address}/appointments/{appointment_id}"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to cancel appointment")
}

#[sqlx::test]
async fn cancellation_succeeds_and_emails_the_provider(pool: PgPool) {
    let (address, mock_emailer) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    let provider_id = seed_user(&pool, "Barbeiro", "barbeiro@example.com", "senha", true).await;
    let token = login(&client, &address, "ana@example.com", "senha").await;

    let requested = hours_from_now(48);
    let booked: Value = book_appointment(&client, &address, &token, provider_id, &requested)
        .await
        .json()
        .await
        .unwrap();
    let appointment_id = booked["id"].as_str().unwrap().to_string();

    let response = cancel(&client, &address, &token, &appointment_id).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], appointment_id);
    assert!(!body["canceled_at"].is_null());
    assert_eq!(body["cancelable"], false);

    // The provider got the cancellation email
    assert_eq!(mock_emailer.sent_count(), 1);
    let email = mock_emailer.last_sent_email().unwrap();
    assert_eq!(email.recipient, "Barbeiro <barbeiro@example.com>");
    assert_eq!(email.subject, "Agendamento cancelado");
    assert!(email.body_html.contains("Ana"));

    let slot = start_of_hour(OffsetDateTime::parse(&requested, &Rfc3339).unwrap());
    assert!(email.body_html.contains(&format_pt(slot)));
}

#[sqlx::test]
async fn canceled_slot_becomes_bookable_again(pool: PgPool) {
    let (address, _) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    seed_user(&pool, "Vera", "vera@example.com", "senha", false).await;
    let provider_id = seed_user(&pool, "Barbeiro", "barbeiro@example.com", "senha", true).await;

    let ana_token = login(&client, &address, "ana@example.com", "senha").await;
    let vera_token = login(&client, &address, "vera@example.com", "senha").await;

    let requested = hours_from_now(48);
    let booked: Value = book_appointment(&client, &address, &ana_token, provider_id, &requested)
        .await
        .json()
        .await
        .unwrap();

    let response = cancel(&client, &address, &ana_token, booked["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // The slot is free again for someone else
    let response = book_appointment(&client, &address, &vera_token, provider_id, &requested).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[sqlx::test]
async fn cancellation_rejects_non_owner(pool: PgPool) {
    let (address, mock_emailer) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    seed_user(&pool, "Vera", "vera@example.com", "senha", false).await;
    let provider_id = seed_user(&pool, "Barbeiro", "barbeiro@example.com", "senha", true).await;

    let ana_token = login(&client, &address, "ana@example.com", "senha").await;
    let vera_token = login(&client, &address, "vera@example.com", "senha").await;

    let booked: Value =
        book_appointment(&client, &address, &ana_token, provider_id, &hours_from_now(48))
            .await
            .json()
            .await
            .unwrap();

    let response = cancel(&client, &address, &vera_token, booked["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Você não tem permissão para cancelar este compromisso."
    );

    // Nothing was canceled, nothing was emailed
    assert_eq!(mock_emailer.sent_count(), 0);
    let canceled_at: Option<OffsetDateTime> =
        sqlx::query_scalar("SELECT canceled_at FROM appointments WHERE id = $1")
            .bind(Uuid::parse_str(booked["id"].as_str().unwrap()).unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(canceled_at.is_none());
}

#[sqlx::test]
async fn cancellation_rejects_inside_six_hour_window(pool: PgPool) {
    let (address, mock_emailer) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    let provider_id = seed_user(&pool, "Barbeiro", "barbeiro@example.com", "senha", true).await;
    let token = login(&client, &address, "ana@example.com", "senha").await;

    // Roughly 2-3 hours of lead time, well inside the window
    let booked: Value =
        book_appointment(&client, &address, &token, provider_id, &hours_from_now(3))
            .await
            .json()
            .await
            .unwrap();

    let response = cancel(&client, &address, &token, booked["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Você só pode cancelar o agendamento com 6 horas de antecedência."
    );
    assert_eq!(mock_emailer.sent_count(), 0);
}

#[sqlx::test]
async fn cancellation_rejects_unknown_appointment(pool: PgPool) {
    let (address, _) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    let token = login(&client, &address, "ana@example.com", "senha").await;

    let response = cancel(&client, &address, &token, &Uuid::new_v4().to_string()).await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Agendamento não encontrado");
}

#[sqlx::test]
async fn canceled_appointments_disappear_from_the_listing(pool: PgPool) {
    let (address, _) = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();

    seed_user(&pool, "Ana", "ana@example.com", "senha", false).await;
    let provider_id = seed_user(&pool, "Barbeiro", "barbeiro@example.com", "senha", true).await;
    let token = login(&client, &address, "ana@example.com", "senha").await;

    let booked: Value =
        book_appointment(&client, &address, &token, provider_id, &hours_from_now(48))
            .await
            .json()
            .await
            .unwrap();

    let response = cancel(&client, &address, &token, booked["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let listing: Value = client
        .get(format!("{address}/appointments"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 0);
}
