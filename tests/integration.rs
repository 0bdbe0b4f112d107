use anyhow::{ensure, Result};
use checkin_issuer::domain::{Clock, Repository};
use checkin_issuer::TokenSigner;
use serde_json::{json, Value};

mod common;

use common::{TestApp, TestServer, SIGNING_SECRET};

async fn fetch_credential(server: &TestServer, event_id: i32, auth: &str) -> Result<Value> {
    // ---
    let response = server
        .client
        .get(server.url(&format!("/events/{event_id}/credential")))
        .header("Authorization", auth)
        .send()
        .await?;

    ensure!(response.status() == 200, "unexpected status {}", response.status());
    Ok(response.json().await?)
}

#[tokio::test]
async fn health_endpoint_works() {
    // ---
    let app = TestApp::new();
    let server = TestServer::new(&app).await;

    for path in ["/health", "/health?mode=full"] {
        let response = server
            .client
            .get(server.url(path))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
    }
}

#[tokio::test]
async fn root_endpoint_works() {
    // ---
    let app = TestApp::new();
    let server = TestServer::new(&app).await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body = response.text().await.expect("Failed to read response body");
    assert!(body.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn credential_requires_session() {
    // ---
    let app = TestApp::new();
    app.repository.insert_event(42, "Opening ceremony");
    let server = TestServer::new(&app).await;

    let response = server
        .client
        .get(server.url("/events/42/credential"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = server
        .client
        .get(server.url("/events/42/credential"))
        .header("Authorization", "Bearer not-a-session")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Invalid or expired session");

    // Nothing was issued for unauthenticated callers.
    assert_eq!(app.repository.credential_count(), 0);
}

#[tokio::test]
async fn session_without_subject_is_rejected_before_event_lookup() {
    // ---
    let app = TestApp::new();
    let server = TestServer::new(&app).await;
    let auth = app.login("").await;

    // Event 999 does not exist; a 404 here would mean the lookup ran first.
    let response = server
        .client
        .get(server.url("/events/999/credential"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Invalid or expired session");

    let response = server
        .client
        .delete(server.url("/events/999/credential"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    // ---
    let app = TestApp::new();
    let server = TestServer::new(&app).await;
    let auth = app.login("u1").await;

    let response = server
        .client
        .get(server.url("/events/999/credential"))
        .header("Authorization", &auth)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn credential_rotation_over_http() -> Result<()> {
    // ---
    let app = TestApp::new();
    app.repository.insert_event(42, "Opening ceremony");
    let server = TestServer::new(&app).await;
    let auth = app.login("u1").await;

    // t=0: fresh token
    let first = fetch_credential(&server, 42, &auth).await?;
    assert_eq!(first["event_id"], 42);
    assert_eq!(first["issuer_id"], "u1");
    assert_eq!(first["expires_at"], "1970-01-01T00:00:30+00:00");

    let token = first["token"].as_str().unwrap_or_default().to_string();
    assert_eq!(token.split('.').count(), 3);

    // An independent verifier with the same secret accepts it.
    let verifier = TokenSigner::new(SIGNING_SECRET)?;
    let claims = verifier.verify(&token, app.clock.now())?;
    assert_eq!(claims.exp, 30);
    assert_eq!(claims.event_id, 42);

    // t=10: same token
    app.clock.set_secs(10);
    let second = fetch_credential(&server, 42, &auth).await?;
    assert_eq!(second, first);

    // t=31: rotated
    app.clock.set_secs(31);
    let third = fetch_credential(&server, 42, &auth).await?;
    assert_ne!(third["token"], first["token"]);
    assert_eq!(third["expires_at"], "1970-01-01T00:01:01+00:00");
    assert_eq!(app.repository.credential_count(), 1);

    Ok(())
}

#[tokio::test]
async fn revoke_forces_rotation() -> Result<()> {
    // ---
    let app = TestApp::new();
    app.repository.insert_event(7, "Workshop");
    let server = TestServer::new(&app).await;
    let auth = app.login("organizer").await;

    let url = server.url("/events/7/credential");

    // Nothing to revoke yet
    let response = server.client.delete(&url).header("Authorization", &auth).send().await?;
    assert_eq!(response.status(), 404);

    let first: Value = server
        .client
        .get(&url)
        .header("Authorization", &auth)
        .send()
        .await?
        .json()
        .await?;

    let response = server.client.delete(&url).header("Authorization", &auth).send().await?;
    assert_eq!(response.status(), 204);
    assert!(app.repository.find_credential(7).await?.is_none());

    let second: Value = server
        .client
        .get(&url)
        .header("Authorization", &auth)
        .send()
        .await?
        .json()
        .await?;
    assert_ne!(second["token"], first["token"]);

    // Revocation only rotates; the old token verifies until its exp.
    let checkin = server.url("/events/7/checkin");
    let response = server
        .client
        .post(&checkin)
        .header("Authorization", &auth)
        .json(&json!({ "token": first["token"] }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    app.clock.set_secs(30);
    let response = server
        .client
        .post(&checkin)
        .header("Authorization", &auth)
        .json(&json!({ "token": first["token"] }))
        .send()
        .await?;
    assert_eq!(response.status(), 401);

    Ok(())
}

#[tokio::test]
async fn checkin_accepts_current_token_and_rejects_others() -> Result<()> {
    // ---
    let app = TestApp::new();
    app.repository.insert_event(42, "Opening ceremony");
    app.repository.insert_event(43, "Closing ceremony");
    let server = TestServer::new(&app).await;
    let station = app.login("organizer").await;
    let attendee = app.login("hacker-1").await;

    let credential: Value = server
        .client
        .get(server.url("/events/42/credential"))
        .header("Authorization", &station)
        .send()
        .await?
        .json()
        .await?;
    let token = credential["token"].clone();

    // Accepted for the right event
    let response = server
        .client
        .post(server.url("/events/42/checkin"))
        .header("Authorization", &attendee)
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["event_id"], 42);
    assert_eq!(body["subject_id"], "hacker-1");
    assert_eq!(body["issuer_id"], "organizer");

    // Wrong event
    let response = server
        .client
        .post(server.url("/events/43/checkin"))
        .header("Authorization", &attendee)
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    // Forged
    let forged = TokenSigner::new("some-other-secret")?.sign(&checkin_issuer::CheckinClaims {
        sub: "organizer".to_string(),
        event_id: 42,
        iat: 0,
        exp: 30,
        jti: "forged".to_string(),
    })?;
    let response = server
        .client
        .post(server.url("/events/42/checkin"))
        .header("Authorization", &attendee)
        .json(&json!({ "token": forged }))
        .send()
        .await?;
    assert_eq!(response.status(), 401);

    // Expired
    app.clock.set_secs(30);
    let response = server
        .client
        .post(server.url("/events/42/checkin"))
        .header("Authorization", &attendee)
        .json(&json!({ "token": token }))
        .send()
        .await?;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Token expired");

    Ok(())
}

#[tokio::test]
async fn create_event_then_issue() -> Result<()> {
    // ---
    let app = TestApp::new();
    let server = TestServer::new(&app).await;
    let auth = app.login("organizer").await;

    let response = server
        .client
        .post(server.url("/events"))
        .header("Authorization", &auth)
        .json(&json!({ "name": "  " }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);

    let response = server
        .client
        .post(server.url("/events"))
        .header("Authorization", &auth)
        .json(&json!({ "name": "Midnight snack" }))
        .send()
        .await?;
    assert_eq!(response.status(), 201);
    let event: Value = response.json().await?;
    assert_eq!(event["name"], "Midnight snack");
    let event_id = event["id"].as_i64().unwrap_or_default();

    let response = server
        .client
        .get(server.url(&format!("/events/{event_id}/credential")))
        .header("Authorization", &auth)
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    Ok(())
}

#[tokio::test]
async fn concurrent_pollers_share_one_credential() -> Result<()> {
    // ---
    let app = TestApp::new();
    app.repository.insert_event(5, "Career fair");
    let server = TestServer::new(&app).await;
    let auth = app.login("station").await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let client = server.client.clone();
        let url = server.url("/events/5/credential");
        let auth = auth.clone();
        handles.push(tokio::spawn(async move {
            let body: Value = client
                .get(url)
                .header("Authorization", auth)
                .send()
                .await?
                .json()
                .await?;
            Ok::<Value, reqwest::Error>(body)
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await??["token"].clone());
    }

    assert_eq!(app.repository.credential_count(), 1);
    let stored = app.repository.find_credential(5).await?.map(|c| c.token);
    assert!(tokens.iter().all(|t| t.as_str() == stored.as_deref()));

    Ok(())
}
