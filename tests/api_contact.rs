//! Integration tests per il form contatti pubblico
//!
//! Test per:
//! - GET /contact/token
//! - POST /contact

mod common;

#[cfg(test)]
mod contact_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn contact_token(server: &TestServer) -> String {
        let response = server.get("/contact/token").await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["csrf_token"]
            .as_str()
            .expect("csrf_token")
            .to_string()
    }

    async fn admin_broadcast_total(server: &TestServer) -> i64 {
        let (name, value) = auth_header(ADMIN);
        let response = server.get("/admin/messages").add_header(name, value).await;
        response.assert_status_ok();
        let page: Value = response.json();
        page["total"].as_i64().expect("total")
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_guest_message_goes_to_administrators(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let token = contact_token(&server).await;

        let response = server
            .post("/contact")
            .json(&json!({
                "name": "Ada",
                "email": "ada@x.com",
                "subject": "Hi",
                "body": "Hello",
                "csrf_token": token
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let message: Value = response.json();
        assert!(message["sender_id"].is_null());
        assert!(message["recipient_id"].is_null());
        assert_eq!(message["is_from_guest"], true);
        assert_eq!(message["is_broadcast"], true);
        assert_eq!(message["sender_name"], "Ada");
        assert_eq!(message["sender_email"], "ada@x.com");
        assert_eq!(message["status"], "unread");
        let id = message["message_id"].clone();

        // visibile a ogni amministratore nella vista broadcast
        for admin in [ADMIN, DIANA] {
            let (name, value) = auth_header(admin);
            let response = server.get("/admin/messages").add_header(name, value).await;
            response.assert_status_ok();
            let page: Value = response.json();
            assert_eq!(page["items"][0]["message_id"], id);
        }

        // ma in nessuna inbox personale
        for user in [ALICE, BOB, CHARLIE, ADMIN, DIANA] {
            let (name, value) = auth_header(user);
            let response = server.get("/messages/inbox").add_header(name, value).await;
            response.assert_status_ok();
            let page: Value = response.json();
            assert_eq!(page["total"], 0);
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_invalid_csrf_token_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/contact")
            .json(&json!({
                "name": "Ada",
                "email": "ada@x.com",
                "subject": "Hi",
                "body": "Hello",
                "csrf_token": "forged"
            }))
            .await;
        response.assert_status_forbidden();

        // un token di sessione non vale come token del form
        let session = create_test_jwt(ALICE.0, ALICE.1, TEST_JWT_SECRET);
        server
            .post("/contact")
            .json(&json!({
                "name": "Ada",
                "email": "ada@x.com",
                "subject": "Hi",
                "body": "Hello",
                "csrf_token": session
            }))
            .await
            .assert_status_forbidden();

        assert_eq!(admin_broadcast_total(&server).await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_guest_fields_are_validated(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let token = contact_token(&server).await;

        let response = server
            .post("/contact")
            .json(&json!({
                "name": "<b></b>",
                "email": "not-an-email",
                "subject": "Hi",
                "body": "Hello",
                "csrf_token": token
            }))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["details"]["name"].is_string());
        assert!(error["details"]["email"].is_string());

        let response = server
            .post("/contact")
            .json(&json!({
                "name": "Ada",
                "email": "ada@x.com",
                "subject": "<script>x()</script>",
                "body": "Hello",
                "csrf_token": token
            }))
            .await;
        response.assert_status_bad_request();
        let error: Value = response.json();
        assert!(error["details"]["subject"].is_string());

        assert_eq!(admin_broadcast_total(&server).await, 0);
        Ok(())
    }
}
