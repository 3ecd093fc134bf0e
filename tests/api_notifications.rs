//! Integration tests per le notifiche
//!
//! Test per:
//! - GET /notifications
//! - GET /notifications/unread/count
//! - PATCH /notifications/{id}/read

mod common;

#[cfg(test)]
mod notification_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn notifications(server: &TestServer, user: (i32, &str)) -> Value {
        let (name, value) = auth_header(user);
        let response = server.get("/notifications").add_header(name, value).await;
        response.assert_status_ok();
        response.json()
    }

    async fn unread(server: &TestServer, user: (i32, &str)) -> i64 {
        let (name, value) = auth_header(user);
        let response = server
            .get("/notifications/unread/count")
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let count: Value = response.json();
        count["unread"].as_i64().expect("unread")
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_message_and_reply_notify_the_other_party(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let (name, value) = auth_header(ALICE);
        let response = server
            .post("/messages")
            .add_header(name, value)
            .json(&json!({ "recipient_id": BOB.0, "subject": "Hey", "body": "Hello" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let message: Value = response.json();
        let id = message["message_id"].as_i64().expect("message_id");

        let bob_list = notifications(&server, BOB).await;
        assert_eq!(bob_list["total"], 1);
        let first = &bob_list["items"][0];
        assert_eq!(first["title"], "New message");
        assert_eq!(first["content"], "Hey");
        assert_eq!(first["link"], format!("/messages/{}", id));
        assert_eq!(first["is_read"], false);
        assert_eq!(unread(&server, ALICE).await, 0);

        let (name, value) = auth_header(BOB);
        server
            .post(&format!("/messages/{}/reply", id))
            .add_header(name, value)
            .json(&json!({ "body": "Hi" }))
            .await
            .assert_status(StatusCode::CREATED);

        let alice_list = notifications(&server, ALICE).await;
        assert_eq!(alice_list["items"][0]["title"], "New reply");
        assert_eq!(alice_list["items"][0]["link"], format!("/messages/{}/thread", id));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_broadcast_creates_no_notification(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let (name, value) = auth_header(ALICE);
        let response = server
            .post("/messages")
            .add_header(name, value)
            .json(&json!({ "subject": "Question", "body": "For the board" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let message: Value = response.json();
        assert_eq!(message["is_broadcast"], true);

        for admin in [ADMIN, DIANA] {
            assert_eq!(unread(&server, admin).await, 0);
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_mark_read_only_by_owner(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let (name, value) = auth_header(ALICE);
        server
            .post("/messages")
            .add_header(name, value)
            .json(&json!({ "recipient_id": BOB.0, "subject": "Hey", "body": "Hello" }))
            .await
            .assert_status(StatusCode::CREATED);

        let bob_list = notifications(&server, BOB).await;
        let nid = bob_list["items"][0]["notification_id"]
            .as_i64()
            .expect("notification_id");

        let (name, value) = auth_header(ALICE);
        server
            .patch(&format!("/notifications/{}/read", nid))
            .add_header(name, value)
            .await
            .assert_status_not_found();
        assert_eq!(unread(&server, BOB).await, 1);

        let (name, value) = auth_header(BOB);
        server
            .patch(&format!("/notifications/{}/read", nid))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert_eq!(unread(&server, BOB).await, 0);
        Ok(())
    }
}
