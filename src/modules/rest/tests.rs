// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use http::StatusCode;
use poem::test::TestClient;
use serde_json::{json, Value};

use crate::modules::{
    context::testing::{deliver, raw_message, test_mailbox, TestMailbox},
    rest::build_route,
    settings::cli::SETTINGS,
};

fn client(mailbox: &TestMailbox) -> TestClient<impl poem::Endpoint> {
    TestClient::new(build_route(mailbox.ctx.clone(), &SETTINGS))
}

async fn body_json(resp: poem::test::TestResponse) -> Value {
    resp.0.into_body().into_json::<Value>().await.unwrap()
}

#[tokio::test]
async fn test_info() {
    let mailbox = test_mailbox();
    let resp = client(&mailbox).get("/info").send().await;
    resp.assert_status_is_ok();
    let body = body_json(resp).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["commit"].is_string());
    assert!(body["build"].is_string());
}

#[tokio::test]
async fn test_not_found_mapping() {
    let mailbox = test_mailbox();
    let cli = client(&mailbox);

    let resp = cli.get("/emails/missing").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("missing"));

    let resp = cli.get("/no/such/route").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trash_then_delete_over_http() {
    let mailbox = test_mailbox();
    deliver(&mailbox, "M1", &raw_message("<m1@x>", None, "Hello"), "2024-01-10T08:00:00Z").await;
    let cli = client(&mailbox);

    cli.delete("/emails/M1")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    cli.post("/emails/M1/trash").send().await.assert_status_is_ok();
    cli.post("/emails/M1/trash")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    cli.delete("/emails/M1").send().await.assert_status_is_ok();
    cli.get("/emails/M1")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_and_cursor_over_http() {
    let mailbox = test_mailbox();
    deliver(&mailbox, "M1", &raw_message("<m1@x>", None, "one"), "2024-01-10T08:00:00Z").await;
    deliver(&mailbox, "M2", &raw_message("<m2@x>", None, "two"), "2024-01-11T08:00:00Z").await;
    let cli = client(&mailbox);

    let resp = cli
        .get("/emails")
        .query("type", &"inbox")
        .query("year", &2024)
        .query("month", &1)
        .query("pageSize", &1)
        .send()
        .await;
    resp.assert_status_is_ok();
    let page = body_json(resp).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["hasMore"], true);
    assert_eq!(page["items"][0]["messageID"], "M2");
    assert_eq!(page["items"][0]["type"], "inbox");
    let cursor = page["nextCursor"].as_str().unwrap().to_string();

    let resp = cli
        .get("/emails")
        .query("type", &"sent")
        .query("year", &2024)
        .query("month", &1)
        .query("nextCursor", &cursor)
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    cli.get("/emails")
        .query("type", &"thread")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    cli.get("/emails")
        .query("type", &"inbox")
        .query("showTrash", &"sometimes")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_raw_content_headers() {
    let mailbox = test_mailbox();
    deliver(&mailbox, "M1", &raw_message("<m1@x>", None, "Hello"), "2024-01-10T08:00:00Z").await;
    let cli = client(&mailbox);

    let resp = cli.get("/emails/M1/raw").send().await;
    resp.assert_status_is_ok();
    resp.assert_header("content-type", "message/rfc822");
    resp.assert_header("content-disposition", "inline");

    let resp = cli.get("/emails/M1/raw/download").send().await;
    resp.assert_status_is_ok();
    let disposition = resp
        .0
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("M1.eml"));

    cli.get("/emails/M1/attachments/nope")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compose_and_send_over_http() {
    let mailbox = test_mailbox();
    let cli = client(&mailbox);

    let resp = cli
        .post("/emails")
        .body_json(&json!({
            "subject": "Hi",
            "from": ["alice@example.com"],
            "to": ["bob@example.com"],
            "text": "Hello"
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let created = body_json(resp).await;
    let draft_id = created["messageID"].as_str().unwrap().to_string();
    assert!(draft_id.starts_with("draft-"));
    assert_eq!(created["sent"], false);

    cli.put(format!("/emails/{}", draft_id))
        .body_json(&json!({"subject": "Hi again", "generateText": "sometimes"}))
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    mailbox.mailer.push_id("OUT1");
    let resp = cli.post(format!("/emails/{}/send", draft_id)).send().await;
    resp.assert_status_is_ok();
    assert_eq!(body_json(resp).await["messageID"], "OUT1");

    cli.post("/emails/OUT1/send")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    cli.post("/emails/OUT1/read")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inbound_endpoint() {
    let mailbox = test_mailbox();
    mailbox
        .ctx
        .blobs
        .put("M9", raw_message("<m9@x>", None, "Inbound").as_bytes())
        .await
        .unwrap();
    let cli = client(&mailbox);

    let resp = cli
        .post("/events/inbound")
        .body_json(&json!({
            "eventSource": "aws:ses",
            "mail": {"messageId": "M9", "timestamp": "2024-01-10T08:00:00Z"},
            "receipt": {}
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(body_json(resp).await, json!({"received": ["M9"]}));

    cli.post("/events/inbound")
        .body_json(&json!({"mail": {}}))
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
