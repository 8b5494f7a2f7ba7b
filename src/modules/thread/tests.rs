// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    attribute::ItemExt,
    context::testing::{deliver, raw_message, test_mailbox, TestMailbox, TEST_DOMAIN},
    database::schema::*,
    error::{code::ErrorCode, MailboxError, RecordKind},
    format::{is_thread_id, EmailType},
    hook::events::{EventAction, EventKind},
    message::{
        delete::delete_email,
        draft::{create_email, EmailInput},
        trash::trash_email,
    },
    thread::{
        delete_thread, get_thread,
        resolver::{anchor_message_id, local_message_id, resolve_thread, ThreadDecision},
        trash_thread, untrash_thread,
    },
};

const T1: &str = "2024-03-05T12:00:00Z";
const T2: &str = "2024-03-05T12:05:00Z";
const T3: &str = "2024-03-05T12:10:00Z";
const T4: &str = "2024-03-05T12:15:00Z";

async fn thread_of(mailbox: &TestMailbox, id: &str) -> String {
    mailbox
        .ctx
        .store
        .get_item(id)
        .await
        .unwrap()
        .get_string(THREAD_ID)
}

async fn is_latest(mailbox: &TestMailbox, id: &str) -> bool {
    mailbox
        .ctx
        .store
        .get_item(id)
        .await
        .unwrap()
        .has(IS_THREAD_LATEST)
}

/// A <- B <- C, each replying to the previous one.
async fn three_message_thread() -> (TestMailbox, String) {
    let mailbox = test_mailbox();
    deliver(&mailbox, "A", &raw_message("<a@x>", None, "Plans"), T1).await;
    deliver(&mailbox, "B", &raw_message("<b@x>", Some("<a@x>"), "Re: Plans"), T2).await;
    deliver(&mailbox, "C", &raw_message("<c@x>", Some("<b@x>"), "Re: Plans"), T3).await;
    let thread_id = thread_of(&mailbox, "A").await;
    (mailbox, thread_id)
}

#[test]
fn test_anchor_selection() {
    assert_eq!(anchor_message_id(" <a@x> ", "<r@x>"), Some("<a@x>"));
    assert_eq!(anchor_message_id("", "<r@x>  <s@x>"), Some("<s@x>"));
    assert_eq!(anchor_message_id("  ", " "), None);
}

#[test]
fn test_local_message_id() {
    assert_eq!(
        local_message_id("<abc-123@us-west-2.amazonses.com>", TEST_DOMAIN),
        Some("abc-123")
    );
    assert_eq!(local_message_id("<abc@example.com>", TEST_DOMAIN), None);
    assert_eq!(local_message_id("abc@us-west-2.amazonses.com", TEST_DOMAIN), None);
    assert_eq!(local_message_id("<@us-west-2.amazonses.com>", TEST_DOMAIN), None);
}

#[tokio::test]
async fn test_unknown_anchor_is_standalone() {
    let mailbox = test_mailbox();
    let decision = resolve_thread(&mailbox.ctx, "N", "<nobody@x>", "")
        .await
        .unwrap();
    assert_eq!(decision, ThreadDecision::None);
    let decision = resolve_thread(&mailbox.ctx, "N", "", "").await.unwrap();
    assert_eq!(decision, ThreadDecision::None);
}

#[tokio::test]
async fn test_reply_forms_thread() {
    let mailbox = test_mailbox();
    deliver(&mailbox, "A", &raw_message("<a@x>", None, "Plans"), T1).await;
    deliver(&mailbox, "B", &raw_message("<b@x>", Some("<a@x>"), "Re: Plans"), T2).await;

    let thread_id = thread_of(&mailbox, "A").await;
    assert!(is_thread_id(&thread_id));
    assert_eq!(thread_of(&mailbox, "B").await, thread_id);
    assert!(is_latest(&mailbox, "B").await);
    assert!(!is_latest(&mailbox, "A").await);

    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["A", "B"]);
    assert_eq!(thread.subject, "Plans");
    assert_eq!(thread.time_created, T1);
    assert_eq!(thread.emails.len(), 2);
    assert_eq!(thread.emails[0].message_id, "A");
    assert_eq!(thread.emails[1].message_id, "B");
    assert!(thread.emails[1].is_thread_latest);
}

#[tokio::test]
async fn test_third_reply_appends() {
    let (mailbox, thread_id) = three_message_thread().await;
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["A", "B", "C"]);
    assert!(is_latest(&mailbox, "C").await);
    assert!(!is_latest(&mailbox, "B").await);
    assert!(!is_latest(&mailbox, "A").await);
}

#[tokio::test]
async fn test_mid_thread_reply_attaches_to_tail() {
    let (mailbox, thread_id) = three_message_thread().await;
    deliver(&mailbox, "D", &raw_message("<d@x>", Some("<b@x>"), "Re: Plans"), T4).await;

    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["A", "B", "C", "D"]);
    assert_eq!(thread_of(&mailbox, "D").await, thread_id);
    assert!(is_latest(&mailbox, "D").await);
    let flagged = ["A", "B", "C", "D"]
        .iter()
        .filter(|id| thread.emails.iter().any(|e| &e.message_id == *id && e.is_thread_latest))
        .count();
    assert_eq!(flagged, 1);
}

#[tokio::test]
async fn test_redelivery_does_not_duplicate_members() {
    let mailbox = test_mailbox();
    deliver(&mailbox, "A", &raw_message("<a@x>", None, "Plans"), T1).await;
    let reply = raw_message("<b@x>", Some("<a@x>"), "Re: Plans");
    deliver(&mailbox, "B", &reply, T2).await;
    deliver(&mailbox, "B", &reply, T2).await;

    let thread_id = thread_of(&mailbox, "A").await;
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["A", "B"]);
    let received = mailbox
        .notifier
        .summary()
        .into_iter()
        .filter(|(kind, action, id)| {
            *kind == EventKind::Email && *action == EventAction::Received && id == "B"
        })
        .count();
    assert_eq!(received, 2);
}

#[tokio::test]
async fn test_reply_to_sent_mail_matches_by_local_id() {
    let mailbox = test_mailbox();
    mailbox.mailer.push_id("out-1");
    let input = EmailInput {
        subject: "Hello".into(),
        from: vec!["alice@example.com".into()],
        to: vec!["bob@example.com".into()],
        text: "Hi Bob".into(),
        send: Some(true),
        ..Default::default()
    };
    let created = create_email(&mailbox.ctx, &input).await.unwrap();
    assert_eq!(created.message_id, "out-1");

    let parent = format!("<out-1@{}>", TEST_DOMAIN);
    deliver(&mailbox, "R", &raw_message("<r@x>", Some(&parent), "Re: Hello"), T2).await;

    let thread_id = thread_of(&mailbox, "out-1").await;
    assert!(!thread_id.is_empty());
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["out-1", "R"]);
    assert_eq!(thread.subject, "Hello");
    assert_eq!(thread.emails[0].kind, EmailType::Sent.to_string());
}

#[tokio::test]
async fn test_local_id_of_thread_row_is_not_a_reply_target() {
    let (mailbox, thread_id) = three_message_thread().await;

    let parent = format!("<{}@{}>", thread_id, TEST_DOMAIN);
    deliver(&mailbox, "X", &raw_message("<x@x>", Some(&parent), "Re: Plans"), T4).await;

    let thread_row = mailbox.ctx.store.get_item(&thread_id).await.unwrap();
    assert!(!thread_row.has(THREAD_ID));
    assert!(thread_of(&mailbox, "X").await.is_empty());
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert_eq!(thread.email_ids, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_local_id_of_draft_is_not_a_reply_target() {
    let mailbox = test_mailbox();
    let input = EmailInput {
        subject: "Unsent".into(),
        text: "draft".into(),
        ..Default::default()
    };
    let draft = create_email(&mailbox.ctx, &input).await.unwrap();

    let parent = format!("<{}@{}>", draft.message_id, TEST_DOMAIN);
    deliver(&mailbox, "Y", &raw_message("<y@x>", Some(&parent), "Re: Unsent"), T2).await;

    assert!(thread_of(&mailbox, &draft.message_id).await.is_empty());
    assert!(thread_of(&mailbox, "Y").await.is_empty());
}

#[tokio::test]
async fn test_get_thread_rejects_email_rows() {
    let (mailbox, _) = three_message_thread().await;
    let err = get_thread(&mailbox.ctx, "A").await.unwrap_err();
    assert!(err.is(ErrorCode::NotFound));
    let err = get_thread(&mailbox.ctx, "0123456789abcdef0123456789abcdef")
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::NotFound));
}

#[tokio::test]
async fn test_trash_untrash_thread() {
    let (mailbox, thread_id) = three_message_thread().await;

    trash_thread(&mailbox.ctx, &thread_id).await.unwrap();
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert!(thread.trashed_time.is_some());
    assert!(thread.emails.iter().all(|e| e.trashed_time.is_some()));

    let err = trash_thread(&mailbox.ctx, &thread_id).await.unwrap_err();
    assert!(matches!(
        err,
        MailboxError::AlreadyTrashed {
            kind: RecordKind::Thread,
            ..
        }
    ));

    untrash_thread(&mailbox.ctx, &thread_id).await.unwrap();
    let thread = get_thread(&mailbox.ctx, &thread_id).await.unwrap();
    assert!(thread.trashed_time.is_none());
    assert!(thread.emails.iter().all(|e| e.trashed_time.is_none()));

    let err = untrash_thread(&mailbox.ctx, &thread_id).await.unwrap_err();
    assert!(matches!(
        err,
        MailboxError::NotTrashed {
            kind: RecordKind::Thread,
            ..
        }
    ));
    assert!(mailbox
        .notifier
        .summary()
        .contains(&(EventKind::Thread, EventAction::Trashed, thread_id.clone())));
}

#[tokio::test]
async fn test_delete_thread_requires_trash() {
    let (mailbox, thread_id) = three_message_thread().await;

    let err = delete_thread(&mailbox.ctx, &thread_id).await.unwrap_err();
    assert!(err.is(ErrorCode::NotTrashed));

    // members are removed with their thread, not one by one
    trash_email(&mailbox.ctx, "B").await.unwrap();
    let err = delete_email(&mailbox.ctx, "B").await.unwrap_err();
    assert!(matches!(
        err,
        MailboxError::NotTrashed {
            kind: RecordKind::Email,
            ..
        }
    ));

    let reply = EmailInput {
        subject: "Re: Plans".into(),
        text: "draft".into(),
        reply_email_id: Some("C".into()),
        ..Default::default()
    };
    let draft = create_email(&mailbox.ctx, &reply).await.unwrap();

    trash_thread(&mailbox.ctx, &thread_id).await.unwrap();
    delete_thread(&mailbox.ctx, &thread_id).await.unwrap();

    for id in ["A", "B", "C", thread_id.as_str(), draft.message_id.as_str()] {
        let err = mailbox.ctx.store.get_item(id).await.unwrap_err();
        assert!(err.is(ErrorCode::NotFound), "{} should be gone", id);
    }
    let err = mailbox.ctx.blobs.get("A").await.unwrap_err();
    assert!(err.is(ErrorCode::NotFound));
}
