// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::{
    attribute::{AttributeValue, Item, ItemExt},
    database::{
        manager::DatabaseManager,
        schema::{
            DATE_TIME, EMAIL_IDS, MESSAGE_ID, ORIGINAL_MESSAGE_ID, SUBJECT, TEXT, TRASHED_TIME,
            TYPE_YEAR_MONTH, UNREAD,
        },
        table::NativeTable,
        Condition, MetadataStore, QueryRequest, TransactItem, Update,
    },
    error::code::ErrorCode,
};

const TIME_INDEX: &str = "TimeIndex";
const ORIGINAL_INDEX: &str = "OriginalMessageIDIndex";

fn table() -> NativeTable {
    NativeTable::new(
        DatabaseManager::open_in_memory().unwrap(),
        TIME_INDEX,
        ORIGINAL_INDEX,
    )
}

fn email(id: &str, ym: &str, dt: &str) -> Item {
    let mut item = Item::new();
    item.insert(MESSAGE_ID.into(), id.into());
    item.insert(TYPE_YEAR_MONTH.into(), ym.into());
    item.insert(DATE_TIME.into(), dt.into());
    item.insert(SUBJECT.into(), format!("subject {}", id).into());
    item.insert(TEXT.into(), "body".into());
    item.insert(ORIGINAL_MESSAGE_ID.into(), format!("<{}@example.com>", id).into());
    item
}

#[tokio::test]
async fn test_get_put_delete() {
    let table = table();
    let err = table.get_item("missing").await.unwrap_err();
    assert!(err.is(ErrorCode::NotFound));

    table
        .put_item(email("a", "inbox#2024-01", "01-00:00:00"), None)
        .await
        .unwrap();
    let item = table.get_item("a").await.unwrap();
    assert_eq!(item.get_s(SUBJECT), Some("subject a"));

    table.delete_item("a", None).await.unwrap();
    assert!(table.get_item("a").await.unwrap_err().is(ErrorCode::NotFound));
    // deleting again is a no-op
    table.delete_item("a", None).await.unwrap();
}

#[tokio::test]
async fn test_put_requires_key() {
    let table = table();
    let err = table.put_item(Item::new(), None).await.unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput));
}

#[tokio::test]
async fn test_conditional_writes() {
    let table = table();
    let item = email("a", "inbox#2024-01", "01-00:00:00");
    let not_exists = Some(Condition::not_exists(MESSAGE_ID));
    table.put_item(item.clone(), not_exists.clone()).await.unwrap();
    let err = table.put_item(item, not_exists).await.unwrap_err();
    assert!(err.is(ErrorCode::ConditionalCheckFailed));

    let trash = Update::new().set(TRASHED_TIME, "2024-01-02T00:00:00Z");
    let guard = Condition::exists(MESSAGE_ID).and(Condition::not_exists(TRASHED_TIME));
    let updated = table
        .update_item("a", trash.clone(), Some(guard.clone()))
        .await
        .unwrap();
    assert!(updated.has(TRASHED_TIME));
    let err = table.update_item("a", trash, Some(guard)).await.unwrap_err();
    assert!(err.is(ErrorCode::ConditionalCheckFailed));

    let err = table
        .delete_item("a", Some(Condition::begins_with(TYPE_YEAR_MONTH, "draft#")))
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::ConditionalCheckFailed));
    table
        .delete_item("a", Some(Condition::exists(TRASHED_TIME)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_actions() {
    let table = table();
    table
        .put_item(email("t", "thread#2024-01", "01-00:00:00"), None)
        .await
        .unwrap();
    let update = Update::new()
        .append(EMAIL_IDS, vec!["a".into()])
        .set_if_not_exists(UNREAD, true)
        .remove(TEXT);
    table.update_item("t", update, None).await.unwrap();
    let update = Update::new()
        .append(EMAIL_IDS, vec!["b".into()])
        .set_if_not_exists(UNREAD, false);
    let item = table.update_item("t", update, None).await.unwrap();

    assert_eq!(item.get_list(EMAIL_IDS), vec!["a", "b"]);
    assert_eq!(item.get(UNREAD), Some(&AttributeValue::Bool(true)));
    assert!(!item.has(TEXT));
    assert_eq!(table.get_item("t").await.unwrap(), item);
}

#[tokio::test]
async fn test_transaction_is_atomic() {
    let table = table();
    table
        .put_item(email("a", "inbox#2024-01", "01-00:00:00"), None)
        .await
        .unwrap();

    table
        .put_item(email("c", "inbox#2024-01", "03-00:00:00"), None)
        .await
        .unwrap();

    let actions = vec![
        TransactItem::put(email("b", "inbox#2024-01", "02-00:00:00"), None),
        TransactItem::update("a", Update::new().set(UNREAD, true), None),
        TransactItem::condition_check("c", Condition::exists(TRASHED_TIME)),
    ];
    let err = table.transact_write(actions).await.unwrap_err();
    assert!(err.is(ErrorCode::TransactionCanceled));
    assert!(err.to_string().contains("ConditionalCheckFailed"));
    assert!(table.get_item("b").await.unwrap_err().is(ErrorCode::NotFound));
    assert!(!table.get_item("a").await.unwrap().has(UNREAD));

    let actions = vec![
        TransactItem::put(email("b", "inbox#2024-01", "02-00:00:00"), None),
        TransactItem::update("a", Update::new().set(UNREAD, true), None),
        TransactItem::condition_check("a", Condition::not_exists(TRASHED_TIME)),
    ];
    let err = table.transact_write(actions).await.unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput), "duplicate item in one transaction");

    let actions = vec![
        TransactItem::put(email("b", "inbox#2024-01", "02-00:00:00"), None),
        TransactItem::update("a", Update::new().set(UNREAD, true), None),
    ];
    table.transact_write(actions).await.unwrap();
    assert!(table.get_item("b").await.is_ok());
    assert!(table.get_item("a").await.unwrap().has(UNREAD));
}

#[tokio::test]
async fn test_time_index_query_order_and_pagination() {
    let table = table();
    for (id, dt) in [("a", "01-10:00:00"), ("b", "02-10:00:00"), ("c", "03-10:00:00")] {
        table
            .put_item(email(id, "inbox#2024-01", dt), None)
            .await
            .unwrap();
    }
    table
        .put_item(email("x", "sent#2024-01", "01-10:00:00"), None)
        .await
        .unwrap();
    table
        .put_item(email("y", "inbox#2024-02", "01-10:00:00"), None)
        .await
        .unwrap();

    let mut request = QueryRequest::new(TIME_INDEX, "inbox#2024-01");
    request.ascending = false;
    request.limit = Some(2);
    let page = table.query(request.clone()).await.unwrap();
    let ids: Vec<String> = page.items.iter().map(|i| i.get_string(MESSAGE_ID)).collect();
    assert_eq!(ids, vec!["c", "b"]);
    assert!(!page.items[0].has(TEXT), "time index projects a subset");
    assert!(page.items[0].has(SUBJECT));
    let key = page.last_evaluated_key.unwrap();
    assert_eq!(key.get_s(DATE_TIME), Some("02-10:00:00"));

    request.exclusive_start_key = Some(key);
    let page = table.query(request).await.unwrap();
    let ids: Vec<String> = page.items.iter().map(|i| i.get_string(MESSAGE_ID)).collect();
    assert_eq!(ids, vec!["a"]);
    assert!(page.last_evaluated_key.is_none());

    let ascending = table
        .query(QueryRequest::new(TIME_INDEX, "inbox#2024-01"))
        .await
        .unwrap();
    let ids: Vec<String> = ascending
        .items
        .iter()
        .map(|i| i.get_string(MESSAGE_ID))
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_query_walks_a_partition_page_by_page() {
    let table = table();
    for day in 1..=25 {
        let id = format!("m{:02}", day);
        let dt = format!("{:02}-10:00:00", day);
        table
            .put_item(email(&id, "inbox#2024-01", &dt), None)
            .await
            .unwrap();
    }
    // neighbouring partitions share the key prefix up to the month
    table
        .put_item(email("next", "inbox#2024-02", "01-10:00:00"), None)
        .await
        .unwrap();
    table
        .put_item(email("sent", "sent#2024-01", "05-10:00:00"), None)
        .await
        .unwrap();

    let mut request = QueryRequest::new(TIME_INDEX, "inbox#2024-01");
    request.ascending = false;
    request.limit = Some(5);
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let page = table.query(request.clone()).await.unwrap();
        pages += 1;
        assert_eq!(page.items.len(), 5);
        seen.extend(page.items.iter().map(|i| i.get_string(MESSAGE_ID)));
        match page.last_evaluated_key {
            Some(key) => request.exclusive_start_key = Some(key),
            None => break,
        }
    }
    assert_eq!(pages, 5);
    let expected: Vec<String> = (1..=25).rev().map(|day| format!("m{:02}", day)).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_query_filter_applies_after_limit() {
    let table = table();
    let mut trashed = email("a", "inbox#2024-01", "01-10:00:00");
    trashed.insert(TRASHED_TIME.into(), "2024-01-05T00:00:00Z".into());
    table.put_item(trashed, None).await.unwrap();
    table
        .put_item(email("b", "inbox#2024-01", "02-10:00:00"), None)
        .await
        .unwrap();

    let mut request = QueryRequest::new(TIME_INDEX, "inbox#2024-01");
    request.limit = Some(1);
    request.filter = Some(Condition::not_exists(TRASHED_TIME));
    let page = table.query(request).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.last_evaluated_key.is_some());
}

#[tokio::test]
async fn test_original_index_lookup() {
    let table = table();
    table
        .put_item(email("a", "inbox#2024-01", "01-10:00:00"), None)
        .await
        .unwrap();
    table
        .put_item(email("ab", "inbox#2024-01", "01-11:00:00"), None)
        .await
        .unwrap();

    let output = table
        .query(QueryRequest::new(ORIGINAL_INDEX, "<a@example.com>"))
        .await
        .unwrap();
    assert_eq!(output.items.len(), 1);
    let item = &output.items[0];
    assert_eq!(item.get_s(MESSAGE_ID), Some("a"));
    assert!(!item.has(SUBJECT), "original index is keys-only");

    let err = table
        .query(QueryRequest::new("NoSuchIndex", "x"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::InvalidInput));
}

#[tokio::test]
async fn test_batch_get_keeps_request_order() {
    let table = table();
    for id in ["a", "b", "c"] {
        table
            .put_item(email(id, "inbox#2024-01", "01-10:00:00"), None)
            .await
            .unwrap();
    }
    let ids = vec!["c".to_string(), "missing".to_string(), "a".to_string()];
    let items = table.batch_get(&ids).await.unwrap();
    let found: Vec<String> = items.iter().map(|i| i.get_string(MESSAGE_ID)).collect();
    assert_eq!(found, vec!["c", "a"]);
}

#[test]
fn test_condition_evaluation() {
    let item = email("a", "draft#2024-01", "01-10:00:00");
    let draft = Condition::begins_with(TYPE_YEAR_MONTH, "draft#");
    assert!(draft.evaluate(Some(&item)));
    assert!(!draft.clone().negate().evaluate(Some(&item)));
    assert!(!draft.evaluate(None));
    assert!(Condition::not_exists(MESSAGE_ID).evaluate(None));

    let delete_guard = Condition::exists(TRASHED_TIME).or(draft.clone());
    assert!(delete_guard.evaluate(Some(&item)));
    assert!(Condition::equals(SUBJECT, "subject a").evaluate(Some(&item)));
    assert_eq!(
        Condition::exists(TRASHED_TIME).and(draft).to_string(),
        "(attribute_exists(TrashedTime) AND begins_with(TypeYearMonth, \"draft#\"))"
    );
}
