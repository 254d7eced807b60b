//! Integration tests per il ChatService sopra gateway in-memory
//!
//! Coprono le regole di instradamento indipendenti dal trasporto:
//! - primo contatto con benvenuto di sistema (lettura con effetto collaterale)
//! - monotonicità dello stato di lettura
//! - validazione di corpo, mittente e destinatario
//! - bypass anagrafica per l'identità di sistema
//! - calcolo del pool di assistenza per ruolo

mod common;

use axum::http::StatusCode;
use common::*;
use std::collections::HashSet;
use std::sync::Arc;
use support_chat::entities::UserRole;
use support_chat::services::ChatService;

fn service(
    store: Arc<MemoryMessageStore>,
    users: Vec<support_chat::entities::UserAccount>,
) -> ChatService<Arc<MemoryMessageStore>, MemoryDirectory> {
    ChatService::new(store, MemoryDirectory::new(users), test_config())
}

// ============================================================
// Primo contatto: lettura con effetto collaterale, idempotente
// ============================================================

#[tokio::test]
async fn first_contact_inserts_exactly_one_welcome() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store.clone(), default_cast());

    let first = svc.conversation(7).await.expect("first fetch");
    assert_eq!(first.len(), 1, "first fetch should return the welcome only");
    assert_eq!(first[0].sender_id, SYSTEM_ID);
    assert_eq!(first[0].recipient_id, Some(7));
    assert!(first[0].from_support);
    assert_eq!(store.append_count(), 1);

    // seconda lettura: nessun secondo inserimento, stessa sequenza
    let second = svc.conversation(7).await.expect("second fetch");
    assert_eq!(store.append_count(), 1, "welcome must not be inserted twice");
    assert_eq!(second, first);
}

#[tokio::test]
async fn welcome_is_skipped_for_non_empty_conversations() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store.clone(), default_cast());

    svc.process_user_message(7, "ciao").await.expect("send");
    let conversation = svc.conversation(7).await.expect("fetch");

    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation[0].sender_id, 7);
    assert_eq!(store.append_count(), 1, "no welcome for a user with history");
}

// ============================================================
// Stato di lettura monotono
// ============================================================

#[tokio::test]
async fn mark_read_is_monotonic_and_idempotent() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store.clone(), default_cast());

    let message = svc
        .process_support_message(1, 7, "come posso aiutarti?")
        .await
        .expect("send");

    let marked = svc.mark_read(message.message_id).await.expect("mark");
    let marked = marked.expect("first mark performs the transition");
    assert!(marked.is_read);
    let first_read_at = marked.read_at.expect("read_at set on transition");

    // seconda marcatura: no-op, nessun errore, read_at immutato
    let again = svc.mark_read(message.message_id).await.expect("remark");
    assert!(again.is_none());

    let stored = store.all().into_iter().find(|m| m.message_id == message.message_id).unwrap();
    assert!(stored.is_read);
    assert_eq!(stored.read_at, Some(first_read_at));
}

#[tokio::test]
async fn mark_read_on_absent_message_is_a_silent_noop() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    let outcome = svc.mark_read(9999).await.expect("no error on absent id");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn mark_conversation_read_marks_only_that_pair_and_is_idempotent() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store.clone(), default_cast());

    svc.process_support_message(1, 7, "primo").await.expect("send");
    svc.process_support_message(1, 7, "secondo").await.expect("send");
    svc.process_support_message(2, 7, "da un altro operatore")
        .await
        .expect("send");

    let marked = svc.mark_conversation_read(7, 1).await.expect("mark pair");
    assert_eq!(marked.len(), 2);
    assert!(marked.iter().all(|m| m.is_read && m.read_at.is_some()));

    // i messaggi dell'altro operatore restano non letti
    let unread = svc.unread(7).await.expect("unread");
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].sender_id, 2);

    // ripetere non transiziona più nulla
    let again = svc.mark_conversation_read(7, 1).await.expect("remark pair");
    assert!(again.is_empty());
}

// ============================================================
// Validazione invio
// ============================================================

#[tokio::test]
async fn empty_body_is_rejected_with_validation_error() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store.clone(), default_cast());

    let error = svc
        .send_message(1, Some(7), "", false)
        .await
        .expect_err("empty body must be rejected");
    assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.append_count(), 0, "nothing persisted on rejection");
}

#[tokio::test]
async fn unknown_sender_is_rejected_mentioning_the_sender() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    let error = svc
        .send_message(42, Some(7), "hi", false)
        .await
        .expect_err("unknown sender must be rejected");
    assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    assert!(error.message().to_lowercase().contains("sender"));
}

#[tokio::test]
async fn unknown_recipient_is_rejected_mentioning_the_recipient() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    let error = svc
        .send_message(1, Some(4242), "hi", true)
        .await
        .expect_err("unknown recipient must be rejected");
    assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    assert!(error.message().to_lowercase().contains("recipient"));
}

#[tokio::test]
async fn broadcast_send_does_not_validate_a_recipient() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    let message = svc
        .send_message(7, None, "serve aiuto", false)
        .await
        .expect("pool broadcast needs no recipient validation");
    assert_eq!(message.recipient_id, None);
}

#[tokio::test]
async fn system_sender_bypasses_directory_validation() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    // SYSTEM_ID non esiste in anagrafica, eppure l'invio riesce
    let message = svc
        .send_message(SYSTEM_ID, Some(7), "hi", true)
        .await
        .expect("system identity skips sender validation");
    assert_eq!(message.sender_id, SYSTEM_ID);
}

#[tokio::test]
async fn process_wrappers_resolve_their_user_first() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    let error = svc
        .process_user_message(999, "hello")
        .await
        .expect_err("unknown user");
    assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    assert!(error.message().to_lowercase().contains("user"));

    let error = svc
        .process_support_message(999, 7, "hello")
        .await
        .expect_err("unknown support user");
    assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    assert!(error.message().to_lowercase().contains("support"));

    // il wrapper di assistenza forza la direzione from_support
    let message = svc
        .process_support_message(1, 7, "eccomi")
        .await
        .expect("send");
    assert!(message.from_support);
    assert_eq!(message.recipient_id, Some(7));
}

// ============================================================
// Pool di assistenza e ordinamento
// ============================================================

#[tokio::test]
async fn support_pool_is_filtered_by_role() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(
        store,
        vec![
            account(1, "alice", UserRole::Admin),
            account(2, "bob", UserRole::Manager),
            account(3, "carla", UserRole::Client),
        ],
    );

    let ids = svc.support_user_ids().await.expect("support ids");
    assert_eq!(ids, HashSet::from([1, 2]));

    assert!(svc.is_support(1).await.unwrap());
    assert!(svc.is_support(2).await.unwrap());
    assert!(!svc.is_support(3).await.unwrap());
    // utente assente dall'anagrafica: mai nel pool
    assert!(!svc.is_support(999).await.unwrap());
}

#[tokio::test]
async fn conversations_are_ordered_by_send_time() {
    let store = Arc::new(MemoryMessageStore::new());
    let svc = service(store, default_cast());

    svc.process_user_message(7, "uno").await.expect("send");
    svc.process_support_message(1, 7, "due").await.expect("send");
    svc.process_user_message(7, "tre").await.expect("send");

    let conversation = svc.conversation(7).await.expect("fetch");
    let contents: Vec<&str> = conversation.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["uno", "due", "tre"]);

    let pair = svc.conversation_between(1, 7).await.expect("pair");
    // la vista di coppia include i broadcast al pool inviati dall'utente
    assert_eq!(pair.len(), 3);

    // la vista "recenti" è discendente e limitata
    let recent = svc.recent(7, 2).await.expect("recent");
    let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["tre", "due"]);
}
