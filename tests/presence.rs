//! Integration tests per il PresenceRegistry
//!
//! La proprietà che definisce il componente: register/unregister/lookup
//! concorrenti da molti task senza voci perse, duplicate o letture parziali.

use futures::future::join_all;
use std::sync::Arc;
use support_chat::dtos::WsEvent;
use support_chat::ws::PresenceRegistry;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_register_then_unregister_half_keeps_presence_accurate() {
    let registry = Arc::new(PresenceRegistry::new());

    // 100 utenti distinti, una connessione ciascuno, registrati in parallelo
    let handles = join_all((0..100).map(|user_id| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let (tx, rx) = mpsc::unbounded_channel();
            let conn_id = registry.register(user_id, tx);
            (user_id, conn_id, rx)
        })
    }))
    .await;

    let mut connections: Vec<_> = handles.into_iter().map(|h| h.expect("join")).collect();
    assert_eq!(registry.online_count(), 100);

    // sganciamo in parallelo gli utenti pari
    let to_drop: Vec<_> = connections
        .drain(..)
        .filter(|(user_id, _, _)| user_id % 2 == 0)
        .collect();
    let results = join_all(to_drop.into_iter().map(|(user_id, conn_id, _rx)| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let (owner, was_last) = registry.unregister(conn_id).expect("registered");
            assert_eq!(owner, user_id);
            assert!(was_last, "single-connection user must become fully offline");
        })
    }))
    .await;
    for result in results {
        result.expect("join");
    }

    assert_eq!(registry.online_count(), 50);
    for user_id in 0..100 {
        assert_eq!(
            registry.is_online(&user_id),
            user_id % 2 == 1,
            "presence wrong for user {}",
            user_id
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_connections_of_the_same_user_accumulate() {
    let registry = Arc::new(PresenceRegistry::new());

    let handles = join_all((0..32).map(|_| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let (tx, rx) = mpsc::unbounded_channel();
            (registry.register(9, tx), rx)
        })
    }))
    .await;
    let connections: Vec<_> = handles.into_iter().map(|h| h.expect("join")).collect();

    assert_eq!(registry.online_count(), 1);
    assert_eq!(registry.connection_count(&9), 32);
    assert_eq!(registry.connections_for(&9).len(), 32);
    assert!(registry.connections_for(&10).is_empty());

    // ogni connessione riceve la propria copia dell'evento
    let delivered = registry.send_to_user(&9, WsEvent::UserOffline { user_id: 0 });
    assert_eq!(delivered, 32);

    // l'utente resta online finché resta almeno una connessione
    for (i, (conn_id, _rx)) in connections.iter().enumerate() {
        let (_, was_last) = registry.unregister(*conn_id).expect("registered");
        assert_eq!(was_last, i == 31);
    }
    assert!(!registry.is_online(&9));
    assert_eq!(registry.online_count(), 0);
}

#[tokio::test]
async fn delivery_to_offline_user_is_a_counted_noop() {
    let registry = PresenceRegistry::new();
    assert_eq!(registry.send_to_user(&5, WsEvent::UserOffline { user_id: 0 }), 0);

    // un canale chiuso non conta come consegna
    let (tx, rx) = mpsc::unbounded_channel();
    registry.register(5, tx);
    drop(rx);
    assert_eq!(registry.send_to_user(&5, WsEvent::UserOffline { user_id: 0 }), 0);
}
