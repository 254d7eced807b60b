//! WebSocket Utilities - Funzioni di supporto per l'hub realtime

use crate::core::{AppError, AppState};
use crate::dtos::WsEvent;
use crate::repositories::{MessageStore, UserDirectory};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Converte un errore applicativo in un evento per la sola connessione
/// mittente. La connessione resta aperta e registrata.
pub fn send_error(conn_tx: &UnboundedSender<WsEvent>, error: &AppError) {
    let event = WsEvent::Error {
        code: error.status().as_u16(),
        message: error.message().to_string(),
    };
    if conn_tx.send(event).is_err() {
        debug!("Client disconnected before the error could be delivered");
    }
}

/// Consegna l'evento a ogni operatore di assistenza online, escludendo
/// eventualmente un utente (tipicamente il mittente).
///
/// Il pool viene ricalcolato dall'anagrafica a ogni chiamata. Ritorna il
/// numero di connessioni raggiunte.
pub async fn broadcast_to_support<S: MessageStore, D: UserDirectory>(
    state: &AppState<S, D>,
    event: WsEvent,
    exclude_user: Option<i32>,
) -> Result<usize, AppError> {
    let support_ids = state.chat.support_user_ids().await?;

    let mut sent = 0;
    for support_id in support_ids {
        if Some(support_id) == exclude_user {
            continue;
        }
        sent += state.presence.send_to_user(&support_id, event.clone());
    }

    Ok(sent)
}

/// Notifica al pool di assistenza che un utente si è connesso.
///
/// Contratto: fire-and-forget. Nessuna persistenza, nessun retry e nessun
/// ack; un fallimento viene solo loggato e non ritarda mai la connessione.
/// Gli operatori non si annunciano a se stessi.
pub async fn notify_support_of_join<S: MessageStore, D: UserDirectory>(
    state: &AppState<S, D>,
    user_id: i32,
) {
    match state.chat.is_support(user_id).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => {
            warn!("Join notification skipped, directory unavailable: {:?}", e);
            return;
        }
    }

    let username = match state.chat.find_user(user_id).await {
        Ok(Some(user)) => user.username,
        Ok(None) => format!("user {}", user_id),
        Err(e) => {
            warn!("Join notification skipped, directory unavailable: {:?}", e);
            return;
        }
    };

    match broadcast_to_support(state, WsEvent::UserJoined { user_id, username }, None).await {
        Ok(sent) => info!(sent, "Join notification delivered to support pool"),
        Err(e) => warn!("Join notification not delivered: {:?}", e),
    }
}

/// Evento di presenza a tutte le connessioni: l'utente non ha più
/// connessioni aperte. Fire-and-forget.
pub fn broadcast_user_offline<S: MessageStore, D: UserDirectory>(
    state: &AppState<S, D>,
    user_id: i32,
) {
    let sent = state
        .presence
        .broadcast_all(WsEvent::UserOffline { user_id });
    debug!(user_id, sent, "User offline broadcast");
}
