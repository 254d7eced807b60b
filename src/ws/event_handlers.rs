//! WebSocket Event Handlers - Instradamento dei comandi del client

use crate::core::{AppError, AppState};
use crate::dtos::{MessageDTO, WsCommand, WsEvent};
use crate::repositories::{MessageStore, UserDirectory};
use crate::ws::utils;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

/// Processa un comando arrivato dalla connessione di `user_id`.
///
/// Ogni fallimento di validazione/autorizzazione viene convertito in un
/// evento `Error` consegnato alla sola connessione mittente (`conn_tx`): non
/// viene mai propagato alle altre connessioni e non chiude il socket.
#[instrument(skip(state, conn_tx, command), fields(user_id))]
pub async fn process_command<S: MessageStore, D: UserDirectory>(
    state: &Arc<AppState<S, D>>,
    user_id: i32,
    conn_tx: &UnboundedSender<WsEvent>,
    command: WsCommand,
) {
    if let Err(error) = dispatch(state, user_id, command).await {
        warn!("Command rejected: {:?}", error);
        utils::send_error(conn_tx, &error);
    }
}

async fn dispatch<S: MessageStore, D: UserDirectory>(
    state: &Arc<AppState<S, D>>,
    user_id: i32,
    command: WsCommand,
) -> Result<(), AppError> {
    match command {
        // Utente -> pool: persisti, poi fan-out a tutti gli operatori online.
        // Le connessioni del mittente sono escluse: il client riflette già
        // localmente il proprio messaggio.
        WsCommand::UserMessage { content } => {
            let message = state.chat.process_user_message(user_id, &content).await?;
            let delivered = utils::broadcast_to_support(
                state,
                WsEvent::NewMessage(MessageDTO::from(message)),
                Some(user_id),
            )
            .await?;
            debug!(delivered, "User message fanned out to support pool");
        }

        // Assistenza -> utente: consegna al destinatario e a tutto il pool
        // (mittente incluso), così ogni operatore vede lo scambio
        WsCommand::SupportMessage {
            recipient_id,
            content,
        } => {
            let support_ids = state.chat.support_user_ids().await?;
            if !support_ids.contains(&user_id) {
                return Err(AppError::unauthorized("Not a support user"));
            }

            let message = state
                .chat
                .process_support_message(user_id, recipient_id, &content)
                .await?;
            let event = WsEvent::NewMessage(MessageDTO::from(message));

            let mut delivered = state.presence.send_to_user(&recipient_id, event.clone());
            for support_id in &support_ids {
                if *support_id != recipient_id {
                    delivered += state.presence.send_to_user(support_id, event.clone());
                }
            }
            debug!(delivered, "Support message delivered");
        }

        // Ricevuta di lettura singola: notifica il mittente del messaggio.
        // Nessuna transizione (id assente o già letto) => nessuna notifica.
        WsCommand::MarkRead { message_id } => {
            if let Some(message) = state.chat.mark_read(message_id).await? {
                if let Some(read_at) = message.read_at {
                    state.presence.send_to_user(
                        &message.sender_id,
                        WsEvent::MessageRead {
                            message_id,
                            read_at,
                        },
                    );
                }
            }
        }

        WsCommand::MarkConversationRead { other_user_id } => {
            let marked = state
                .chat
                .mark_conversation_read(user_id, other_user_id)
                .await?;
            if !marked.is_empty() {
                state.presence.send_to_user(
                    &other_user_id,
                    WsEvent::ConversationRead { reader_id: user_id },
                );
            }
        }

        // Segnali effimeri: mai persistiti, consegna diretta al destinatario
        WsCommand::Typing { target_id } => {
            state
                .presence
                .send_to_user(&target_id, WsEvent::Typing { user_id });
        }

        WsCommand::StopTyping { target_id } => {
            state
                .presence
                .send_to_user(&target_id, WsEvent::StoppedTyping { user_id });
        }
    }

    Ok(())
}
