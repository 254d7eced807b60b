//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::core::AppState;
use crate::dtos::{WsCommand, WsEvent};
use crate::repositories::{MessageStore, UserDirectory};
use crate::ws::event_handlers::process_command;
use crate::ws::presence::ConnectionId;
use crate::ws::utils;
use crate::ws::{RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Duration;
use tokio::time::{interval, timeout};
use tracing::{error, info, instrument, warn};

/// Ciclo di vita della connessione: registrazione nel registro presenze,
/// notifica di ingresso al pool di assistenza, poi due task indipendenti per
/// lettura e scrittura sulle due metà del socket.
#[instrument(skip(ws, state), fields(user_id))]
pub async fn handle_socket<S: MessageStore, D: UserDirectory>(
    ws: WebSocket,
    state: Arc<AppState<S, D>>,
    user_id: i32,
) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale unbounded per la consegna di eventi a questa connessione;
    // il trasmettitore vive nel registro presenze
    let (int_tx, int_rx) = unbounded_channel::<WsEvent>();

    let conn_id = state.presence.register(user_id, int_tx.clone());
    info!("User registered as online");

    // Notifica one-way al pool: best effort, nessun retry (vedi utils)
    utils::notify_support_of_join(&state, user_id).await;

    // task che sta in ascolto del websocket
    tokio::spawn(listen_ws(user_id, conn_id, ws_rx, int_tx, state.clone()));

    // task che scarica il canale interno verso il client
    tokio::spawn(write_ws(user_id, ws_tx, int_rx));
}

/// Scarica il canale interno della connessione serializzando ogni evento sul
/// socket. Termina quando il canale si chiude (connessione sganciata) o
/// quando una scrittura fallisce.
#[instrument(skip(websocket_tx, internal_rx), fields(user_id))]
pub async fn write_ws(
    user_id: i32,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<WsEvent>,
) {
    info!("Write task started");

    while let Some(event) = internal_rx.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize event: {:?}", e);
                continue;
            }
        };

        if let Err(e) = websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await {
            warn!("Failed to send event, closing write task: {:?}", e);
            break;
        }
    }

    info!("Write task terminated");
}

#[instrument(skip(websocket_rx, internal_tx, state), fields(user_id))]
pub async fn listen_ws<S: MessageStore, D: UserDirectory>(
    user_id: i32,
    conn_id: ConnectionId,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<WsEvent>,
    state: Arc<AppState<S, D>>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        if let Ok(command) = serde_json::from_str::<WsCommand>(&text) {
                            // I comandi di una stessa connessione vengono
                            // processati qui in ordine di arrivo
                            process_command(&state, user_id, &internal_tx, command).await;
                        } else {
                            warn!("Failed to deserialize command");
                        }
                    }
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = TIMEOUT_DURATION_SECONDS,
                    "Connection timeout"
                );
                break;
            }
        }
    }

    // Cleanup: sgancia la connessione; l'eventuale scrittura in corso verso
    // lo store non viene interrotta, si abbandona solo la consegna locale
    info!("Cleaning up connection");
    if let Some((owner_id, was_last)) = state.presence.unregister(conn_id) {
        if was_last {
            utils::broadcast_user_offline(&state, owner_id);
        }
    }
    info!("Listen task terminated");
}
