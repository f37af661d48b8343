use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::{Message, ProtocolError};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::TokenVerifier;
use crate::notify::protocol::{ClientMessage, ServerEvent};
use crate::notify::registry::{ConnectionId, ConnectionRegistry};

/// Query params for the WebSocket handshake endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/notifications/ws?token=<jwt>
///
/// Upgrades the HTTP connection to a WebSocket and registers it as the user's
/// notification channel. The token comes in the query string because browsers
/// can't send an Authorization header during the handshake.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    verifier: web::Data<TokenVerifier>,
    registry: web::Data<Arc<ConnectionRegistry>>,
) -> Result<HttpResponse, actix_web::Error> {
    let claims = verifier
        .verify(&query.token)
        .await
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

    let user_id = claims
        .user_id()
        .map_err(actix_web::error::ErrorUnauthorized)?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    let (connection_id, rx) = registry.register(user_id).await;
    tracing::info!(%user_id, %connection_id, "notification channel registered");

    actix_web::rt::spawn(handle_ws_session(
        session,
        msg_stream,
        rx,
        user_id,
        connection_id,
        registry.get_ref().clone(),
    ));

    Ok(response)
}

/// Drives one notification session: forwards registry events to the socket,
/// answers pings, and unregisters on disconnect.
async fn handle_ws_session(
    mut session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
    user_id: Uuid,
    connection_id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
) {
    if send_event(&mut session, &ServerEvent::Registered { user_id })
        .await
        .is_err()
    {
        registry.unregister(user_id, connection_id).await;
        return;
    }

    loop {
        tokio::select! {
            frame = msg_stream.next() => {
                match client_action(frame) {
                    ClientAction::Reply(reply) => {
                        if send_event(&mut session, &reply).await.is_err() {
                            break;
                        }
                    }
                    ClientAction::Pong(bytes) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    ClientAction::Ignore => {}
                    ClientAction::Close => break,
                }
            }
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if send_event(&mut session, &event).await.is_err() {
                            break;
                        }
                    }
                    // Replaced by a newer connection for the same user.
                    None => break,
                }
            }
        }
    }

    if registry.unregister(user_id, connection_id).await {
        tracing::info!(%user_id, %connection_id, "notification channel unregistered");
    }
    let _ = session.close(None).await;
}

/// What the session does with one item from the client stream.
#[derive(Debug)]
enum ClientAction {
    Reply(ServerEvent),
    Pong(Bytes),
    Ignore,
    Close,
}

/// `None` means the peer went away without a close frame.
fn client_action(frame: Option<Result<Message, ProtocolError>>) -> ClientAction {
    match frame {
        Some(Ok(Message::Text(text))) => {
            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => ServerEvent::Pong,
                Err(e) => ServerEvent::Error {
                    message: format!("Invalid message format: {e}"),
                },
            };
            ClientAction::Reply(reply)
        }
        Some(Ok(Message::Ping(bytes))) => ClientAction::Pong(bytes),
        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => ClientAction::Close,
        Some(Ok(_)) => ClientAction::Ignore,
    }
}

async fn send_event(
    session: &mut actix_ws::Session,
    event: &ServerEvent,
) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(json) => session.text(json).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize server event");
            Ok(())
        }
    }
}
