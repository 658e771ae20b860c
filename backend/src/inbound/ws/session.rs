//! Per-connection WebSocket handler.
//!
//! One task per socket multiplexes three sources: heartbeat ticks, client
//! frames, and frames pushed through the user's room in the connection hub.
//! The public contract pings every 5s and considers a connection idle after
//! 10s without client traffic. Tests shorten these intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::{Actor, NotificationId, TraceId};
use crate::inbound::ws::hub::ConnectionId;
use crate::inbound::ws::messages::{ClientEvent, ErrorPayload, ServerEvent};
use crate::inbound::ws::state::WsState;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    state: WsState,
    actor: Actor,
    session: Session,
    stream: MessageStream,
) {
    let (connection, pushes) = state.hub.register(&actor.id);
    let ws = WsSession {
        state,
        actor,
        connection,
    };
    ws.run(session, stream, pushes).await;
    ws.state.hub.unregister(&ws.actor.id, ws.connection);
    info!(user_id = %ws.actor.id, connection = %ws.connection, "notification socket closed");
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    RoomClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    state: WsState,
    actor: Actor,
    connection: ConnectionId,
}

impl WsSession {
    async fn run(
        &self,
        mut session: Session,
        mut stream: MessageStream,
        mut pushes: UnboundedReceiver<String>,
    ) {
        if let Err(error) = self.send_initial_unread_count(&mut session).await {
            self.log_shutdown_reason(&error);
            return;
        }

        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                frame = pushes.recv() => {
                    self.forward_push(&mut session, frame).await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn send_initial_unread_count(&self, session: &mut Session) -> Result<(), SessionError> {
        match self
            .state
            .notifications_query
            .unread_count(&self.actor.id)
            .await
        {
            Ok(count) => self
                .send_event(session, &ServerEvent::unread_count(count))
                .await
                .map_err(SessionError::Network),
            Err(error) => {
                warn!(%error, user_id = %self.actor.id, "initial unread count unavailable");
                Ok(())
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn forward_push(
        &self,
        session: &mut Session,
        frame: Option<String>,
    ) -> Result<(), SessionError> {
        let Some(frame) = frame else {
            return Err(SessionError::RoomClosed);
        };
        session.text(frame).await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                let reply = ServerEvent::Error(ErrorPayload::invalid_frame(
                    "Unrecognised event frame.",
                ));
                return self
                    .send_event(session, &reply)
                    .await
                    .map_err(SessionError::Network);
            }
        };

        // The fresh unread count reaches this socket through the hub.
        let name = event.name();
        let outcome = TraceId::scope(TraceId::generate(), self.dispatch(event)).await;
        match outcome {
            Ok(()) => Ok(()),
            Err(error) => {
                let reply = ServerEvent::Error(ErrorPayload::from_domain(name, &error));
                self.send_event(session, &reply)
                    .await
                    .map_err(SessionError::Network)
            }
        }
    }

    async fn dispatch(&self, event: ClientEvent) -> Result<(), crate::domain::Error> {
        let user = &self.actor.id;
        match event {
            ClientEvent::MarkNotificationRead { notification_id } => {
                let id = NotificationId::from_uuid(notification_id);
                let unread = self.state.notifications.mark_read(user, id).await?;
                debug!(user_id = %user, notification_id = %id, unread, "marked read over socket");
            }
            ClientEvent::MarkAllRead => {
                let outcome = self.state.notifications.mark_all_read(user).await?;
                debug!(
                    user_id = %user,
                    updated = outcome.updated,
                    "marked all read over socket"
                );
            }
        }
        Ok(())
    }

    async fn send_event(&self, session: &mut Session, event: &ServerEvent) -> Result<(), Closed> {
        match event.to_text() {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::RoomClosed => {
                warn!(connection = %self.connection, "connection dropped from hub");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::RoomClosed => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
