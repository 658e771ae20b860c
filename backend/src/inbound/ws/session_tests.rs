//! WebSocket session handler tests.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::ServerHandle, http::header};
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::{NotificationDraft, NotificationKind, Role, User, UserId};
use crate::inbound::http::test_utils::TestBackend;
use crate::inbound::ws;
use crate::inbound::ws::hub::ConnectionHub;
use crate::inbound::ws::origin::OriginAllowList;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

const ORIGIN: &str = "http://localhost:3000";

struct Harness {
    url: String,
    backend: TestBackend,
    hub: Arc<ConnectionHub>,
    _server: ServerHandle,
}

impl Harness {
    async fn connect(&self, token: &str) -> Result<Socket, awc::error::WsClientError> {
        awc::Client::default()
            .ws(format!("{}/ws?token={token}", self.url))
            .set_header(header::ORIGIN, ORIGIN)
            .connect()
            .await
            .map(|(_, socket)| socket)
    }

    async fn citizen(&self) -> (User, String) {
        self.backend.seed_user(Role::User, "sita@example.com").await
    }

    async fn notify(&self, recipient: &UserId) {
        self.backend
            .state
            .notifications
            .create_notification(NotificationDraft {
                recipient: recipient.clone(),
                kind: NotificationKind::NewUpvote,
                message: "Someone upvoted your report.".to_owned(),
                actor: Some(UserId::random()),
                target: None,
            })
            .await
            .expect("notification created");
    }
}

#[fixture]
async fn harness() -> Harness {
    let hub = Arc::new(ConnectionHub::new());
    let backend = TestBackend::with_push(hub.clone());
    let ws_state = WsState::new(
        backend.state.accounts_query.clone(),
        backend.state.notifications.clone(),
        backend.state.notifications_query.clone(),
        hub.clone(),
        OriginAllowList::parse([ORIGIN]).expect("valid origin"),
    );

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .workers(1)
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    Harness {
        url: format!("http://{addr}"),
        backend,
        hub,
        _server: handle,
    }
}

/// Next JSON event, answering pings so the session stays alive.
async fn next_event(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json"),
            Frame::Ping(payload) => {
                socket
                    .send(Message::Pong(payload))
                    .await
                    .expect("send pong");
            }
            Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("send text");
}

#[rstest]
#[actix_rt::test]
async fn greets_with_the_current_unread_count(#[future] harness: Harness) {
    let harness = harness.await;
    let (user, token) = harness.citizen().await;
    harness.notify(user.id()).await;

    let mut socket = harness.connect(&token).await.expect("connect");
    let greeting = next_event(&mut socket).await;

    assert_eq!(greeting["event"], "unread_count");
    assert_eq!(greeting["data"]["count"], 1);
}

#[rstest]
#[actix_rt::test]
async fn live_notifications_are_followed_by_the_count(#[future] harness: Harness) {
    let harness = harness.await;
    let (user, token) = harness.citizen().await;
    let mut socket = harness.connect(&token).await.expect("connect");
    assert_eq!(next_event(&mut socket).await["data"]["count"], 0);

    harness.notify(user.id()).await;

    let pushed = next_event(&mut socket).await;
    assert_eq!(pushed["event"], "new_notification");
    assert_eq!(pushed["data"]["kind"], "NEW_UPVOTE");
    assert_eq!(pushed["data"]["isRead"], false);
    let count = next_event(&mut socket).await;
    assert_eq!(count["event"], "unread_count");
    assert_eq!(count["data"]["count"], 1);
}

#[rstest]
#[actix_rt::test]
async fn every_socket_of_the_user_sees_mark_all_read(#[future] harness: Harness) {
    let harness = harness.await;
    let (user, token) = harness.citizen().await;
    harness.notify(user.id()).await;
    harness.notify(user.id()).await;
    let mut phone = harness.connect(&token).await.expect("connect phone");
    let mut laptop = harness.connect(&token).await.expect("connect laptop");
    assert_eq!(next_event(&mut phone).await["data"]["count"], 2);
    assert_eq!(next_event(&mut laptop).await["data"]["count"], 2);

    send_json(&mut phone, serde_json::json!({"event": "mark_all_read"})).await;

    for socket in [&mut phone, &mut laptop] {
        let update = next_event(socket).await;
        assert_eq!(update["event"], "unread_count");
        assert_eq!(update["data"]["count"], 0);
    }
}

#[rstest]
#[actix_rt::test]
async fn mark_notification_read_over_the_socket(#[future] harness: Harness) {
    let harness = harness.await;
    let (user, token) = harness.citizen().await;
    let mut socket = harness.connect(&token).await.expect("connect");
    next_event(&mut socket).await;
    harness.notify(user.id()).await;
    let pushed = next_event(&mut socket).await;
    next_event(&mut socket).await;

    send_json(
        &mut socket,
        serde_json::json!({
            "event": "mark_notification_read",
            "data": {"notificationId": pushed["data"]["id"]}
        }),
    )
    .await;

    let update = next_event(&mut socket).await;
    assert_eq!(update["event"], "unread_count");
    assert_eq!(update["data"]["count"], 0);
}

#[rstest]
#[actix_rt::test]
async fn malformed_frames_get_an_error_event(#[future] harness: Harness) {
    let harness = harness.await;
    let (_, token) = harness.citizen().await;
    let mut socket = harness.connect(&token).await.expect("connect");
    next_event(&mut socket).await;

    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let reply = next_event(&mut socket).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], "invalid_request");
}

#[rstest]
#[case("garbage")]
#[case("")]
#[actix_rt::test]
async fn rejects_invalid_tokens(#[future] harness: Harness, #[case] token: &str) {
    let harness = harness.await;
    assert!(harness.connect(token).await.is_err());
}

#[rstest]
#[actix_rt::test]
async fn rejects_disallowed_origins(#[future] harness: Harness) {
    let harness = harness.await;
    let (_, token) = harness.citizen().await;
    let result = awc::Client::default()
        .ws(format!("{}/ws?token={token}", harness.url))
        .set_header(header::ORIGIN, "https://evil.example")
        .connect()
        .await;
    assert!(result.is_err());
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_and_leaves_the_room(#[future] harness: Harness) {
    let harness = harness.await;
    let (user, token) = harness.citizen().await;
    let mut socket = harness.connect(&token).await.expect("connect");
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) | Frame::Text(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(observed_close.description.as_deref(), Some("heartbeat timeout"));

    tokio::time::timeout(Duration::from_secs(1), async {
        while harness.hub.connection_count(user.id()) > 0 {
            tokio::time::sleep(HEARTBEAT_INTERVAL).await;
        }
    })
    .await
    .expect("connection left the room");
}
