//! Socket.IO client for live notifications.
//!
//! Speaks just enough Engine.IO v4 over a websocket to join the default
//! namespace, identify the user and receive events.

use crate::api::models::{Complaint, Notification};
use crate::error::Result;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub event_type: String,
    pub data: Value,
}

/// Events the app reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Notification(Notification),
    ComplaintUpdated(Complaint),
}

impl IncomingEvent {
    pub fn into_app_event(self) -> Option<AppEvent> {
        let parsed = match self.event_type.as_str() {
            "notification" => serde_json::from_value(self.data).map(AppEvent::Notification),
            "complaint:updated" => serde_json::from_value(self.data).map(AppEvent::ComplaintUpdated),
            other => {
                log::debug!("Ignoring socket event {other}");
                return None;
            }
        };
        parsed.map_err(|e| log::warn!("Bad {} payload: {e}", self.event_type)).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Value),
    Close,
    Ping,
    Pong,
    Connected,
    Disconnected,
    ConnectError(String),
    Event(IncomingEvent),
    Noop,
}

/// Decodes one websocket text frame. Only the default namespace is understood.
pub fn decode(text: &str) -> Option<Packet> {
    let mut chars = text.chars();
    let engine = chars.next()?;
    let rest = chars.as_str();
    match engine {
        '0' => Some(Packet::Open(serde_json::from_str(rest).unwrap_or(Value::Null))),
        '1' => Some(Packet::Close),
        '2' => Some(Packet::Ping),
        '3' => Some(Packet::Pong),
        '6' => Some(Packet::Noop),
        '4' => decode_socket(rest),
        _ => None,
    }
}

fn decode_socket(text: &str) -> Option<Packet> {
    let mut chars = text.chars();
    let kind = chars.next()?;
    let rest = chars.as_str();
    if rest.starts_with('/') {
        return None;
    }
    match kind {
        '0' => Some(Packet::Connected),
        '1' => Some(Packet::Disconnected),
        '4' => Some(Packet::ConnectError(rest.to_string())),
        '2' => {
            // An ack id may sit between the type and the payload.
            let payload = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            let mut items = match serde_json::from_str::<Value>(payload).ok()? {
                Value::Array(items) => items.into_iter(),
                _ => return None,
            };
            let event_type = items.next()?.as_str()?.to_string();
            let data = items.next().unwrap_or(Value::Null);
            Some(Packet::Event(IncomingEvent { event_type, data }))
        }
        _ => None,
    }
}

pub fn encode_event(name: &str, payload: &Value) -> String {
    format!("42{}", serde_json::json!([name, payload]))
}

pub fn socket_endpoint(socket_url: &str) -> Result<Url> {
    let trimmed = socket_url.trim().trim_end_matches('/');
    let swapped = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        trimmed.to_string()
    };
    let mut url = Url::parse(&format!("{}/socket.io/", swapped))?;
    url.query_pairs_mut().append_pair("EIO", "4").append_pair("transport", "websocket");
    Ok(url)
}

enum SessionEnd {
    Shutdown,
    Closed,
}

/// Keeps the socket task alive; dropping it disconnects.
pub struct SocketHandle {
    shutdown: Option<oneshot::Sender<()>>,
}

impl SocketHandle {
    pub fn close(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn(socket_url: &str, user_id: String, events: mpsc::UnboundedSender<AppEvent>) -> Result<SocketHandle> {
    let url = socket_endpoint(socket_url)?;
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    crate::utils::spawn_async(async move {
        loop {
            match run_session(&url, &user_id, &events, &mut shutdown_rx).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Closed) => log::info!("Socket disconnected"),
                Err(e) => log::warn!("Socket error: {e}"),
            }
            if events.is_closed() {
                break;
            }
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
        log::debug!("Socket task finished");
    });
    Ok(SocketHandle { shutdown: Some(shutdown_tx) })
}

async fn run_session(
    url: &Url,
    user_id: &str,
    events: &mpsc::UnboundedSender<AppEvent>,
    shutdown: &mut oneshot::Receiver<()>,
) -> Result<SessionEnd> {
    let (ws, _) = connect_async(url.as_str()).await?;
    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            _ = &mut *shutdown => {
                let _ = write.send(Message::Text("41".into())).await;
                let _ = write.close().await;
                return Ok(SessionEnd::Shutdown);
            }
            msg = read.next() => {
                let Some(msg) = msg else { return Ok(SessionEnd::Closed) };
                match msg? {
                    Message::Text(text) => match decode(&text) {
                        Some(Packet::Open(_)) => write.send(Message::Text("40".into())).await?,
                        Some(Packet::Connected) => {
                            log::info!("Socket connected");
                            let identify = encode_event("identify", &Value::String(user_id.to_string()));
                            write.send(Message::Text(identify)).await?;
                        }
                        Some(Packet::Ping) => write.send(Message::Text("3".into())).await?,
                        Some(Packet::Event(event)) => {
                            if let Some(app_event) = event.into_app_event() {
                                if events.send(app_event).is_err() {
                                    return Ok(SessionEnd::Shutdown);
                                }
                            }
                        }
                        Some(Packet::ConnectError(reason)) => {
                            log::warn!("Socket namespace refused: {reason}");
                            return Ok(SessionEnd::Closed);
                        }
                        Some(Packet::Disconnected) | Some(Packet::Close) => return Ok(SessionEnd::Closed),
                        _ => {}
                    },
                    Message::Close(_) => return Ok(SessionEnd::Closed),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::NotificationKind;
    use tokio::net::TcpListener;

    #[test]
    fn decodes_engine_packets() {
        assert_eq!(decode("2"), Some(Packet::Ping));
        assert_eq!(decode("40"), Some(Packet::Connected));
        assert!(matches!(decode(r#"0{"sid":"abc","pingInterval":25000}"#), Some(Packet::Open(v)) if v["sid"] == "abc"));
        assert_eq!(decode("40/admin,"), None);
        assert_eq!(decode(""), None);
    }

    #[test]
    fn decodes_event_with_ack_id() {
        let packet = decode(r#"4212["notification",{"a":1}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event(IncomingEvent { event_type: "notification".into(), data: serde_json::json!({ "a": 1 }) })
        );
    }

    #[test]
    fn encodes_identify() {
        assert_eq!(encode_event("identify", &Value::String("u1".into())), r#"42["identify","u1"]"#);
    }

    #[test]
    fn endpoint_switches_scheme() {
        let url = socket_endpoint("https://push.example.com/").unwrap();
        assert_eq!(url.as_str(), "wss://push.example.com/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn unknown_events_are_dropped() {
        let ev = IncomingEvent { event_type: "typing".into(), data: Value::Null };
        assert_eq!(ev.into_app_event(), None);
    }

    #[tokio::test]
    async fn handshake_identify_and_notification() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(r#"0{"sid":"s1","pingInterval":25000,"pingTimeout":20000}"#.into())).await.unwrap();
            let connect = ws.next().await.unwrap().unwrap();
            assert_eq!(connect, Message::Text("40".into()));
            ws.send(Message::Text(r#"40{"sid":"x"}"#.into())).await.unwrap();
            let identify = ws.next().await.unwrap().unwrap();
            assert_eq!(identify, Message::Text(r#"42["identify","user-7"]"#.into()));
            ws.send(Message::Text("2".into())).await.unwrap();
            assert_eq!(ws.next().await.unwrap().unwrap(), Message::Text("3".into()));
            let note = serde_json::json!({
                "_id": "n1", "title": "Updated", "message": "Your complaint moved",
                "type": "update", "createdAt": "2024-03-01T08:00:00Z"
            });
            ws.send(Message::Text(encode_event("notification", &note))).await.unwrap();
            // wait for the client's disconnect packet
            while let Some(Ok(msg)) = ws.next().await {
                if msg == Message::Text("41".into()) {
                    break;
                }
            }
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn(&format!("http://{}", addr), "user-7".into(), tx).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        match event {
            AppEvent::Notification(n) => {
                assert_eq!(n.id, "n1");
                assert_eq!(n.kind, NotificationKind::Update);
                assert!(!n.read);
            }
            other => panic!("unexpected event {other:?}"),
        }

        handle.close();
        tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    }
}
