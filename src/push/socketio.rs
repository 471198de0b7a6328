//! Minimal Socket.IO v5 client over the Engine.IO v4 websocket transport.
//!
//! Only what the dashboard needs: join the default namespace, answer
//! heartbeats and decode server-emitted events. No acks, no binary
//! packets, no long-polling upgrade.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::PushEvent;
use crate::event::AppEvent;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const PONG: &str = "3";
const JOIN_DEFAULT_NAMESPACE: &str = "40";

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
/// Bounds the TCP/TLS/websocket connect and the wait for the handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(12);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);
// Engine.IO v4 server defaults
const DEFAULT_PING_INTERVAL_MS: u64 = 25_000;
const DEFAULT_PING_TIMEOUT_MS: u64 = 20_000;

/// One decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Engine.IO handshake (`0{...}`).
    Open(Option<Value>),
    /// Engine.IO close (`1`).
    Close,
    Ping,
    Pong,
    /// Namespace joined (`40`).
    Connect,
    /// Server left the namespace (`41`).
    Disconnect,
    /// `42["name", payload]`.
    Event { name: String, payload: Option<Value> },
    /// Namespace join refused (`44`).
    ConnectError(String),
    Unknown(String),
}

pub fn decode(text: &str) -> Frame {
    let mut chars = text.chars();
    match chars.next() {
        Some('0') => Frame::Open(serde_json::from_str(chars.as_str()).ok()),
        Some('1') => Frame::Close,
        Some('2') => Frame::Ping,
        Some('3') => Frame::Pong,
        Some('4') => decode_packet(chars.as_str()),
        _ => Frame::Unknown(text.to_string()),
    }
}

fn decode_packet(packet: &str) -> Frame {
    let mut chars = packet.chars();
    let kind = chars.next();
    let body = skip_namespace(chars.as_str());

    match kind {
        Some('0') => Frame::Connect,
        Some('1') => Frame::Disconnect,
        Some('2') => {
            // Optional ack id before the array
            let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
            decode_event(body).unwrap_or_else(|| Frame::Unknown(format!("4{packet}")))
        }
        Some('4') => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| body.to_string());
            Frame::ConnectError(message)
        }
        _ => Frame::Unknown(format!("4{packet}")),
    }
}

fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(i) => &body[i + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn decode_event(body: &str) -> Option<Frame> {
    let items: Vec<Value> = serde_json::from_str(body).ok()?;
    let mut items = items.into_iter();
    let name = items.next()?.as_str()?.to_string();
    Some(Frame::Event {
        name,
        payload: items.next(),
    })
}

/// `ws(s)://host/socket.io/?EIO=4&transport=websocket` for a backend URL.
pub fn socket_url(base_url: &str) -> Result<String> {
    let base = base_url.trim().trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        bail!("Unsupported server URL scheme: {}", base_url);
    };
    Ok(format!("{ws_base}/socket.io/?EIO=4&transport=websocket"))
}

/// How long to wait for the next frame once the handshake is known. The
/// server pings every `pingInterval`; missing one by more than
/// `pingTimeout` means the connection is gone.
pub fn read_deadline(handshake: Option<&Value>) -> Duration {
    let field = |key: &str, default: u64| {
        handshake
            .and_then(|h| h.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(default)
    };
    let interval = field("pingInterval", DEFAULT_PING_INTERVAL_MS);
    let grace = field("pingTimeout", DEFAULT_PING_TIMEOUT_MS);
    Duration::from_millis(interval.saturating_add(grace))
}

pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Keep a subscription open until the receiving side goes away.
pub async fn run(url: String, tx: mpsc::UnboundedSender<AppEvent>) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if let Err(e) = session(&url, &tx, &mut backoff).await {
            tracing::warn!("Push channel error: {:#}", e);
        }
        if tx.is_closed() {
            break;
        }
        tracing::debug!("Reconnecting push channel in {}ms", backoff.as_millis());
        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff);
    }
}

async fn connect(url: &str, limit: Duration) -> Result<Socket> {
    match timeout(limit, connect_async(url)).await {
        Ok(connected) => {
            let (ws, _) = connected.with_context(|| format!("Failed to connect to {url}"))?;
            Ok(ws)
        }
        Err(_) => bail!("Connect to {} timed out after {:?}", url, limit),
    }
}

async fn session(
    url: &str,
    tx: &mpsc::UnboundedSender<AppEvent>,
    backoff: &mut Duration,
) -> Result<()> {
    let mut ws = connect(url, CONNECT_TIMEOUT).await?;
    tracing::debug!("Push transport open: {}", url);

    let emit = |event: PushEvent| {
        let _ = tx.send(AppEvent::Push(event));
    };
    let mut joined = false;
    let mut deadline = CONNECT_TIMEOUT;

    loop {
        let message = match timeout(deadline, ws.next()).await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(_) => {
                tracing::warn!("No push traffic for {:?}, dropping connection", deadline);
                break;
            }
        };
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Push transport failed: {}", e);
                break;
            }
        };

        let reply = match decode(&text) {
            Frame::Open(handshake) => {
                deadline = read_deadline(handshake.as_ref());
                Some(JOIN_DEFAULT_NAMESPACE)
            }
            Frame::Ping => Some(PONG),
            Frame::Connect => {
                joined = true;
                *backoff = INITIAL_BACKOFF;
                emit(PushEvent::Connected);
                None
            }
            Frame::Event { name, payload } => {
                emit(PushEvent::from_event(&name, payload));
                None
            }
            Frame::ConnectError(message) => {
                emit(PushEvent::Error(message));
                break;
            }
            Frame::Disconnect | Frame::Close => break,
            Frame::Pong => None,
            Frame::Unknown(raw) => {
                tracing::debug!("Ignoring push frame: {}", raw);
                None
            }
        };
        if let Some(reply) = reply {
            if let Err(e) = ws.send(Message::Text(reply.into())).await {
                tracing::warn!("Push transport failed: {}", e);
                break;
            }
        }
    }

    let _ = timeout(CLOSE_TIMEOUT, ws.close(None)).await;
    if joined {
        emit(PushEvent::Disconnected);
    }
    Ok(())
}
