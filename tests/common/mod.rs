//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use realm_server::config::RealmConfig;
use realm_server::session::ChatMessage;
use realm_server::{RealmServer, Terminate};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub const API_KEY: &str = "test-key";
pub const WELCOME: &str = "Welcome";

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reports termination on a channel instead of exiting.
struct ChannelTerminator(mpsc::UnboundedSender<()>);

impl Terminate for ChannelTerminator {
    fn terminate(&self) {
        let _ = self.0.send(());
    }
}

/// Short timings so a full shutdown completes in a couple of seconds.
pub fn test_config() -> RealmConfig {
    let mut config = RealmConfig::default();
    config.realm.name = "Test Realm".into();
    config.realm.motd = WELCOME.into();
    config.admin.api_key = API_KEY.into();
    config.shutdown.initial_tick_secs = 1;
    config.shutdown.grace_secs = 1;
    config
}

pub struct TestRealm {
    pub addr: SocketAddr,
    pub terminated: mpsc::UnboundedReceiver<()>,
    http: reqwest::Client,
}

/// Start a realm on an ephemeral port.
pub async fn start_realm(config: RealmConfig) -> TestRealm {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, terminated) = mpsc::unbounded_channel();
    let server = RealmServer::with_terminator(config, Arc::new(ChannelTerminator(tx)));
    tokio::spawn(server.run(listener, std::future::pending()));

    TestRealm {
        addr,
        terminated,
        http: reqwest::Client::new(),
    }
}

impl TestRealm {
    pub async fn connect(&self) -> Result<Client, tokio_tungstenite::tungstenite::Error> {
        connect_async(format!("ws://{}/ws", self.addr))
            .await
            .map(|(ws, _)| ws)
    }

    pub async fn admin_get(&self, path: &str) -> (u16, Value) {
        let res = self
            .http
            .get(format!("http://{}{}", self.addr, path))
            .bearer_auth(API_KEY)
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }

    pub async fn admin_post(&self, path: &str, body: Value) -> (u16, Value) {
        let res = self
            .http
            .post(format!("http://{}{}", self.addr, path))
            .bearer_auth(API_KEY)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status().as_u16();
        (status, res.json().await.unwrap())
    }
}

/// A frame the client cares about.
#[derive(Debug)]
pub enum Received {
    Chat(ChatMessage),
    Closed(Option<CloseFrame>),
}

/// Next chat message or close, skipping control frames.
pub async fn next_received(ws: &mut Client) -> Received {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame");

        match frame {
            Some(Ok(Message::Text(text))) => {
                return Received::Chat(serde_json::from_str(text.as_str()).unwrap());
            }
            Some(Ok(Message::Close(frame))) => return Received::Closed(frame),
            Some(Ok(_)) => continue,
            Some(Err(_)) | None => return Received::Closed(None),
        }
    }
}

pub async fn next_chat(ws: &mut Client) -> ChatMessage {
    match next_received(ws).await {
        Received::Chat(message) => message,
        Received::Closed(frame) => panic!("expected a chat message, got close {frame:?}"),
    }
}
