//! Trigger device socket supervisor.
//!
//! Owns the WebSocket to the physical start trigger. Every inbound frame is
//! parsed and fanned out to all subscribers; link state changes are fanned
//! out the same way. On closure or a failed connect the supervisor waits the
//! configured delay and tries again until shut down.

use futures_util::StreamExt;
use heatsync_core::{Environment, LinkState, TriggerConfig, TriggerEvent, TriggerLink};
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};
use tracing::{debug, info, warn};

/// Subscriber queue depth. Slow subscribers lose the oldest events.
const EVENT_CAPACITY: usize = 64;

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Reconnecting trigger socket, not yet running.
pub struct TriggerSupervisor<E: Environment> {
    config: TriggerConfig,
    env: E,
    events: broadcast::Sender<TriggerEvent>,
}

impl<E: Environment> TriggerSupervisor<E> {
    /// Supervisor for the device at `config.url`.
    pub fn new(config: TriggerConfig, env: E) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { config, env, events }
    }

    /// Subscribe before spawning to observe the first connect.
    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.events.subscribe()
    }

    /// Start the connect loop on the current runtime.
    pub fn spawn(self) -> TriggerHandle {
        let events = self.events.clone();
        let task = tokio::spawn(self.run());
        TriggerHandle { events, task }
    }

    async fn run(self) {
        let mut link = TriggerLink::new(self.config.reconnect_delay);
        loop {
            link.begin_connect();
            self.publish(TriggerEvent::Link(LinkState::Connecting));
            debug!(url = %self.config.url, attempt = link.attempts(), "connecting to trigger");

            match connect_async(self.config.url.as_str()).await {
                Ok((socket, _)) => {
                    link.connected();
                    info!(url = %self.config.url, "trigger connected");
                    self.publish(TriggerEvent::Link(LinkState::Connected));
                    self.pump(socket, &link).await;
                    link.closed(self.env.now());
                    info!("trigger disconnected");
                },
                Err(e) => {
                    link.connect_failed(self.env.now());
                    warn!(url = %self.config.url, error = %e, "trigger connect failed");
                },
            }
            self.publish(TriggerEvent::Link(LinkState::Disconnected));

            while let Some(at) = link.retry_at() {
                let now = self.env.now();
                if link.take_due(now) {
                    break;
                }
                self.env.sleep(at.saturating_duration_since(now)).await;
            }
        }
    }

    async fn pump(&self, mut socket: Socket, link: &TriggerLink) {
        while let Some(frame) = socket.next().await {
            let msg = match frame {
                Ok(Message::Text(text)) => link.handle_text(&text),
                Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                    Ok(text) => link.handle_text(text),
                    Err(_) => {
                        warn!(len = data.len(), "dropping non-utf8 trigger frame");
                        None
                    },
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "trigger socket error");
                    break;
                },
            };
            if let Some(msg) = msg {
                self.publish(TriggerEvent::Command(msg));
            }
        }
    }

    fn publish(&self, event: TriggerEvent) {
        // Fails only when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

/// Running supervisor. Dropping the handle does not stop it; call
/// [`TriggerHandle::shutdown`].
#[derive(Debug)]
pub struct TriggerHandle {
    events: broadcast::Sender<TriggerEvent>,
    task: JoinHandle<()>,
}

impl TriggerHandle {
    /// New subscriber. Sees events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.events.subscribe()
    }

    /// Stop reconnecting and close the socket.
    pub fn shutdown(self) {
        self.task.abort();
    }
}
