//! WebSocket connection and event loop.
//!
//! The connection spawns one task that owns the socket. It correlates
//! responses to requests by id and routes events to handlers registered
//! per event method.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, TabId};
use crate::protocol::{Event, EventReply, Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

type HandlerMap = FxHashMap<&'static str, EventHandler>;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

type ResponseRx = oneshot::Receiver<Result<Response>>;

/// Event handler callback.
///
/// Return `Some(EventReply)` to answer an intercepted event.
pub type EventHandler = Box<dyn Fn(Event) -> Option<EventReply> + Send + Sync>;

// ============================================================================
// ReadyData
// ============================================================================

/// Payload of the extension's READY handshake.
#[derive(Debug, Clone, Copy)]
pub struct ReadyData {
    /// Tab the extension opened the init page in.
    pub tab_id: TabId,
}

// ============================================================================
// ConnectionCommand
// ============================================================================

enum ConnectionCommand {
    Send {
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
    },
    RemoveCorrelation(RequestId),
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to the WebSocket event loop. Cheap to clone.
#[derive(Clone)]
pub struct Connection {
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    correlation: Arc<Mutex<CorrelationMap>>,
    handlers: Arc<Mutex<HandlerMap>>,
    ready_rx: Arc<Mutex<Option<ResponseRx>>>,
}

impl Connection {
    /// Wraps an upgraded stream and spawns the event loop.
    pub(crate) fn new(ws_stream: WebSocketStream<TcpStream>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let mut correlation = CorrelationMap::default();
        let handlers = Arc::new(Mutex::new(HandlerMap::default()));

        // Registered before the loop starts so an early READY is never dropped.
        let (ready_tx, ready_rx) = oneshot::channel();
        correlation.insert(RequestId::ready(), ready_tx);
        let correlation = Arc::new(Mutex::new(correlation));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
            Arc::clone(&handlers),
        ));

        Self {
            command_tx,
            correlation,
            handlers,
            ready_rx: Arc::new(Mutex::new(Some(ready_rx))),
        }
    }

    /// Waits for the READY message (nil request id).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if READY does not arrive within `wait`
    /// - [`Error::ConnectionClosed`] if the socket closes first
    /// - [`Error::Protocol`] if called twice
    pub async fn wait_ready(&self, wait: Duration) -> Result<ReadyData> {
        let rx = self
            .ready_rx
            .lock()
            .take()
            .ok_or_else(|| Error::protocol("READY already consumed"))?;

        let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        let response = timeout(wait, rx)
            .await
            .map_err(|_| Error::connection_timeout(wait_ms))???;

        let tab_id = response
            .result_u64("tabId")
            .and_then(|raw| u32::try_from(raw).ok())
            .and_then(TabId::new)
            .unwrap_or(TabId::INITIAL);

        debug!(%tab_id, "READY handshake completed");

        Ok(ReadyData { tab_id })
    }

    /// Registers the handler for one event method, replacing any previous one.
    pub fn set_event_handler(&self, method: &'static str, handler: EventHandler) {
        self.handlers.lock().insert(method, handler);
    }

    /// Removes the handler for one event method.
    pub fn clear_event_handler(&self, method: &'static str) {
        self.handlers.lock().remove(method);
    }

    /// Sends a request with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`send_with_timeout`](Self::send_with_timeout).
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_timeout(request, DEFAULT_COMMAND_TIMEOUT).await
    }

    /// Sends a request and waits for the correlated response.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the event loop has stopped
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send_with_timeout(&self, request: Request, wait: Duration) -> Result<Response> {
        let request_id = request.id;

        let pending = self.correlation.lock().len();
        if pending >= MAX_PENDING_REQUESTS {
            warn!(pending, max = MAX_PENDING_REQUESTS, "Too many pending requests");
            return Err(Error::protocol(format!(
                "Too many pending requests: {pending}/{MAX_PENDING_REQUESTS}"
            )));
        }

        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(wait, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(request_id));
                Err(Error::request_timeout(
                    request_id,
                    u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                ))
            }
        }
    }

    /// Closes the socket and fails every pending request.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    async fn run_event_loop(
        ws_stream: WebSocketStream<TcpStream>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        handlers: Arc<Mutex<HandlerMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            let reply = Self::handle_incoming(&text, &correlation, &handlers);

                            if let Some(reply) = reply
                                && let Ok(json) = to_string(&reply)
                                && let Err(e) = ws_write.send(Message::Text(json.into())).await
                            {
                                warn!(error = %e, "Failed to send event reply");
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }
                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, response_tx }) => {
                            Self::handle_send(request, response_tx, &mut ws_write, &correlation)
                                .await;
                        }
                        Some(ConnectionCommand::RemoveCorrelation(request_id)) => {
                            correlation.lock().remove(&request_id);
                            debug!(%request_id, "Removed timed-out correlation");
                        }
                        Some(ConnectionCommand::Shutdown) | None => {
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        let pending: Vec<_> = correlation.lock().drain().collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Failing pending requests on shutdown");
        }
        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        debug!("Event loop terminated");
    }

    fn handle_incoming(
        text: &str,
        correlation: &Mutex<CorrelationMap>,
        handlers: &Mutex<HandlerMap>,
    ) -> Option<EventReply> {
        if let Ok(response) = from_str::<Response>(text) {
            match correlation.lock().remove(&response.id) {
                Some(tx) => {
                    let _ = tx.send(Ok(response));
                }
                None => warn!(id = %response.id, "Response for unknown request"),
            }
            return None;
        }

        if let Ok(event) = from_str::<Event>(text) {
            let handlers = handlers.lock();
            return match handlers.get(event.method.as_str()) {
                Some(handler) => handler(event),
                None => {
                    trace!(method = %event.method, "Unhandled event");
                    None
                }
            };
        }

        warn!(text = %text, "Failed to parse incoming message");
        None
    }

    async fn handle_send(
        request: Request,
        response_tx: oneshot::Sender<Result<Response>>,
        ws_write: &mut WsSink,
        correlation: &Mutex<CorrelationMap>,
    ) {
        let request_id = request.id;

        let json = match to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                let _ = response_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        correlation.lock().insert(request_id, response_tx);

        if let Err(e) = ws_write.send(Message::Text(json.into())).await
            && let Some(tx) = correlation.lock().remove(&request_id)
        {
            let _ = tx.send(Err(Error::connection(e.to_string())));
        }

        trace!(%request_id, "Request sent");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};
    use tokio_tungstenite::connect_async;

    use crate::identifiers::FrameId;
    use crate::protocol::{BrowsingContextCommand, Command};
    use crate::transport::PendingServer;

    const READY: &str = concat!(
        r#"{"id":"00000000-0000-0000-0000-000000000000","#,
        r#""type":"success","result":{"tabId":5,"sessionId":1}}"#
    );

    #[tokio::test]
    async fn test_ready_then_request_round_trip() {
        let server = PendingServer::bind_loopback().await.expect("bind");
        let url = server.ws_url();

        let client = tokio::spawn(async move {
            let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
            ws.send(Message::Text(READY.into())).await.expect("ready");

            let Some(Ok(Message::Text(text))) = ws.next().await else {
                panic!("expected request");
            };
            let request: Value = serde_json::from_str(&text).expect("request json");
            assert_eq!(request["method"], "browsingContext.navigate");

            let reply = json!({
                "id": request["id"],
                "type": "success",
                "result": { "url": "https://example.com/event" }
            });
            ws.send(Message::Text(reply.to_string().into()))
                .await
                .expect("reply");
            let _ = ws.next().await;
        });

        let (connection, ready) = server.accept(Duration::from_secs(5)).await.expect("accept");
        assert_eq!(ready.tab_id.as_u32(), 5);

        let request = Request::new(
            ready.tab_id,
            FrameId::main(),
            Command::BrowsingContext(BrowsingContextCommand::Navigate {
                url: "https://example.com/event".to_string(),
            }),
        );
        let response = connection.send(request).await.expect("response");
        assert_eq!(response.result_str("url"), Some("https://example.com/event"));

        connection.shutdown();
        client.await.expect("client task");
    }

    #[tokio::test]
    async fn test_event_routed_to_method_handler_and_replied() {
        let server = PendingServer::bind_loopback().await.expect("bind");
        let url = server.ws_url();

        let client = tokio::spawn(async move {
            let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
            ws.send(Message::Text(READY.into())).await.expect("ready");

            // Give the local end time to register its handler.
            tokio::time::sleep(Duration::from_millis(100)).await;
            let event = json!({
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "type": "event",
                "method": "network.responseHeaders",
                "params": { "url": "https://example.com", "status": 200, "frameId": 0 }
            });
            ws.send(Message::Text(event.to_string().into()))
                .await
                .expect("event");

            let Some(Ok(Message::Text(text))) = ws.next().await else {
                panic!("expected reply");
            };
            let reply: Value = serde_json::from_str(&text).expect("reply json");
            assert_eq!(reply["replyTo"], "network.responseHeaders");
            assert_eq!(reply["result"]["action"], "allow");
        });

        let (connection, _) = server.accept(Duration::from_secs(5)).await.expect("accept");
        connection.set_event_handler(
            "network.responseHeaders",
            Box::new(|event: Event| Some(EventReply::allow(event.id, "network.responseHeaders"))),
        );

        client.await.expect("client task");
        connection.shutdown();
    }

    #[tokio::test]
    async fn test_pending_request_fails_when_remote_closes() {
        let server = PendingServer::bind_loopback().await.expect("bind");
        let url = server.ws_url();

        let client = tokio::spawn(async move {
            let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
            ws.send(Message::Text(READY.into())).await.expect("ready");
            let _ = ws.next().await;
            let _ = ws.close(None).await;
        });

        let (connection, ready) = server.accept(Duration::from_secs(5)).await.expect("accept");
        let request = Request::new(
            ready.tab_id,
            FrameId::main(),
            Command::BrowsingContext(BrowsingContextCommand::Navigate {
                url: "https://example.com/event".to_string(),
            }),
        );
        let err = connection
            .send_with_timeout(request, Duration::from_secs(5))
            .await
            .expect_err("remote closed");
        assert!(err.is_connection_error());

        client.await.expect("client task");
    }
}
