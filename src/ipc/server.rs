//! Unix domain socket server for IPC
//!
//! Lets other processes register hotkeys on the daemon's engine and
//! receive a push notification whenever one of them fires.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::{bind_chord, bind_scroll, HotkeyEvent};
use crate::hotkey::Hotkeys;

use super::protocol::{
    read_frame, resolve_keys, write_frame, DaemonStatus, Notification, Outgoing, Request,
    Response,
};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<ServerState>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Shared server state
struct ServerState {
    hotkeys: Arc<Hotkeys>,
    event_tx: broadcast::Sender<HotkeyEvent>,
    start_time: Instant,
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        hotkeys: Arc<Hotkeys>,
        event_tx: broadcast::Sender<HotkeyEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path)
            .context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state: Arc::new(ServerState {
                hotkeys,
                event_tx,
                start_time: Instant::now(),
            }),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection.
    ///
    /// Frames are read on a separate task so that responses and pushed
    /// notifications can be interleaved on the write half.
    async fn handle_client(stream: UnixStream, state: Arc<ServerState>) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();
        let (request_tx, mut request_rx) = mpsc::channel::<Result<Request, String>>(16);

        // aborted on every exit, including when this future is dropped at shutdown
        let _reader_task = AbortOnDrop(tokio::spawn(async move {
            loop {
                let body = match read_frame(&mut reader).await {
                    Ok(Some(body)) => body,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(?e, "failed to read frame, disconnecting");
                        break;
                    }
                };
                let request = serde_json::from_slice::<Request>(&body).map_err(|e| e.to_string());
                if request_tx.send(request).await.is_err() {
                    break;
                }
            }
        }));

        let mut notifications: Option<broadcast::Receiver<HotkeyEvent>> = None;

        loop {
            tokio::select! {
                incoming = request_rx.recv() => match incoming {
                    Some(Ok(request)) => {
                        debug!(?request, "received request");
                        let (response, subscribe) = Self::process_request(request, &state);
                        if subscribe && notifications.is_none() {
                            notifications = Some(state.event_tx.subscribe());
                            debug!("client subscribed to notifications");
                        }
                        if let Err(e) = Self::send(&mut writer, Outgoing::Response(response)).await {
                            break Err(e);
                        }
                    }
                    Some(Err(message)) => {
                        warn!(%message, "failed to parse request");
                        let response = Response::error("bad_request", message);
                        if let Err(e) = Self::send(&mut writer, Outgoing::Response(response)).await {
                            break Err(e);
                        }
                    }
                    None => {
                        debug!("client disconnected");
                        break Ok(());
                    }
                },
                event = next_event(&mut notifications) => match event {
                    Ok(event) => {
                        let note = Outgoing::Notification(Notification::Hotkey { event });
                        if let Err(e) = Self::send(&mut writer, note).await {
                            break Err(e);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "hotkey notifications lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        notifications = None;
                    }
                },
            }
        }
    }

    async fn send(writer: &mut OwnedWriteHalf, msg: Outgoing) -> Result<()> {
        write_frame(writer, &msg).await
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    fn process_request(request: Request, state: &ServerState) -> (Response, bool) {
        let hotkeys = &state.hotkeys;

        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let status = DaemonStatus {
                    running: hotkeys.is_running(),
                    hotkeys: hotkeys.hotkey_count(),
                    scroll_hotkeys: hotkeys.scroll_hotkey_count(),
                    pressed: hotkeys.pressed_keys(),
                    uptime_secs: state.start_time.elapsed().as_secs(),
                    ..DaemonStatus::default()
                };
                (Response::Status(status), false)
            }

            Request::Register { keys } => {
                let keys = match resolve_keys(&keys) {
                    Ok(keys) => keys,
                    Err(e) => return (Response::error("unknown_key", e.to_string()), false),
                };
                if keys.is_empty() {
                    return (
                        Response::error("empty_combination", "hotkey needs at least one key"),
                        false,
                    );
                }
                bind_chord(hotkeys, &keys, &state.event_tx);
                info!(keys = ?keys, "hotkey registered via IPC");
                (Response::Ok, false)
            }

            Request::Unregister { keys } => match resolve_keys(&keys) {
                Ok(keys) => {
                    hotkeys.unregister(&keys);
                    (Response::Ok, false)
                }
                Err(e) => (Response::error("unknown_key", e.to_string()), false),
            },

            Request::RegisterScroll { keys } => match resolve_keys(&keys) {
                Ok(keys) => {
                    bind_scroll(hotkeys, &keys, &state.event_tx);
                    info!(keys = ?keys, "scroll hotkey registered via IPC");
                    (Response::Ok, false)
                }
                Err(e) => (Response::error("unknown_key", e.to_string()), false),
            },

            Request::UnregisterScroll { keys } => match resolve_keys(&keys) {
                Ok(keys) => {
                    hotkeys.unregister_scroll(&keys);
                    (Response::Ok, false)
                }
                Err(e) => (Response::error("unknown_key", e.to_string()), false),
            },

            Request::UnregisterAll { include_scroll } => {
                hotkeys.unregister_all(include_scroll);
                (Response::Ok, false)
            }

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Aborts the wrapped task when dropped
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Next notification for a subscribed client; never resolves otherwise
async fn next_event(
    rx: &mut Option<broadcast::Receiver<HotkeyEvent>>,
) -> Result<HotkeyEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::hook::ManualHook;
    use crate::keys::{codes, Combination};
    use crate::ipc::protocol::KeyRef;

    static NEXT_SOCKET: AtomicUsize = AtomicUsize::new(0);

    fn socket_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "qhotkeys-test-{}-{}.sock",
            std::process::id(),
            NEXT_SOCKET.fetch_add(1, Ordering::SeqCst)
        ))
    }

    struct Harness {
        hook: Arc<ManualHook>,
        hotkeys: Arc<Hotkeys>,
        server: Arc<Server>,
        path: PathBuf,
    }

    fn start_server() -> Harness {
        let hook = Arc::new(ManualHook::new());
        let hotkeys = Arc::new(Hotkeys::new(hook.clone()));
        let (event_tx, _) = broadcast::channel(16);
        let path = socket_path();
        let server = Arc::new(Server::new(&path, Arc::clone(&hotkeys), event_tx).unwrap());

        let running = Arc::clone(&server);
        tokio::spawn(async move { running.run().await });

        Harness { hook, hotkeys, server, path }
    }

    async fn request(stream: &mut UnixStream, request: &Request) -> Outgoing {
        write_frame(stream, request).await.unwrap();
        receive(stream).await
    }

    async fn receive(stream: &mut UnixStream) -> Outgoing {
        let body = read_frame(stream).await.unwrap().unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_abort_on_drop_cancels_task() {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let guard = AbortOnDrop(tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        }));

        drop(guard);

        // the sender only goes away once the task is cancelled
        let closed = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv()).await;
        assert_eq!(closed, Ok(None));
    }

    #[tokio::test]
    async fn test_ping_and_status() {
        let harness = start_server();
        let mut client = UnixStream::connect(&harness.path).await.unwrap();

        assert_eq!(
            request(&mut client, &Request::Ping).await,
            Outgoing::Response(Response::Pong)
        );

        harness.hotkeys.register(&[codes::F1], || {});
        match request(&mut client, &Request::GetStatus).await {
            Outgoing::Response(Response::Status(status)) => {
                assert_eq!(status.hotkeys, 1);
                assert!(!status.running);
            }
            other => panic!("unexpected frame: {:?}", other),
        }

        harness.server.shutdown().await;
        assert!(!harness.path.exists());
    }

    #[tokio::test]
    async fn test_register_and_receive_notification() {
        let harness = start_server();
        harness.hotkeys.run(false).unwrap();
        let mut client = UnixStream::connect(&harness.path).await.unwrap();

        assert_eq!(
            request(&mut client, &Request::Subscribe).await,
            Outgoing::Response(Response::Subscribed)
        );
        let register = Request::Register {
            keys: vec![KeyRef::Name("Ctrl".into()), KeyRef::Code(codes::C)],
        };
        assert_eq!(
            request(&mut client, &register).await,
            Outgoing::Response(Response::Ok)
        );

        harness.hook.key_down(codes::CTRL);
        harness.hook.key_down(codes::C);

        assert_eq!(
            receive(&mut client).await,
            Outgoing::Notification(Notification::Hotkey {
                event: HotkeyEvent::triggered(Combination::new([codes::CTRL, codes::C])),
            })
        );

        harness.server.shutdown().await;
    }

    #[tokio::test]
    async fn test_register_errors() {
        let harness = start_server();
        let mut client = UnixStream::connect(&harness.path).await.unwrap();

        let unknown = Request::Register {
            keys: vec![KeyRef::Name("Hyper".into())],
        };
        match request(&mut client, &unknown).await {
            Outgoing::Response(Response::Error { code, .. }) => assert_eq!(code, "unknown_key"),
            other => panic!("unexpected frame: {:?}", other),
        }

        let empty = Request::Register { keys: Vec::new() };
        match request(&mut client, &empty).await {
            Outgoing::Response(Response::Error { code, .. }) => {
                assert_eq!(code, "empty_combination")
            }
            other => panic!("unexpected frame: {:?}", other),
        }
        assert_eq!(harness.hotkeys.hotkey_count(), 0);

        harness.server.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_request_gets_error() {
        let harness = start_server();
        let mut client = UnixStream::connect(&harness.path).await.unwrap();

        write_frame(&mut client, &serde_json::json!({"type": "launch_rockets"}))
            .await
            .unwrap();
        match receive(&mut client).await {
            Outgoing::Response(Response::Error { code, .. }) => assert_eq!(code, "bad_request"),
            other => panic!("unexpected frame: {:?}", other),
        }

        // connection stays usable
        assert_eq!(
            request(&mut client, &Request::Ping).await,
            Outgoing::Response(Response::Pong)
        );

        harness.server.shutdown().await;
    }

    #[tokio::test]
    async fn test_unregister_by_set() {
        let harness = start_server();
        let mut client = UnixStream::connect(&harness.path).await.unwrap();

        let register = Request::Register {
            keys: vec![KeyRef::Code(codes::A), KeyRef::Code(codes::B)],
        };
        request(&mut client, &register).await;
        request(
            &mut client,
            &Request::RegisterScroll { keys: Vec::new() },
        )
        .await;
        assert_eq!(harness.hotkeys.hotkey_count(), 1);
        assert_eq!(harness.hotkeys.scroll_hotkey_count(), 1);

        let unregister = Request::Unregister {
            keys: vec![KeyRef::Name("B".into()), KeyRef::Name("A".into())],
        };
        assert_eq!(
            request(&mut client, &unregister).await,
            Outgoing::Response(Response::Ok)
        );
        assert_eq!(harness.hotkeys.hotkey_count(), 0);

        request(&mut client, &Request::UnregisterAll { include_scroll: true }).await;
        assert_eq!(harness.hotkeys.scroll_hotkey_count(), 0);

        harness.server.shutdown().await;
    }
}
