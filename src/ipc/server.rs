//! Unix domain socket server for IPC
//!
//! Host UIs forward key-down events and receive the actions that fired,
//! plus whether the host should suppress the event's default action.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::service::{lock, ReloadSource, SharedService};
use crate::throttle::Throttled;

use super::protocol::{DaemonStatus, Request, Response, MAX_FRAME_LEN};

/// State shared by every client connection
pub struct ServerState {
    service: SharedService,
    reload: Throttled<ReloadSource>,
    start_time: Instant,
}

impl ServerState {
    pub fn new(service: SharedService, reload: Throttled<ReloadSource>) -> Self {
        Self {
            service,
            reload,
            start_time: Instant::now(),
        }
    }

    /// Process a request and return a response
    pub fn process_request(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let service = lock(&self.service);
                Response::Status(DaemonStatus {
                    bindings: service.bindings(),
                    reloads: service.reloads(),
                    uptime_secs: self.start_time.elapsed().as_secs(),
                    ..DaemonStatus::default()
                })
            }

            Request::KeyDown { event } => {
                let dispatched = lock(&self.service).key_down(event);
                Response::Dispatched {
                    actions: dispatched.actions,
                    default_prevented: dispatched.default_prevented,
                }
            }

            Request::ReloadKeymap => {
                // Runs as a background task; the service lock is not held here
                self.reload.call(ReloadSource::Ipc);
                Response::ReloadScheduled
            }
        }
    }
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    state: Arc<ServerState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Create a new IPC server
    pub fn new(socket_path: &Path, state: ServerState) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

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
            listener,
            state: Arc::new(state),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
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

    /// Handle a single client connection
    async fn handle_client(mut stream: UnixStream, state: Arc<ServerState>) -> Result<()> {
        loop {
            let Some(body) = read_frame(&mut stream).await? else {
                debug!("client disconnected");
                return Ok(());
            };

            let response = match serde_json::from_slice::<Request>(&body) {
                Ok(request) => {
                    debug!(?request, "received request");
                    state.process_request(request)
                }
                Err(e) => {
                    warn!(?e, "malformed request");
                    Response::error("invalid_request", e.to_string())
                }
            };

            write_frame(&mut stream, &response).await?;
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

/// Read one length-prefixed message body.
///
/// Returns `None` on a clean disconnect before the length prefix.
pub async fn read_frame<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        anyhow::bail!("message too large: {len} bytes");
    }

    let mut body = vec![0u8; len];
    stream
        .read_exact(&mut body)
        .await
        .context("failed to read message body")?;
    Ok(Some(body))
}

/// Send a length-prefixed JSON message
pub async fn write_frame<W, T>(stream: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    stream.write_all(&msg_len).await?;
    stream.write_all(&msg_bytes).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::events::{Element, KeyEvent};
    use crate::keymap::Keymap;
    use crate::service::{reload_throttle, wait_for_reloads, HotkeyService};

    fn test_state(keymap_path: PathBuf) -> ServerState {
        let config = Config {
            socket_path: PathBuf::from("/tmp/unused.sock"),
            keymap_path,
            ignore_tags: Arc::from(vec!["INPUT".to_string()]),
            trigger_on_content_editable: false,
            reload_throttle: Duration::from_millis(100),
        };
        let keymap = Keymap::from_json(r#"[{ "keys": "mod+shift+p", "action": "command_palette" }]"#).unwrap();
        let service = HotkeyService::new(&config, &keymap).into_shared();
        let reload = reload_throttle(&service, config.reload_throttle);
        ServerState::new(service, reload)
    }

    #[test]
    fn test_process_key_down() {
        let state = test_state(PathBuf::from("/nonexistent"));

        let event = KeyEvent::new("P").with_code("KeyP").with_ctrl().with_shift();
        let response = state.process_request(Request::KeyDown { event: event.clone() });
        assert_eq!(
            response,
            Response::Dispatched {
                actions: vec!["command_palette".to_string()],
                default_prevented: true,
            }
        );

        let in_input = event.with_target(Element::new("INPUT"));
        let response = state.process_request(Request::KeyDown { event: in_input });
        assert_eq!(
            response,
            Response::Dispatched {
                actions: Vec::new(),
                default_prevented: false,
            }
        );
    }

    #[test]
    fn test_key_down_reports_only_bindings_default_prevented() {
        let state = test_state(PathBuf::from("/nonexistent"));

        let request: Request =
            serde_json::from_str(r#"{"type":"key_down","event":{"key":"z","defaultPrevented":true}}"#).unwrap();
        assert_eq!(
            state.process_request(request),
            Response::Dispatched {
                actions: Vec::new(),
                default_prevented: false,
            }
        );
    }

    #[test]
    fn test_process_status() {
        let state = test_state(PathBuf::from("/nonexistent"));
        match state.process_request(Request::GetStatus) {
            Response::Status(status) => {
                assert_eq!(status.bindings, 1);
                assert_eq!(status.reloads, 0);
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(state.process_request(Request::Ping), Response::Pong);
    }

    #[tokio::test]
    async fn test_process_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keymap.json");
        std::fs::write(&path, r#"[{ "keys": "g", "action": "go" }, { "keys": "h", "action": "home" }]"#).unwrap();

        let state = test_state(path);
        assert_eq!(state.process_request(Request::ReloadKeymap), Response::ReloadScheduled);
        wait_for_reloads(&state.service, 1).await;

        match state.process_request(Request::GetStatus) {
            Response::Status(status) => {
                assert_eq!(status.bindings, 2);
                assert_eq!(status.reloads, 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_socket_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("keybinder.sock");
        let server = Arc::new(Server::new(&socket_path, test_state(PathBuf::from("/nonexistent"))).unwrap());

        let running = Arc::clone(&server);
        let task = tokio::spawn(async move { running.run().await });

        let mut client = UnixStream::connect(&socket_path).await.unwrap();

        let event = KeyEvent::new("p").with_meta().with_shift();
        write_frame(&mut client, &Request::KeyDown { event }).await.unwrap();
        let body = read_frame(&mut client).await.unwrap().unwrap();
        let response: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            response,
            Response::Dispatched {
                actions: vec!["command_palette".to_string()],
                default_prevented: true,
            }
        );

        // Malformed requests get an error response, not a dropped connection
        let garbage = b"{\"type\":\"nope\"}";
        client.write_all(&(garbage.len() as u32).to_le_bytes()).await.unwrap();
        client.write_all(garbage).await.unwrap();
        let body = read_frame(&mut client).await.unwrap().unwrap();
        let response: Response = serde_json::from_slice(&body).unwrap();
        assert!(matches!(response, Response::Error { ref code, .. } if code == "invalid_request"));

        server.shutdown().await;
        task.abort();
        assert!(!socket_path.exists());
    }
}
