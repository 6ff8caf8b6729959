use crate::catalog::MovieRecord;
use crate::config::PlayerConfig;
use crate::host::{MediaError, MediaSurface};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const IPC_TIMEOUT: Duration = Duration::from_secs(3);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_RETRY: Duration = Duration::from_millis(50);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Requests queued for the IPC task.
#[derive(Debug, Clone, Copy, PartialEq)]
enum IpcCommand {
    Play,
    Pause,
    TogglePause,
    Seek(f64),
}

impl IpcCommand {
    fn to_json(self) -> Value {
        match self {
            IpcCommand::Play => json!(["set_property", "pause", false]),
            IpcCommand::Pause => json!(["set_property", "pause", true]),
            IpcCommand::TogglePause => json!(["cycle", "pause"]),
            IpcCommand::Seek(offset) => json!(["seek", offset, "relative"]),
        }
    }
}

/// Last state reported by the player.
#[derive(Debug, Clone, Default, PartialEq)]
struct PlaybackStatus {
    paused: bool,
    time_pos: Option<f64>,
    error: Option<String>,
}

/// One running player plus the task that talks to it.
struct Session {
    child: Option<Child>,
    commands: mpsc::UnboundedSender<IpcCommand>,
    status: watch::Receiver<PlaybackStatus>,
    task: JoinHandle<()>,
}

impl Session {
    /// Start the IPC task. Commands sent before the socket exists are queued.
    fn connect(socket_path: PathBuf, child: Option<Child>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(PlaybackStatus::default());
        let task = tokio::spawn(run_ipc(socket_path, command_rx, status_tx));
        Self {
            child,
            commands,
            status,
            task,
        }
    }

    fn send(&self, command: IpcCommand) -> Result<(), MediaError> {
        self.commands.send(command).map_err(|_| {
            let reason = self.status.borrow().error.clone();
            MediaError::Ipc(reason.unwrap_or_else(|| "player connection closed".to_string()))
        })
    }
}

/// `MediaSurface` backed by an mpv window controlled over its JSON IPC socket.
pub struct MpvSurface {
    config: PlayerConfig,
    socket_path: PathBuf,
    session: Option<Session>,
}

impl MpvSurface {
    pub fn new(config: PlayerConfig) -> Self {
        let socket_path = std::env::temp_dir().join(format!("streamflix-mpv-{}.sock", std::process::id()));
        Self {
            config,
            socket_path,
            session: None,
        }
    }

    fn spawn_args(&self, movie: &MovieRecord) -> Vec<String> {
        let mut args = vec![
            "--force-window=yes".to_string(),
            "--keep-open=yes".to_string(),
            format!("--title={}", movie.title),
            format!("--input-ipc-server={}", self.socket_path.display()),
        ];
        if self.config.fullscreen {
            args.push("--fullscreen".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.push(movie.video_url.clone());
        args
    }

    fn session(&self) -> Result<&Session, MediaError> {
        self.session.as_ref().ok_or(MediaError::NothingLoaded)
    }
}

impl MediaSurface for MpvSurface {
    fn load(&mut self, movie: &MovieRecord) -> Result<(), MediaError> {
        self.unload();
        // Remove stale socket if it exists from a previous crash.
        let _ = std::fs::remove_file(&self.socket_path);

        let child = Command::new(&self.config.command)
            .args(self.spawn_args(movie))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            // Send stderr to null; a pipe nobody drains would block mpv.
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::PlayerNotFound(self.config.command.clone())
                } else {
                    MediaError::Spawn(e)
                }
            })?;
        tracing::debug!(pid = ?child.id(), url = %movie.video_url, "player started");
        self.session = Some(Session::connect(self.socket_path.clone(), Some(child)));
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.session()?.send(IpcCommand::Play)
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.session()?.send(IpcCommand::Pause)
    }

    fn toggle_pause(&mut self) -> Result<(), MediaError> {
        self.session()?.send(IpcCommand::TogglePause)
    }

    fn is_paused(&self) -> bool {
        self.session
            .as_ref()
            .is_none_or(|session| session.status.borrow().paused)
    }

    fn seek(&mut self, offset_secs: f64) -> Result<(), MediaError> {
        self.session()?.send(IpcCommand::Seek(offset_secs))
    }

    fn current_time(&mut self) -> Result<f64, MediaError> {
        let status = self.session()?.status.borrow();
        if let Some(error) = &status.error {
            return Err(MediaError::Ipc(error.clone()));
        }
        status.time_pos.ok_or(MediaError::Starting)
    }

    fn unload(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.task.abort();
            if let Some(child) = session.child.as_mut() {
                let _ = child.start_kill();
            }
            tracing::debug!("player stopped");
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl Drop for MpvSurface {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Extract `data` from the reply matching `request_id`.
fn parse_reply(line: &str, request_id: u64) -> Option<Result<Value, MediaError>> {
    let val: Value = serde_json::from_str(line).ok()?;
    if val.get("request_id").and_then(Value::as_u64) != Some(request_id) {
        // Event lines carry no request_id.
        return None;
    }
    match val.get("error").and_then(Value::as_str) {
        Some("success") => Some(Ok(val.get("data").cloned().unwrap_or(Value::Null))),
        Some(err) => Some(Err(MediaError::Ipc(err.to_string()))),
        None => Some(Err(MediaError::Ipc("malformed reply".to_string()))),
    }
}

fn report(status: &watch::Sender<PlaybackStatus>, err: MediaError) {
    tracing::warn!(error = %err, "player IPC failed");
    let message = match err {
        MediaError::Ipc(message) => message,
        other => other.to_string(),
    };
    status.send_modify(|s| s.error = Some(message));
}

#[cfg(unix)]
async fn run_ipc(
    socket_path: PathBuf,
    mut commands: mpsc::UnboundedReceiver<IpcCommand>,
    status: watch::Sender<PlaybackStatus>,
) {
    let mut conn = match IpcConnection::connect(&socket_path).await {
        Ok(conn) => conn,
        Err(e) => return report(&status, e),
    };
    tracing::debug!(socket = %socket_path.display(), "player IPC connected");

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if let Err(e) = conn.request(command.to_json()).await {
                    report(&status, e);
                }
            }
            _ = poll.tick() => {
                // Follow the player's own state so pauses made in its window show up here.
                let paused = match conn.request(json!(["get_property", "pause"])).await {
                    Ok(data) => data.as_bool().unwrap_or(false),
                    Err(e) => return report(&status, e),
                };
                // time-pos is unavailable until the stream has opened.
                let time_pos = conn
                    .request(json!(["get_property", "time-pos"]))
                    .await
                    .ok()
                    .and_then(|data| data.as_f64());
                status.send_modify(|s| {
                    s.paused = paused;
                    s.time_pos = time_pos;
                });
            }
        }
    }
}

#[cfg(not(unix))]
async fn run_ipc(
    _socket_path: PathBuf,
    _commands: mpsc::UnboundedReceiver<IpcCommand>,
    status: watch::Sender<PlaybackStatus>,
) {
    report(&status, MediaError::Ipc("mpv IPC requires a Unix socket".to_string()));
}

#[cfg(unix)]
struct IpcConnection {
    lines: tokio::io::Lines<tokio::io::BufReader<tokio::net::unix::OwnedReadHalf>>,
    writer: tokio::net::unix::OwnedWriteHalf,
    request_id: u64,
}

#[cfg(unix)]
impl IpcConnection {
    /// Retry until mpv has created its socket.
    async fn connect(socket_path: &Path) -> Result<Self, MediaError> {
        use tokio::io::AsyncBufReadExt;

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, async {
            loop {
                match tokio::net::UnixStream::connect(socket_path).await {
                    Ok(stream) => return stream,
                    Err(_) => tokio::time::sleep(CONNECT_RETRY).await,
                }
            }
        })
        .await
        .map_err(|_| MediaError::Ipc(format!("no IPC socket at {}", socket_path.display())))?;

        let (read, writer) = stream.into_split();
        Ok(Self {
            lines: tokio::io::BufReader::new(read).lines(),
            writer,
            request_id: 0,
        })
    }

    async fn request(&mut self, command: Value) -> Result<Value, MediaError> {
        use tokio::io::AsyncWriteExt;

        self.request_id += 1;
        let request_id = self.request_id;
        let mut line = json!({ "command": command, "request_id": request_id }).to_string();
        line.push('\n');

        let ipc = |e: std::io::Error| MediaError::Ipc(e.to_string());
        self.writer.write_all(line.as_bytes()).await.map_err(ipc)?;

        // mpv interleaves event lines with replies; skip until ours arrives.
        let lines = &mut self.lines;
        tokio::time::timeout(IPC_TIMEOUT, async move {
            loop {
                let Some(line) = lines.next_line().await.map_err(ipc)? else {
                    return Err(MediaError::Ipc("player closed the connection".to_string()));
                };
                if let Some(result) = parse_reply(&line, request_id) {
                    return result;
                }
            }
        })
        .await
        .map_err(|_| MediaError::Ipc("no reply from player".to_string()))?
    }
}
