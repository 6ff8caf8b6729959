//! Capabilities the hosting environment provides to the catalog core.
//!
//! The core never talks to the terminal or to a player directly. It asks a
//! [`MediaSurface`] to play things, a [`SaveLink`] to save URLs, and the
//! [`Document`] for the document-level key stream and scroll state.

use crate::catalog::MovieRecord;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Failed to start player: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Player IPC error: {0}")]
    Ipc(String),

    #[error("Nothing is loaded")]
    NothingLoaded,

    #[error("Player is still starting")]
    Starting,
}

impl MediaError {
    pub fn user_message(&self) -> String {
        match self {
            MediaError::PlayerNotFound(cmd) => format!(
                "{} not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)",
                cmd
            ),
            MediaError::Spawn(e) => format!("Could not start the player: {}", e),
            MediaError::Ipc(msg) => format!("Player is not responding: {}", msg),
            MediaError::NothingLoaded => "No video loaded".to_string(),
            MediaError::Starting => "Player is starting...".to_string(),
        }
    }
}

/// Native playback facility (play/pause/seek/currentTime).
pub trait MediaSurface {
    /// Bind the surface to `movie` and start playing it.
    fn load(&mut self, movie: &MovieRecord) -> Result<(), MediaError>;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self) -> Result<(), MediaError>;
    fn is_paused(&self) -> bool;
    /// Flip between playing and paused, whatever the current state is.
    fn toggle_pause(&mut self) -> Result<(), MediaError> {
        if self.is_paused() { self.play() } else { self.pause() }
    }
    /// Seek relative to the current position, in seconds.
    fn seek(&mut self, offset_secs: f64) -> Result<(), MediaError>;
    fn current_time(&mut self) -> Result<f64, MediaError>;
    /// Stop playback and release the media.
    fn unload(&mut self);
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Failed to start downloader `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Native "save this URL as ..." behaviour.
pub trait SaveLink {
    fn save(&mut self, url: &str, file_name: &str) -> Result<(), SaveError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Document-level key stream and page scroll state.
#[derive(Debug, Default)]
pub struct Document {
    key_listeners: Vec<ListenerId>,
    next_listener: u64,
    scroll_locked: bool,
}

pub type SharedDocument = Rc<RefCell<Document>>;

impl Document {
    pub fn shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn add_key_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.key_listeners.push(id);
        id
    }

    pub fn remove_key_listener(&mut self, id: ListenerId) {
        self.key_listeners.retain(|l| *l != id);
    }

    pub fn has_key_listener(&self) -> bool {
        !self.key_listeners.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.key_listeners.len()
    }

    pub fn suspend_scroll(&mut self) {
        self.scroll_locked = true;
    }

    pub fn restore_scroll(&mut self) {
        self.scroll_locked = false;
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }
}

/// Key listener plus scroll lock, held for as long as the guard lives.
#[derive(Debug)]
pub struct ScopedCapture {
    document: SharedDocument,
    listener: ListenerId,
}

impl ScopedCapture {
    pub fn acquire(document: &SharedDocument) -> Self {
        let listener = {
            let mut doc = document.borrow_mut();
            let listener = doc.add_key_listener();
            doc.suspend_scroll();
            listener
        };
        tracing::debug!(?listener, "document key capture acquired");
        Self {
            document: Rc::clone(document),
            listener,
        }
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }
}

impl Drop for ScopedCapture {
    fn drop(&mut self) {
        let mut doc = self.document.borrow_mut();
        doc.remove_key_listener(self.listener);
        doc.restore_scroll();
        tracing::debug!(listener = ?self.listener, "document key capture released");
    }
}
