use crate::catalog::MovieRecord;
use crate::host::{ListenerId, MediaError, MediaSurface, ScopedCapture, SharedDocument};

/// Seconds skipped by the arrow keys.
pub const SEEK_STEP_SECS: f64 = 10.0;

/// Keys the overlay listens for on the document key stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Space,
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// What happened to a key offered to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not for the overlay; the host may handle it.
    Ignored,
    /// Consumed by the overlay.
    Handled,
    /// Consumed, and the key's default page behaviour must not run.
    PreventDefault,
}

/// An open overlay always carries its record and its document capture.
#[derive(Debug)]
pub struct OpenOverlay {
    movie: MovieRecord,
    capture: ScopedCapture,
    position: Option<f64>,
    error: Option<String>,
}

impl OpenOverlay {
    pub fn movie(&self) -> &MovieRecord {
        &self.movie
    }

    pub fn listener(&self) -> ListenerId {
        self.capture.listener()
    }

    pub fn position(&self) -> Option<f64> {
        self.position
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn report(&mut self, err: MediaError) {
        tracing::warn!(id = %self.movie.id, error = %err, "media surface error");
        self.error = Some(err.user_message());
    }
}

#[derive(Debug, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open(OpenOverlay),
}

/// Full-screen playback overlay bound to at most one record.
pub struct PlaybackOverlay {
    state: OverlayState,
    document: SharedDocument,
}

impl PlaybackOverlay {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            state: OverlayState::Closed,
            document,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, OverlayState::Open(_))
    }

    pub fn active_movie(&self) -> Option<&MovieRecord> {
        match &self.state {
            OverlayState::Open(open) => Some(&open.movie),
            OverlayState::Closed => None,
        }
    }

    pub fn open_overlay(&self) -> Option<&OpenOverlay> {
        match &self.state {
            OverlayState::Open(open) => Some(open),
            OverlayState::Closed => None,
        }
    }

    /// Show `movie`, switching records in place if already open.
    pub fn open(&mut self, movie: MovieRecord, media: &mut dyn MediaSurface) {
        let capture = match std::mem::take(&mut self.state) {
            OverlayState::Open(previous) => {
                media.unload();
                previous.capture
            }
            OverlayState::Closed => ScopedCapture::acquire(&self.document),
        };
        tracing::info!(id = %movie.id, title = %movie.title, "opening player");

        let mut open = OpenOverlay {
            movie,
            capture,
            position: None,
            error: None,
        };
        if let Err(e) = media.load(&open.movie).and_then(|_| media.play()) {
            open.report(e);
        }
        self.state = OverlayState::Open(open);
    }

    pub fn close(&mut self, media: &mut dyn MediaSurface) {
        if let OverlayState::Open(open) = std::mem::take(&mut self.state) {
            media.unload();
            tracing::info!(id = %open.movie.id, "closing player");
            // `open.capture` drops here, releasing the listener and scroll lock.
        }
    }

    /// Document-level key handling; only active while open.
    pub fn handle_key(&mut self, key: OverlayKey, media: &mut dyn MediaSurface) -> KeyDisposition {
        let OverlayState::Open(open) = &mut self.state else {
            return KeyDisposition::Ignored;
        };

        match key {
            OverlayKey::Space => {
                if let Err(e) = media.toggle_pause() {
                    open.report(e);
                }
                KeyDisposition::PreventDefault
            }
            OverlayKey::Escape => {
                self.close(media);
                KeyDisposition::Handled
            }
            OverlayKey::ArrowLeft => {
                if let Err(e) = media.seek(-SEEK_STEP_SECS) {
                    open.report(e);
                }
                KeyDisposition::PreventDefault
            }
            OverlayKey::ArrowRight => {
                if let Err(e) = media.seek(SEEK_STEP_SECS) {
                    open.report(e);
                }
                KeyDisposition::PreventDefault
            }
            OverlayKey::Other => KeyDisposition::Ignored,
        }
    }

    /// Pull the playback position for display.
    pub fn refresh_position(&mut self, media: &mut dyn MediaSurface) {
        if let OverlayState::Open(open) = &mut self.state {
            match media.current_time() {
                Ok(secs) => open.position = Some(secs),
                // The IPC side logs its own failures.
                Err(e @ MediaError::Ipc(_)) => {
                    open.position = None;
                    open.error = Some(e.user_message());
                }
                Err(_) => open.position = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample;
    use crate::host::Document;
    use crate::host::fakes::{FakeMedia, MediaCall};

    fn setup() -> (PlaybackOverlay, FakeMedia, SharedDocument) {
        let document = Document::shared();
        (PlaybackOverlay::new(document.clone()), FakeMedia::default(), document)
    }

    fn assert_consistent(overlay: &PlaybackOverlay) {
        assert_eq!(overlay.is_open(), overlay.active_movie().is_some());
    }

    #[test]
    fn test_starts_closed_without_capture() {
        let (overlay, _media, document) = setup();
        assert!(!overlay.is_open());
        assert_consistent(&overlay);
        assert!(!document.borrow().has_key_listener());
    }

    #[test]
    fn test_open_autoplays_and_locks_scroll() {
        let (mut overlay, mut media, document) = setup();
        overlay.open(sample("2", "The Matrix", Some("Sci-Fi")), &mut media);

        assert_eq!(overlay.active_movie().map(|m| m.id.as_str()), Some("2"));
        assert_consistent(&overlay);
        assert!(document.borrow().has_key_listener());
        assert!(document.borrow().scroll_locked());
        assert_eq!(
            *media.calls.borrow(),
            vec![MediaCall::Load("https://media.example/2.mp4".to_string()), MediaCall::Play]
        );
        assert!(!media.is_paused());
    }

    #[test]
    fn test_escape_closes_and_restores() {
        let (mut overlay, mut media, document) = setup();
        overlay.open(sample("2", "The Matrix", Some("Sci-Fi")), &mut media);

        let disposition = overlay.handle_key(OverlayKey::Escape, &mut media);
        assert_eq!(disposition, KeyDisposition::Handled);
        assert!(!overlay.is_open());
        assert!(overlay.active_movie().is_none());
        assert_consistent(&overlay);
        assert!(!document.borrow().has_key_listener());
        assert!(!document.borrow().scroll_locked());
        assert_eq!(media.calls.borrow().last(), Some(&MediaCall::Unload));
    }

    #[test]
    fn test_switching_records_keeps_capture() {
        let (mut overlay, mut media, document) = setup();
        overlay.open(sample("1", "Inception", None), &mut media);
        let first = overlay.open_overlay().map(|o| o.listener());

        overlay.open(sample("2", "The Matrix", None), &mut media);
        let second = overlay.open_overlay().map(|o| o.listener());

        assert_eq!(first, second);
        assert_eq!(document.borrow().listener_count(), 1);
        assert!(document.borrow().scroll_locked());
        assert_eq!(overlay.active_movie().map(|m| m.id.as_str()), Some("2"));
        assert_consistent(&overlay);
    }

    #[test]
    fn test_space_toggles_playback() {
        let (mut overlay, mut media, _document) = setup();
        overlay.open(sample("1", "Inception", None), &mut media);

        assert_eq!(overlay.handle_key(OverlayKey::Space, &mut media), KeyDisposition::PreventDefault);
        assert!(media.is_paused());
        assert_eq!(overlay.handle_key(OverlayKey::Space, &mut media), KeyDisposition::PreventDefault);
        assert!(!media.is_paused());
    }

    #[test]
    fn test_arrows_seek_ten_seconds() {
        let (mut overlay, mut media, _document) = setup();
        overlay.open(sample("1", "Inception", None), &mut media);

        overlay.handle_key(OverlayKey::ArrowRight, &mut media);
        overlay.handle_key(OverlayKey::ArrowRight, &mut media);
        overlay.handle_key(OverlayKey::ArrowLeft, &mut media);
        overlay.refresh_position(&mut media);

        assert_eq!(overlay.open_overlay().and_then(|o| o.position()), Some(10.0));
        assert!(media.calls.borrow().contains(&MediaCall::Seek(-SEEK_STEP_SECS)));
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let (mut overlay, mut media, _document) = setup();
        for key in [OverlayKey::Space, OverlayKey::Escape, OverlayKey::ArrowLeft, OverlayKey::ArrowRight] {
            assert_eq!(overlay.handle_key(key, &mut media), KeyDisposition::Ignored);
        }
        assert!(media.calls.borrow().is_empty());
    }

    #[test]
    fn test_other_keys_pass_through() {
        let (mut overlay, mut media, _document) = setup();
        overlay.open(sample("1", "Inception", None), &mut media);
        assert_eq!(overlay.handle_key(OverlayKey::Other, &mut media), KeyDisposition::Ignored);
        assert!(overlay.is_open());
    }

    #[test]
    fn test_load_failure_keeps_overlay_open() {
        let (mut overlay, _media, document) = setup();
        let mut media = FakeMedia {
            fail_load: true,
            ..FakeMedia::default()
        };
        overlay.open(sample("1", "Inception", None), &mut media);

        let open = overlay.open_overlay().unwrap();
        assert!(open.error().unwrap().contains("not found"));
        assert!(document.borrow().has_key_listener());
    }

    #[test]
    fn test_lost_player_connection_is_shown() {
        let (mut overlay, mut media, _document) = setup();
        overlay.open(sample("1", "Inception", None), &mut media);
        overlay.refresh_position(&mut media);
        assert!(overlay.open_overlay().unwrap().error().is_none());

        media.ipc_error = Some("player closed the connection".to_string());
        overlay.refresh_position(&mut media);
        let open = overlay.open_overlay().unwrap();
        assert_eq!(open.position(), None);
        assert!(open.error().unwrap().contains("player closed the connection"));
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let (mut overlay, mut media, _document) = setup();
        overlay.close(&mut media);
        assert!(media.calls.borrow().is_empty());
    }
}
