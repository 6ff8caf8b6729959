use crate::catalog::{self, CatalogError, CatalogSource, MovieRecord};
use crate::download;
use crate::filter;
use crate::host::{MediaSurface, SaveLink, SharedDocument};
use crate::overlay::{KeyDisposition, OverlayKey, PlaybackOverlay};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

type CatalogResult = Result<Vec<MovieRecord>, CatalogError>;

/// Input mode for the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

/// Card affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Play,
    Download,
}

/// A card interaction, carrying the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    Play(MovieRecord),
    Download(MovieRecord),
}

/// Transient message shown in the corner of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn success(message: String) -> Self {
        Self { message }
    }
}

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,

    // Catalog snapshot and the visible subsequence (indices into it)
    pub catalog: Vec<MovieRecord>,
    pub visible: Vec<usize>,

    pub search: String,
    pub input_mode: InputMode,
    pub theme: Theme,

    // Grid state
    pub selected: usize,
    pub grid_columns: usize,

    pub overlay: PlaybackOverlay,
    notifications: Vec<(Notification, Instant)>,
    toast_duration: Duration,

    pub status_msg: String,
    /// Shown in the help popup so problems can be reported.
    pub log_path: Option<PathBuf>,

    media: Box<dyn MediaSurface>,
    saver: Box<dyn SaveLink>,
    document: SharedDocument,
    catalog_rx: Option<oneshot::Receiver<CatalogResult>>,
}

impl App {
    pub fn new(
        media: Box<dyn MediaSurface>,
        saver: Box<dyn SaveLink>,
        document: SharedDocument,
        theme: Theme,
        toast_duration: Duration,
    ) -> Self {
        Self {
            should_quit: false,
            show_help: false,

            catalog: Vec::new(),
            visible: Vec::new(),

            search: String::new(),
            input_mode: InputMode::Normal,
            theme,

            selected: 0,
            grid_columns: 1, // Updated on first render/resize

            overlay: PlaybackOverlay::new(document.clone()),
            notifications: Vec::new(),
            toast_duration,

            status_msg: "Loading catalog...".to_string(),
            log_path: None,

            media,
            saver,
            document,
            catalog_rx: None,
        }
    }

    /// Kick off the one-shot catalog retrieval.
    pub fn start_catalog_load(&mut self, source: CatalogSource) {
        tracing::info!(source = %source.describe(), "loading catalog");
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(catalog::load(&source).await);
        });
        self.catalog_rx = Some(rx);
    }

    /// Poll the pending catalog retrieval, if any.
    pub fn check_pending(&mut self) {
        if let Some(mut rx) = self.catalog_rx.take() {
            match rx.try_recv() {
                Ok(result) => self.catalog_loaded(result),
                Err(oneshot::error::TryRecvError::Empty) => {
                    self.catalog_rx = Some(rx);
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    tracing::error!("catalog task ended without a result");
                    self.status_msg.clear();
                }
            }
        }
    }

    pub fn catalog_loaded(&mut self, result: CatalogResult) {
        match result {
            Ok(movies) => {
                tracing::info!(count = movies.len(), "catalog loaded");
                self.catalog = movies;
                self.status_msg = format!("{} movies loaded", self.catalog.len());
            }
            Err(e) => {
                // The page shows the same empty state as an empty catalog.
                tracing::error!(error = %e, "failed to load catalog: {}", e.user_message());
                self.status_msg.clear();
            }
        }
        self.apply_filter();
    }

    /// Recompute the visible subsequence, keeping the selected card if it survives.
    pub fn apply_filter(&mut self) {
        let selected_id = self.selected_movie().map(|m| m.id.clone());
        self.visible = filter::visible_indices(&self.catalog, &self.search);
        self.selected = selected_id
            .and_then(|id| self.visible.iter().position(|&i| self.catalog[i].id == id))
            .unwrap_or(0);
    }

    pub fn visible_movies(&self) -> impl Iterator<Item = &MovieRecord> {
        self.visible.iter().map(|&i| &self.catalog[i])
    }

    pub fn selected_movie(&self) -> Option<&MovieRecord> {
        self.visible.get(self.selected).map(|&i| &self.catalog[i])
    }

    // ── Search ──

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
        self.apply_filter();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.apply_filter();
    }

    pub fn pop_search_char(&mut self) {
        if self.search.pop().is_some() {
            self.apply_filter();
        }
    }

    pub fn clear_search(&mut self) {
        if !self.search.is_empty() {
            self.search.clear();
            self.apply_filter();
        }
    }

    pub fn heading(&self) -> String {
        if self.search.is_empty() {
            "Featured Movies".to_string()
        } else {
            format!("Search Results for \"{}\"", self.search)
        }
    }

    pub fn count_line(&self) -> String {
        let n = self.visible.len();
        format!("{} movie{} available", n, if n == 1 { "" } else { "s" })
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    // ── Grid navigation ──

    pub fn update_layout(&mut self, columns: usize) {
        self.grid_columns = columns.max(1);
    }

    /// Page scroll is suspended while the overlay holds the document.
    fn can_scroll(&self) -> bool {
        !self.document.borrow().scroll_locked()
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() || !self.can_scroll() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    pub fn select_down(&mut self) {
        self.move_selection(self.grid_columns as isize);
    }

    pub fn select_up(&mut self) {
        self.move_selection(-(self.grid_columns as isize));
    }

    pub fn select_first(&mut self) {
        if self.can_scroll() {
            self.selected = 0;
        }
    }

    pub fn select_last(&mut self) {
        if self.can_scroll() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    // ── Card actions ──

    /// The action an affordance on the selected card produces.
    pub fn card_action(&self, affordance: Affordance) -> Option<CardAction> {
        let movie = self.selected_movie()?.clone();
        Some(match affordance {
            Affordance::Play => CardAction::Play(movie),
            Affordance::Download => CardAction::Download(movie),
        })
    }

    pub fn handle_card_action(&mut self, action: CardAction) {
        match action {
            CardAction::Play(movie) => self.play(movie),
            CardAction::Download(movie) => self.download(&movie),
        }
    }

    pub fn play(&mut self, movie: MovieRecord) {
        self.overlay.open(movie, self.media.as_mut());
    }

    pub fn download(&mut self, movie: &MovieRecord) {
        let note = download::trigger(self.saver.as_mut(), movie);
        self.notify(note);
    }

    /// Download button inside the overlay.
    pub fn download_active(&mut self) {
        if let Some(movie) = self.overlay.active_movie().cloned() {
            self.download(&movie);
        }
    }

    pub fn media_paused(&self) -> bool {
        self.media.is_paused()
    }

    pub fn close_player(&mut self) {
        self.overlay.close(self.media.as_mut());
    }

    /// Offer a key to the document listener. Only the open overlay listens.
    pub fn dispatch_document_key(&mut self, key: OverlayKey) -> KeyDisposition {
        if !self.document.borrow().has_key_listener() {
            return KeyDisposition::Ignored;
        }
        self.overlay.handle_key(key, self.media.as_mut())
    }

    // ── Notifications ──

    pub fn notify(&mut self, note: Notification) {
        self.notifications.push((note, Instant::now()));
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().map(|(n, _)| n)
    }

    /// Periodic housekeeping from the event loop.
    pub fn tick(&mut self, now: Instant) {
        let ttl = self.toast_duration;
        self.notifications
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < ttl);
        if self.overlay.is_open() {
            self.overlay.refresh_position(self.media.as_mut());
        }
    }

    /// Release everything the overlay holds before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.close_player();
    }
}
