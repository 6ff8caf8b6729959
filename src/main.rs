mod app;
mod catalog;
mod config;
mod download;
mod filter;
mod host;
mod logging;
mod overlay;
mod player;
mod ui;

use app::{Affordance, App, InputMode, Theme};
use catalog::CatalogSource;
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use download::CommandSaver;
use host::Document;
use overlay::{KeyDisposition, OverlayKey};
use player::MpvSurface;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Browse a movie catalog in the terminal and play titles with mpv
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Site root serving /video/movies.json
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Catalog URL or local JSON file (overrides --base-url)
    #[arg(long, global = true, conflicts_with = "demo")]
    catalog: Option<String>,

    /// Use the bundled sample catalog
    #[arg(long, global = true)]
    demo: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TUI browser (default)
    Run {
        /// Start with the light theme
        #[arg(long)]
        light: bool,
    },
    /// Print the catalog, filtered by SEARCH, and exit
    List {
        /// Case-insensitive title/genre filter
        #[arg(default_value = "")]
        search: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn catalog_source(cli: &Cli, config: &Config) -> CatalogSource {
    if cli.demo {
        CatalogSource::Bundled
    } else if let Some(arg) = cli.catalog.as_deref().or(config.catalog.as_deref()) {
        CatalogSource::from_arg(arg)
    } else {
        let base_url = cli.base_url.as_deref().unwrap_or(&config.base_url);
        CatalogSource::from_base_url(base_url)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (_log_guard, log_path) = match logging::init_logging() {
        Ok((guard, path)) => (Some(guard), Some(path)),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            (None, None)
        }
    };

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };
    let source = catalog_source(&cli, &config);

    match cli.command {
        Some(Commands::List { ref search, json }) => {
            let movies = match catalog::load(&source).await {
                Ok(movies) => movies,
                Err(e) => {
                    tracing::error!(error = %e, "catalog load failed");
                    eprintln!("Error: {}", e.user_message());
                    // Flush the log writer; exit skips destructors.
                    drop(_log_guard);
                    std::process::exit(1);
                }
            };
            let visible = filter::filter_catalog(&movies, search);
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                for movie in visible {
                    println!(
                        "{:>4}  {:<32} {:<10} {}",
                        movie.id,
                        movie.title,
                        movie.genre.as_deref().unwrap_or("-"),
                        movie.duration_label.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Some(Commands::Run { light }) => run_tui(config, source, light, log_path).await?,
        None => run_tui(config, source, false, log_path).await?,
    }

    Ok(())
}

async fn run_tui(
    config: Config,
    source: CatalogSource,
    light: bool,
    log_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = Document::shared();
    let theme = if light { Theme::Light } else { Theme::from_dark_mode(config.dark_mode) };

    let mut app = App::new(
        Box::new(MpvSurface::new(config.player.clone())),
        Box::new(CommandSaver::new(&config.download)),
        document,
        theme,
        Duration::from_secs(config.toast_seconds),
    );
    app.log_path = log_path;
    app.start_catalog_load(source);

    // Init terminal
    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    app.update_layout(ui::columns_for_width(size.width));

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    app.shutdown();
    // Restore terminal
    ratatui::restore();

    if let Err(e) = result {
        tracing::error!(error = %e, "event loop failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.check_pending();
        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Resize(width, _) => {
                    app.update_layout(ui::columns_for_width(width));
                }
                _ => {}
            }
        }
    }
}

fn overlay_key(code: KeyCode) -> OverlayKey {
    match code {
        KeyCode::Char(' ') => OverlayKey::Space,
        KeyCode::Esc => OverlayKey::Escape,
        KeyCode::Left => OverlayKey::ArrowLeft,
        KeyCode::Right => OverlayKey::ArrowRight,
        _ => OverlayKey::Other,
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Document-level listener (the open overlay) sees keys first.
    match app.dispatch_document_key(overlay_key(key.code)) {
        KeyDisposition::Handled | KeyDisposition::PreventDefault => return,
        KeyDisposition::Ignored => {}
    }

    if app.overlay.is_open() {
        handle_overlay_buttons(app, key);
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }
    handle_grid_key(app, key);
}

fn handle_overlay_buttons(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') => app.download_active(),
        KeyCode::Char('x') => app.close_player(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_grid_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Right | KeyCode::Char('l') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_down(),
        KeyCode::Up | KeyCode::Char('k') => app.select_up(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter | KeyCode::Char('p') => {
            if let Some(action) = app.card_action(Affordance::Play) {
                app.handle_card_action(action);
            }
        }
        KeyCode::Char('d') => {
            if let Some(action) = app.card_action(Affordance::Download) {
                app.handle_card_action(action);
            }
        }
        KeyCode::Esc => app.clear_search(),
        _ => {}
    }
}
