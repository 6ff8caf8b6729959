use crate::app::Notification;
use crate::catalog::MovieRecord;
use crate::config::DownloadConfig;
use crate::host::{SaveError, SaveLink};
use std::path::PathBuf;
use std::process::Stdio;

/// File name proposed to the save facility.
pub fn suggested_file_name(title: &str) -> String {
    format!("{}.mp4", title)
}

/// Hand the record's video URL to the native save behaviour.
///
/// Fire-once: nothing checks that the resource was actually retrievable, and
/// the notification is emitted either way.
pub fn trigger(saver: &mut dyn SaveLink, movie: &MovieRecord) -> Notification {
    let file_name = suggested_file_name(&movie.title);
    match saver.save(&movie.video_url, &file_name) {
        Ok(()) => tracing::info!(id = %movie.id, file = %file_name, "download requested"),
        Err(e) => tracing::warn!(id = %movie.id, error = %e, "download request failed"),
    }
    Notification::success(format!("Downloading {}...", movie.title))
}

/// Saves links by spawning a downloader process and never waiting on it.
pub struct CommandSaver {
    command: String,
    args: Vec<String>,
    directory: PathBuf,
}

impl CommandSaver {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            directory: config.directory.clone(),
        }
    }

    /// Arguments with `{url}` and `{file}` substituted.
    fn expand_args(&self, url: &str, file_name: &str) -> Vec<String> {
        let file = sanitize_file_name(file_name);
        self.args
            .iter()
            .map(|arg| arg.replace("{url}", url).replace("{file}", &file))
            .collect()
    }
}

impl SaveLink for CommandSaver {
    fn save(&mut self, url: &str, file_name: &str) -> Result<(), SaveError> {
        let args = self.expand_args(url, file_name);
        if let Err(e) = std::fs::create_dir_all(&self.directory) {
            tracing::warn!(dir = %self.directory.display(), error = %e, "could not create download directory");
        }
        tokio::process::Command::new(&self.command)
            .args(&args)
            .current_dir(&self.directory)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| SaveError::Spawn {
                command: self.command.clone(),
                source,
            })
    }
}

/// Path separators in titles would escape the download directory.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}
