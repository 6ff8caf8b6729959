use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Path of the catalog resource relative to the configured base URL.
pub const CATALOG_PATH: &str = "/video/movies.json";

/// Sample catalog compiled into the binary (`--demo`).
const BUNDLED_CATALOG: &str = include_str!("../assets/movies.json");

/// A single movie as listed in `movies.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "video")]
    pub video_url: String,
    #[serde(rename = "poster")]
    pub poster_url: String,
    #[serde(rename = "duration", default, skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// Where the catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Remote(String),
    File(PathBuf),
    Bundled,
}

impl CatalogSource {
    /// The standard location under a site base URL.
    pub fn from_base_url(base_url: &str) -> Self {
        Self::Remote(format!("{}{}", base_url.trim_end_matches('/'), CATALOG_PATH))
    }

    /// Interpret a `--catalog` argument: anything with a scheme is fetched,
    /// everything else is a local path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Remote(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
            Self::Bundled => "bundled sample catalog".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog request returned HTTP {status}")]
    Status { status: u16 },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Http(e) => format!("Network error: {}", e),
            CatalogError::Status { status } => format!("Catalog server answered {}", status),
            CatalogError::Io { path, source } => {
                format!("Could not read {}: {}", path.display(), source)
            }
            CatalogError::Parse(e) => format!("Catalog is not a movie list: {}", e),
        }
    }
}

/// Parse a JSON array of movie records.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<MovieRecord>, CatalogError> {
    let movies: Vec<MovieRecord> = serde_json::from_slice(bytes)?;
    warn_duplicate_ids(&movies);
    Ok(movies)
}

fn warn_duplicate_ids(movies: &[MovieRecord]) {
    let mut seen = HashSet::new();
    for movie in movies {
        if !seen.insert(movie.id.as_str()) {
            tracing::warn!(id = %movie.id, "duplicate movie id in catalog");
        }
    }
}

/// Retrieve the catalog once from `source`.
pub async fn load(source: &CatalogSource) -> Result<Vec<MovieRecord>, CatalogError> {
    match source {
        CatalogSource::Remote(url) => fetch_remote(url).await,
        CatalogSource::File(path) => read_file(path).await,
        CatalogSource::Bundled => parse_catalog(BUNDLED_CATALOG.as_bytes()),
    }
}

async fn fetch_remote(url: &str) -> Result<Vec<MovieRecord>, CatalogError> {
    fetch_with(&reqwest::Client::new(), url).await
}

async fn fetch_with(client: &reqwest::Client, url: &str) -> Result<Vec<MovieRecord>, CatalogError> {
    tracing::debug!(%url, "fetching catalog");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status { status: status.as_u16() });
    }
    let body = response.bytes().await?;
    parse_catalog(&body)
}

async fn read_file(path: &Path) -> Result<Vec<MovieRecord>, CatalogError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&bytes)
}

#[cfg(test)]
pub(crate) fn sample(id: &str, title: &str, genre: Option<&str>) -> MovieRecord {
    MovieRecord {
        id: id.to_string(),
        title: title.to_string(),
        video_url: format!("https://media.example/{}.mp4", id),
        poster_url: format!("https://media.example/{}.jpg", id),
        duration_label: None,
        genre: genre.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::sync::oneshot;

    #[test]
    fn test_parse_uses_wire_field_names() {
        let json = r#"[{"id":"1","title":"Inception","video":"v.mp4","poster":"p.jpg","duration":"2h 28m","genre":"Sci-Fi"}]"#;
        let movies = parse_catalog(json.as_bytes()).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].video_url, "v.mp4");
        assert_eq!(movies[0].poster_url, "p.jpg");
        assert_eq!(movies[0].duration_label.as_deref(), Some("2h 28m"));
        assert_eq!(movies[0].genre.as_deref(), Some("Sci-Fi"));
    }

    #[test]
    fn test_parse_optional_fields_absent() {
        let json = r#"[{"id":"7","title":"Untitled","video":"v","poster":"p","extra":42}]"#;
        let movies = parse_catalog(json.as_bytes()).unwrap();
        assert!(movies[0].duration_label.is_none());
        assert!(movies[0].genre.is_none());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_catalog(br#"{"movies":[]}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.user_message().contains("not a movie list"));
    }

    #[test]
    fn test_parse_rejects_missing_title() {
        let json = r#"[{"id":"1","video":"v","poster":"p"}]"#;
        assert!(parse_catalog(json.as_bytes()).is_err());
    }

    #[test]
    fn test_source_from_base_url() {
        assert_eq!(
            CatalogSource::from_base_url("http://localhost:5173/"),
            CatalogSource::Remote("http://localhost:5173/video/movies.json".to_string())
        );
    }

    #[test]
    fn test_source_from_arg() {
        assert!(matches!(
            CatalogSource::from_arg("https://cdn.example/movies.json"),
            CatalogSource::Remote(_)
        ));
        assert_eq!(
            CatalogSource::from_arg("./movies.json"),
            CatalogSource::File(PathBuf::from("./movies.json"))
        );
    }

    #[tokio::test]
    async fn test_load_bundled_catalog() {
        let movies = load(&CatalogSource::Bundled).await.unwrap();
        assert_eq!(movies.len(), 6);
        assert_eq!(movies[0].title, "Inception");
        assert!(movies.iter().all(|m| m.genre.is_some()));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"a","title":"Alpha","video":"a.mp4","poster":"a.jpg"}}]"#
        )
        .unwrap();
        let source = CatalogSource::File(file.path().to_path_buf());
        let movies = load(&source).await.unwrap();
        assert_eq!(movies[0].id, "a");
    }

    /// Answer a single HTTP request with `status_line` and `body`; yields the request line.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).await.unwrap() == 0 || header == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request_line.trim_end().to_string());
        });
        (base_url, rx)
    }

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn remote_url(base_url: &str) -> String {
        match CatalogSource::from_base_url(base_url) {
            CatalogSource::Remote(url) => url,
            other => panic!("expected a remote source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_remote_catalog() {
        let (base_url, request) = serve_once(
            "200 OK",
            r#"[{"id":"1","title":"Inception","video":"v.mp4","poster":"p.jpg","genre":"Sci-Fi"}]"#,
        )
        .await;
        let movies = fetch_with(&test_client(), &remote_url(&base_url)).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Inception");
        assert_eq!(request.await.unwrap(), "GET /video/movies.json HTTP/1.1");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let (base_url, _request) = serve_once("404 Not Found", "missing").await;
        let err = fetch_with(&test_client(), &remote_url(&base_url)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404 }));
        assert!(err.user_message().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_parse_error() {
        let (base_url, _request) = serve_once("200 OK", r#"{"movies":[]}"#).await;
        let err = fetch_with(&test_client(), &remote_url(&base_url)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::File(dir.path().join("nope.json"));
        let err = load(&source).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
