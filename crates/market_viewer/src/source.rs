//! Market snapshots read from a JSON file on a background thread.

use market_scene::{parse_entities, EntityRecord, FetchError};
use std::path::{Path, PathBuf};
use std::{fs, thread, time::Duration};

/// Events posted into the window event loop from worker threads.
#[derive(Debug)]
pub enum ViewerEvent {
    Snapshot(Result<Vec<EntityRecord>, FetchError>),
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and validates the whole file. A missing or unreadable file is a
    /// transport failure; bad JSON or an invalid record rejects the payload.
    pub fn fetch(&self) -> Result<Vec<EntityRecord>, FetchError> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| FetchError::Transport(format!("{}: {e}", self.path.display())))?;
        parse_entities(&json)
    }
}

/// Fetches once, then every `refresh` if set, handing each result to `sink`.
/// Stops when `sink` returns `false` (the receiving side is gone).
pub fn spawn_source<F>(
    source: JsonFileSource,
    refresh: Option<Duration>,
    mut sink: F,
) -> thread::JoinHandle<()>
where
    F: FnMut(ViewerEvent) -> bool + Send + 'static,
{
    thread::spawn(move || loop {
        let result = source.fetch();
        match &result {
            Ok(entities) => log::info!(
                "Fetched {} entities from {}",
                entities.len(),
                source.path().display()
            ),
            Err(e) => log::warn!("Fetch from {} failed: {}", source.path().display(), e),
        }

        if !sink(ViewerEvent::Snapshot(result)) {
            log::debug!("Snapshot receiver closed; source thread exiting");
            break;
        }

        match refresh {
            Some(interval) => thread::sleep(interval),
            None => break,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "market_viewer_{}_{}.json",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn fetch_reads_records() {
        let path = temp_file(
            "ok",
            r#"[{"name": "Bitcoin", "symbol": "btc", "current_price": 64000.0}]"#,
        );
        let entities = JsonFileSource::new(&path).fetch().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].price, 64000.0);
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_a_transport_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(source.fetch(), Err(FetchError::Transport(_))));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let path = temp_file("bad", r#"{"name": "not an array"}"#);
        assert!(matches!(
            JsonFileSource::new(&path).fetch(),
            Err(FetchError::Malformed(_))
        ));
        fs::remove_file(path).ok();
    }

    #[test]
    fn one_shot_source_sends_exactly_one_snapshot() {
        let path = temp_file("once", "[]");
        let (tx, rx) = mpsc::channel();
        let handle = spawn_source(JsonFileSource::new(&path), None, move |event| {
            tx.send(event).is_ok()
        });
        handle.join().unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ViewerEvent::Snapshot(Ok(list)) if list.is_empty()));
        fs::remove_file(path).ok();
    }

    #[test]
    fn refreshing_source_stops_when_receiver_is_gone() {
        let path = temp_file("refresh", "[]");
        let mut delivered = 0;
        let handle = spawn_source(
            JsonFileSource::new(&path),
            Some(Duration::from_millis(1)),
            move |_| {
                delivered += 1;
                delivered < 3
            },
        );
        handle.join().unwrap();
        fs::remove_file(path).ok();
    }
}
