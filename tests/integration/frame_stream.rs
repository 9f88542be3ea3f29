//! Integration tests for feeding an NDJSON frame stream into the store

use async_trait::async_trait;
use frameview::error::StreamError;
use frameview::frame::{pump, Frame, FrameSource, NdjsonFrameSource, PumpStats};
use frameview::store::ThreadStore;
use std::collections::VecDeque;
use tempfile::TempDir;
use tokio::io::BufReader;

const CONVERSATION: &str = r#"{"id":"03d4a","topic":"message","hash":"sha256-q1","meta":{"role":"user"}}
{"id":"03d4b","topic":"message","hash":"sha256-a1","meta":{"role":"assistant","continues":"03d4a"}}
{"id":"03d4c","topic":"presence"}
{"id":"03d4d","topic":"message","hash":"sha256-q2","meta":{"role":"user","continues":"03d4b"}}
{"id":"03d4e","topic":"message","hash":"sha256-x1","meta":{"role":"user"}}
"#;

#[tokio::test]
async fn test_pump_file_into_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frames.ndjson");
    std::fs::write(&path, CONVERSATION).unwrap();

    let file = tokio::fs::File::open(&path).await.unwrap();
    let mut source = NdjsonFrameSource::new(BufReader::new(file));
    let store = ThreadStore::new();

    let stats = pump(&mut source, &store).await.unwrap();
    assert_eq!(stats, PumpStats { stored: 4, ignored: 1 });
    assert_eq!(store.list_heads(), vec!["03d4e", "03d4d"]);

    let thread: Vec<_> = store
        .reconstruct_thread("03d4d")
        .iter()
        .map(|f| f.meta.role.clone().unwrap_or_default())
        .collect();
    assert_eq!(thread, vec!["user", "assistant", "user"]);
}

#[tokio::test]
async fn test_malformed_lines_do_not_end_stream() {
    let input = "{\"id\":\"a\",\"topic\":\"message\"}\n{broken\n\n{\"id\":\"b\",\"topic\":\"message\",\"meta\":{\"continues\":\"a\"}}\n";
    let mut source = NdjsonFrameSource::new(BufReader::new(input.as_bytes()));
    let store = ThreadStore::new();

    let stats = pump(&mut source, &store).await.unwrap();
    assert_eq!(stats.stored, 2);
    assert_eq!(source.skipped(), 1);
    assert_eq!(store.list_heads(), vec!["b"]);
}

struct ScriptedSource {
    frames: VecDeque<Frame>,
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, StreamError> {
        Ok(self.frames.pop_front())
    }
}

#[tokio::test]
async fn test_pump_accepts_any_source() {
    let mut source: Box<dyn FrameSource> = Box::new(ScriptedSource {
        frames: VecDeque::from(vec![
            Frame::new("1", "message", "h1"),
            Frame::new("", "message", "h-empty"),
            Frame::new("2", "message", "h2").continuing("1"),
        ]),
    });
    let store = ThreadStore::new();

    let stats = pump(source.as_mut(), &store).await.unwrap();
    assert_eq!(stats, PumpStats { stored: 2, ignored: 1 });
    assert_eq!(store.list_heads(), vec!["2"]);
}
