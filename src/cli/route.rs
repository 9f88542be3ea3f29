//! CLI route: single route table and run context. Dispatches to the thread
//! store and content cache, then to presentation.

use crate::cas::{BlobFetcher, ContentCache};
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_heads_text, format_thread_text, HeadRow, ThreadEntry};
use crate::config::{ConfigLoader, FrameviewConfig};
use crate::error::{ApiError, FetchError};
use crate::frame::{pump, FrameSource, NdjsonFrameSource};
use crate::store::ThreadStore;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config, store, and cache.
pub struct RunContext {
    config: FrameviewConfig,
    store: Arc<ThreadStore>,
    cache: Arc<ContentCache>,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        cas_url: Option<String>,
        color: bool,
    ) -> Result<Self, ApiError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Some(url) = cas_url {
            config.cas.base_url = url;
        }
        config.ensure_valid()?;

        let fetcher: Arc<dyn BlobFetcher> = Arc::new(config.cas.build_fetcher()?);
        Ok(Self::with_parts(config, fetcher, color))
    }

    /// Assemble a context around an existing fetcher
    pub fn with_parts(config: FrameviewConfig, fetcher: Arc<dyn BlobFetcher>, color: bool) -> Self {
        let store = Arc::new(ThreadStore::with_topic(config.store.message_topic.clone()));
        let cache = Arc::new(ContentCache::new(fetcher));
        Self {
            config,
            store,
            cache,
            color,
        }
    }

    pub fn config(&self) -> &FrameviewConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ThreadStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    /// Read an NDJSON frame stream from a file, or stdin for `-`
    pub async fn load_input(&self, input: &Path) -> Result<(), ApiError> {
        let mut source: Box<dyn FrameSource> = if input == Path::new("-") {
            Box::new(NdjsonFrameSource::new(BufReader::new(tokio::io::stdin())))
        } else {
            let file = tokio::fs::File::open(input).await?;
            Box::new(NdjsonFrameSource::new(BufReader::new(file)))
        };
        let stats = pump(source.as_mut(), &self.store).await?;
        info!(
            input = %input.display(),
            stored = stats.stored,
            ignored = stats.ignored,
            "Loaded frame stream"
        );
        Ok(())
    }

    /// Whether the command reads the frame stream
    pub fn needs_input(command: &Commands) -> bool {
        !matches!(command, Commands::Cat { .. })
    }

    async fn resolve(&self, hash: &str) -> Result<Arc<str>, FetchError> {
        if hash.is_empty() {
            return Err(FetchError::NotFound(String::new()));
        }
        self.cache.get(hash).await
    }

    /// Execute a command against the loaded store
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(frames = self.store.len(), "Executing command");
        match command {
            Commands::Heads { format } => self.heads(*format).await,
            Commands::Thread { head_id, format } => {
                let head_id = match head_id {
                    Some(id) => id.clone(),
                    None => match self.store.list_heads().into_iter().next() {
                        Some(id) => id,
                        None => return Ok("No threads.".to_string()),
                    },
                };
                self.thread(&head_id, *format).await
            }
            Commands::Frame { id } => {
                let frame = self
                    .store
                    .get_frame(id)
                    .ok_or_else(|| ApiError::FrameNotFound(id.clone()))?;
                Ok(serde_json::to_string_pretty(frame.as_ref())?)
            }
            Commands::Cat { hash } => Ok(self.resolve(hash).await?.to_string()),
        }
    }

    async fn heads(&self, format: OutputFormat) -> Result<String, ApiError> {
        let heads: Vec<_> = self
            .store
            .list_heads()
            .into_iter()
            .filter_map(|id| self.store.get_frame(&id))
            .collect();
        let contents = join_all(heads.iter().map(|frame| self.resolve(&frame.hash))).await;

        let rows: Vec<HeadRow> = heads
            .iter()
            .zip(contents)
            .map(|(frame, content)| HeadRow::new(frame.id.clone(), frame.meta.role.clone(), content))
            .collect();

        match format {
            OutputFormat::Text => Ok(format_heads_text(&rows, self.color)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        }
    }

    async fn thread(&self, head_id: &str, format: OutputFormat) -> Result<String, ApiError> {
        let thread = self.store.reconstruct_thread(head_id);
        if thread.is_empty() {
            return Err(ApiError::FrameNotFound(head_id.to_string()));
        }
        let contents = join_all(thread.iter().map(|frame| self.resolve(&frame.hash))).await;

        let entries: Vec<ThreadEntry> = thread
            .iter()
            .zip(contents)
            .map(|(frame, content)| {
                ThreadEntry::new(
                    frame.id.clone(),
                    frame.meta.role.clone(),
                    frame.hash.clone(),
                    content,
                )
            })
            .collect();

        match format {
            OutputFormat::Text => Ok(format_thread_text(head_id, &entries, self.color)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
        }
    }
}
