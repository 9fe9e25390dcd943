// Parallel construction of the full link graph

use crate::classify::classify_entry;
use crate::error::{GraphError, Result};
use crate::model::{DEFAULT_CATEGORY_PREFIX, LinkGraph};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info};
use zimgraph_archive::{Archive, ArchiveSource};

/// Number of entry identifiers handed to one worker at a time.
pub const CHUNK_SIZE: usize = 500;

/// Options for building a link graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    pub chunk_size: usize,
    pub workers: usize,
    pub category_prefix: String,
}

impl GraphConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(GraphError::Config("chunk size must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(GraphError::Config("worker count must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            workers: default_workers(),
            category_prefix: DEFAULT_CATEGORY_PREFIX.to_string(),
        }
    }
}

/// One worker per available core.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Callback for reporting build progress as `(chunks_completed, chunks_total)`
pub type BuildProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Split `0..count` into chunks of `chunk_size` identifiers. The last chunk is
/// padded with `None` so every chunk has the same length. A chunk size larger
/// than the archive yields a single unpadded chunk.
pub fn chunk_ids(count: u32, chunk_size: usize) -> Vec<Vec<Option<u32>>> {
    if chunk_size == 0 || count == 0 {
        return Vec::new();
    }
    let width = chunk_size.min(count as usize);
    let ids: Vec<u32> = (0..count).collect();
    ids.chunks(width)
        .map(|chunk| {
            let mut padded: Vec<Option<u32>> = chunk.iter().copied().map(Some).collect();
            padded.resize(width, None);
            padded
        })
        .collect()
}

/// Classify the entries of one chunk into a self-contained graph, through a
/// freshly opened archive handle. Padding placeholders are skipped.
pub fn process_chunk<S: ArchiveSource + ?Sized>(
    source: &S,
    chunk: &[Option<u32>],
    category_prefix: &str,
) -> Result<LinkGraph> {
    let archive = source.open()?;
    let mut graph = LinkGraph::new();

    for index in chunk.iter().flatten() {
        let entry = archive.entry(*index)?;
        classify_entry(&archive, &entry, category_prefix, &mut graph)?;
    }

    Ok(graph)
}

/// Builds the full link graph by fanning chunks out to blocking workers and
/// merging their partial graphs as they complete.
pub struct GraphBuilder<S> {
    source: Arc<S>,
    config: GraphConfig,
    progress_callback: Option<BuildProgressCallback>,
}

impl<S: ArchiveSource> GraphBuilder<S> {
    pub fn new(source: Arc<S>, config: GraphConfig) -> Self {
        Self {
            source,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: BuildProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Number of chunks a build of this archive will dispatch.
    pub fn chunk_count(&self) -> Result<usize> {
        self.config.validate()?;
        let entry_count = self.source.open()?.entry_count() as usize;
        Ok(entry_count.div_ceil(self.config.chunk_size))
    }

    pub async fn build(&self) -> Result<LinkGraph> {
        self.config.validate()?;
        let start = Instant::now();

        let entry_count = self.source.open()?.entry_count();
        let chunks = chunk_ids(entry_count, self.config.chunk_size);
        let total = chunks.len();
        info!(
            "Building link graph from {} ({} entries, {} chunks, {} workers)",
            self.source.location(),
            entry_count,
            total,
            self.config.workers
        );

        let mut pending = chunks.into_iter();
        let mut in_flight = JoinSet::new();
        let mut graph = LinkGraph::new();
        let mut completed = 0;

        loop {
            while in_flight.len() < self.config.workers {
                let Some(chunk) = pending.next() else {
                    break;
                };
                let source = self.source.clone();
                let category_prefix = self.config.category_prefix.clone();
                in_flight.spawn_blocking(move || {
                    process_chunk(source.as_ref(), &chunk, &category_prefix)
                });
            }

            // Results arrive in completion order; the merge does not care.
            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let partial = joined??;
            graph.merge(partial);

            completed += 1;
            debug!("Merged chunk {}/{}", completed, total);
            if let Some(ref callback) = self.progress_callback {
                callback(completed, total);
            }
        }

        info!(
            "Link graph complete: {} nodes, {} edges in {:.2?}",
            graph.node_count(),
            graph.edge_count(),
            start.elapsed()
        );
        Ok(graph)
    }
}
