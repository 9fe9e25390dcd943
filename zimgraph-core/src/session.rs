// One exploration session over an archive: the archive handle, the
// once-built link graph and its views

use crate::build::{BuildProgressCallback, GraphBuilder, GraphConfig};
use crate::error::{GraphError, Result};
use crate::model::GraphStats;
use crate::navigate::{ArticleDetail, Listing, article_detail, grouped_listing, resolve_root};
use crate::search::{Resolution, resolve_query};
use crate::views::GraphViews;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use zimgraph_archive::{Archive, ArchiveSource};

/// Options for an exploration session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Restrict searches and listings to category pages and their direct links.
    pub exclude_related: bool,
    pub graph: GraphConfig,
}

/// Graph counts plus the order of each view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    #[serde(flatten)]
    pub graph: GraphStats,
    pub categories: usize,
    pub all_articles: usize,
    pub category_articles: usize,
    pub exclude_related: bool,
}

pub struct Session<S: ArchiveSource> {
    source: Arc<S>,
    archive: S::Archive,
    config: SessionConfig,
    progress_callback: Option<BuildProgressCallback>,
    views: OnceCell<GraphViews>,
}

impl<S: ArchiveSource> Session<S> {
    /// Open the archive. Failing to open it is fatal; no graph work starts.
    pub fn open(source: S, config: SessionConfig) -> Result<Self> {
        config.graph.validate()?;
        let archive = source.open()?;
        debug!(
            "Opened {} with {} entries",
            source.location(),
            archive.entry_count()
        );

        Ok(Self {
            source: Arc::new(source),
            archive,
            config,
            progress_callback: None,
            views: OnceCell::new(),
        })
    }

    pub fn with_progress_callback(mut self, callback: BuildProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn archive(&self) -> &S::Archive {
        &self.archive
    }

    /// Chunks the graph build will process.
    pub fn chunk_count(&self) -> usize {
        (self.archive.entry_count() as usize).div_ceil(self.config.graph.chunk_size)
    }

    pub fn is_built(&self) -> bool {
        self.views.initialized()
    }

    /// The full graph and its views, built on first call and cached afterwards.
    pub async fn views(&self) -> Result<&GraphViews> {
        self.views
            .get_or_try_init(|| async {
                let mut builder = GraphBuilder::new(self.source.clone(), self.config.graph.clone());
                if let Some(ref callback) = self.progress_callback {
                    builder = builder.with_progress_callback(callback.clone());
                }
                let graph = builder.build().await?;
                Ok::<_, GraphError>(GraphViews::new(graph, self.config.exclude_related))
            })
            .await
    }

    /// Path of the main entry after following redirects.
    pub fn root_id(&self) -> Result<Option<String>> {
        Ok(resolve_root(&self.archive)?.map(|entry| entry.path))
    }

    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        let views = self.views().await?;
        resolve_query(&self.archive, views, query)
    }

    pub async fn article_detail(&self, id: &str) -> Result<Option<ArticleDetail>> {
        let views = self.views().await?;
        Ok(article_detail(views, id))
    }

    /// Grouped listing rooted at the main entry.
    pub async fn listing(&self) -> Result<Listing> {
        let root = self.root_id()?;
        if root.is_none() {
            warn!("Archive has no main entry; every article is uncategorized");
        }
        let views = self.views().await?;
        Ok(grouped_listing(views, root.as_deref()))
    }

    pub async fn stats(&self) -> Result<SessionStats> {
        let views = self.views().await?;
        Ok(SessionStats {
            graph: views.graph().stats(),
            categories: views.categories().order(),
            all_articles: views.all_articles().order(),
            category_articles: views.category_articles().order(),
            exclude_related: views.exclude_related(),
        })
    }
}
