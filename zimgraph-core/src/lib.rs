pub mod build;
pub mod classify;
pub mod error;
pub mod links;
pub mod model;
pub mod navigate;
pub mod report;
pub mod search;
pub mod session;
pub mod views;

pub use build::{BuildProgressCallback, GraphBuilder, GraphConfig};
pub use error::GraphError;
pub use model::{LinkGraph, Node, NodeKind};
pub use navigate::{ArticleDetail, Listing, ListingGroup, NodeLabel};
pub use search::Resolution;
pub use session::{Session, SessionConfig, SessionStats};
pub use views::{GraphViews, View};
