use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Not a ZIM archive (magic number {0:#010x})")]
    BadMagic(u32),

    #[error("Entry index {index} out of range (archive has {count} entries)")]
    EntryOutOfRange { index: u32, count: u32 },

    #[error("Cluster index {index} out of range (archive has {count} clusters)")]
    ClusterOutOfRange { index: u32, count: u32 },

    #[error("Blob {blob} out of range in cluster {cluster}")]
    BlobOutOfRange { cluster: u32, blob: u32 },

    #[error("Unsupported cluster compression type {0}")]
    UnsupportedCompression(u8),

    #[error("Entry {0} has no content")]
    NoContent(u32),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
