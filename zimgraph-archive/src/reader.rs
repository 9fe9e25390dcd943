use crate::entry::Entry;
use crate::error::Result;

/// Read access to an opened archive.
///
/// A handle is not required to be shareable between threads; callers that
/// fan out work open one handle per worker through an [`ArchiveSource`].
pub trait Archive: Send {
    /// Number of directory entries, including redirects and metadata.
    fn entry_count(&self) -> u32;

    fn entry(&self, index: u32) -> Result<Entry>;

    /// The archive's designated main entry, if it declares one.
    fn main_entry(&self) -> Result<Option<Entry>>;

    /// Raw content bytes of an item entry.
    fn content(&self, index: u32) -> Result<Vec<u8>>;

    /// Full-text search, returning the paths of results `start..start + count`.
    /// An empty page means there are no further results.
    fn search(&self, query: &str, start: usize, count: usize) -> Result<Vec<String>>;
}

/// Something that can open independent [`Archive`] handles.
pub trait ArchiveSource: Send + Sync + 'static {
    type Archive: Archive;

    fn open(&self) -> Result<Self::Archive>;

    /// Human readable location, used in logs.
    fn location(&self) -> String;
}
