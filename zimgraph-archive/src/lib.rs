pub mod entry;
pub mod error;
pub mod memory;
pub mod reader;
pub mod search;
pub mod zim;

pub use entry::{Entry, EntryKind};
pub use error::ArchiveError;
pub use memory::{MemoryArchive, MemorySource};
pub use reader::{Archive, ArchiveSource};
pub use zim::{ZimArchive, ZimSource};
