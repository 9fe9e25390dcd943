// In-memory archive, used for tests and for feeding synthetic content through the pipeline

use crate::entry::Entry;
use crate::error::{ArchiveError, Result};
use crate::reader::{Archive, ArchiveSource};
use crate::search::scan_titles;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<Entry>,
    contents: HashMap<u32, Arc<Vec<u8>>>,
    main_entry: Option<u32>,
    search_calls: Arc<AtomicUsize>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_index(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Add an HTML article and return its index.
    pub fn add_article(&mut self, path: &str, title: &str, html: &str) -> u32 {
        self.add_item(path, title, "text/html", html.as_bytes().to_vec())
    }

    pub fn add_item(&mut self, path: &str, title: &str, mimetype: &str, content: Vec<u8>) -> u32 {
        let index = self.next_index();
        self.entries.push(Entry::item(index, path, title, mimetype));
        self.contents.insert(index, Arc::new(content));
        index
    }

    pub fn add_redirect(&mut self, path: &str, title: &str, target: u32) -> u32 {
        let index = self.next_index();
        self.entries.push(Entry::redirect(index, path, title, target));
        index
    }

    /// Add an entry verbatim. Items added this way have no content, so reading
    /// them fails with [`ArchiveError::NoContent`].
    pub fn add_entry(&mut self, mut entry: Entry) -> u32 {
        let index = self.next_index();
        entry.index = index;
        self.entries.push(entry);
        index
    }

    pub fn set_main_entry(&mut self, index: u32) {
        self.main_entry = Some(index);
    }

    /// Number of `search` calls made through this archive or any of its clones.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }

    pub fn into_source(self) -> MemorySource {
        MemorySource(Arc::new(self))
    }
}

impl Archive for MemoryArchive {
    fn entry_count(&self) -> u32 {
        self.entries.len() as u32
    }

    fn entry(&self, index: u32) -> Result<Entry> {
        self.entries
            .get(index as usize)
            .cloned()
            .ok_or(ArchiveError::EntryOutOfRange {
                index,
                count: self.entry_count(),
            })
    }

    fn main_entry(&self) -> Result<Option<Entry>> {
        self.main_entry.map(|index| self.entry(index)).transpose()
    }

    fn content(&self, index: u32) -> Result<Vec<u8>> {
        self.contents
            .get(&index)
            .map(|content| content.as_ref().clone())
            .ok_or(ArchiveError::NoContent(index))
    }

    fn search(&self, query: &str, start: usize, count: usize) -> Result<Vec<String>> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
        scan_titles(self, query, start, count)
    }
}

/// Opens clones of a shared [`MemoryArchive`].
#[derive(Debug, Clone)]
pub struct MemorySource(Arc<MemoryArchive>);

impl MemorySource {
    pub fn archive(&self) -> &MemoryArchive {
        &self.0
    }
}

impl ArchiveSource for MemorySource {
    type Archive = MemoryArchive;

    fn open(&self) -> Result<MemoryArchive> {
        Ok(self.0.as_ref().clone())
    }

    fn location(&self) -> String {
        format!("memory ({} entries)", self.0.entry_count())
    }
}
