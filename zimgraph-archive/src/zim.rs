//! Reader for the openZIM file format.
//!
//! Only the parts needed to walk entries and fetch their content are decoded:
//! the header, the MIME type list, the URL pointer list, directory entries and
//! clusters. The embedded Xapian full-text index is not read; [`Archive::search`]
//! falls back to a title scan.

use crate::entry::{Entry, EntryKind};
use crate::error::{ArchiveError, Result};
use crate::reader::{Archive, ArchiveSource};
use crate::search::scan_titles;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub const ZIM_MAGIC: u32 = 0x044D_495A;
pub const HEADER_LEN: usize = 80;

const NO_MAIN_PAGE: u32 = u32::MAX;
const MIME_REDIRECT: u16 = 0xffff;
const MIME_LINK_TARGET: u16 = 0xfffe;
const MIME_DELETED: u16 = 0xfffd;

const COMPRESSION_MASK: u8 = 0x0f;
const EXTENDED_OFFSETS: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZimHeader {
    pub major_version: u16,
    pub minor_version: u16,
    pub entry_count: u32,
    pub cluster_count: u32,
    pub url_ptr_pos: u64,
    pub title_ptr_pos: u64,
    pub cluster_ptr_pos: u64,
    pub mime_list_pos: u64,
    pub main_page: Option<u32>,
    pub checksum_pos: u64,
}

impl ZimHeader {
    pub fn parse(buf: &[u8; HEADER_LEN]) -> Result<Self> {
        let magic = le_u32(buf, 0);
        if magic != ZIM_MAGIC {
            return Err(ArchiveError::BadMagic(magic));
        }

        let main_page = le_u32(buf, 64);
        Ok(Self {
            major_version: le_u16(buf, 4),
            minor_version: le_u16(buf, 6),
            entry_count: le_u32(buf, 24),
            cluster_count: le_u32(buf, 28),
            url_ptr_pos: le_u64(buf, 32),
            title_ptr_pos: le_u64(buf, 40),
            cluster_ptr_pos: le_u64(buf, 48),
            mime_list_pos: le_u64(buf, 56),
            main_page: (main_page != NO_MAIN_PAGE).then_some(main_page),
            checksum_pos: le_u64(buf, 72),
        })
    }

    /// Archives from format 6.1 on keep all user content in namespace `C`
    /// and address it without a namespace prefix.
    pub fn uses_content_namespace(&self) -> bool {
        self.major_version >= 6 && self.minor_version >= 1
    }
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(bytes)
}

fn le_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

fn read_cstring<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_until(0, &mut bytes)?;
    if bytes.last() == Some(&0) {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_mime_list<R: BufRead>(reader: &mut R) -> Result<Vec<String>> {
    let mut mime_types = Vec::new();
    loop {
        let mime = read_cstring(reader)?;
        if mime.is_empty() {
            return Ok(mime_types);
        }
        mime_types.push(mime);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DirentTarget {
    Redirect(u32),
    Blob { cluster: u32, blob: u32 },
    Nothing,
}

#[derive(Debug, Clone)]
struct Dirent {
    mime: u16,
    namespace: char,
    target: DirentTarget,
    url: String,
    title: String,
}

#[derive(Debug)]
struct ClusterData {
    extended: bool,
    data: Vec<u8>,
}

impl ClusterData {
    fn offset(&self, slot: usize) -> Option<usize> {
        let width = if self.extended { 8 } else { 4 };
        let start = slot * width;
        let bytes = self.data.get(start..start + width)?;
        let value = if self.extended {
            le_u64(bytes, 0)
        } else {
            le_u32(bytes, 0) as u64
        };
        usize::try_from(value).ok()
    }

    fn blob(&self, cluster: u32, blob: u32) -> Result<Vec<u8>> {
        let out_of_range = || ArchiveError::BlobOutOfRange { cluster, blob };
        let width = if self.extended { 8 } else { 4 };
        let slots = self.offset(0).ok_or_else(out_of_range)? / width;
        let blob = blob as usize;
        if blob + 1 >= slots {
            return Err(out_of_range());
        }

        let start = self.offset(blob).ok_or_else(out_of_range)?;
        let end = self.offset(blob + 1).ok_or_else(out_of_range)?;
        self.data
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(out_of_range)
    }
}

/// An opened ZIM file.
pub struct ZimArchive {
    path: PathBuf,
    header: ZimHeader,
    mime_types: Vec<String>,
    file: Mutex<File>,
    // Consecutive entries usually share a cluster, so the last one is kept.
    last_cluster: Mutex<Option<(u32, Arc<ClusterData>)>>,
}

impl ZimArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let mut buf = [0u8; HEADER_LEN];
        file.read_exact(&mut buf)?;
        let header = ZimHeader::parse(&buf)?;

        file.seek(SeekFrom::Start(header.mime_list_pos))?;
        let mime_types = read_mime_list(&mut BufReader::new(&mut file))?;

        debug!(
            "Opened {} (v{}.{}, {} entries, {} clusters)",
            path.display(),
            header.major_version,
            header.minor_version,
            header.entry_count,
            header.cluster_count
        );

        Ok(Self {
            path,
            header,
            mime_types,
            file: Mutex::new(file),
            last_cluster: Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &ZimHeader {
        &self.header
    }

    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    fn lock_file(&self) -> MutexGuard<'_, File> {
        // A poisoned lock still guards a usable file handle.
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_at(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        let mut file = self.lock_file();
        file.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u64_at(&self, pos: u64) -> Result<u64> {
        let buf = self.read_at(pos, 8)?;
        Ok(le_u64(&buf, 0))
    }

    fn read_dirent(&self, index: u32) -> Result<Dirent> {
        if index >= self.header.entry_count {
            return Err(ArchiveError::EntryOutOfRange {
                index,
                count: self.header.entry_count,
            });
        }
        let offset = self.read_u64_at(self.header.url_ptr_pos + 8 * index as u64)?;

        let mut file = self.lock_file();
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut *file);

        let mut fixed = [0u8; 8];
        reader.read_exact(&mut fixed)?;
        let mime = le_u16(&fixed, 0);
        let namespace = fixed[3] as char;

        let target = match mime {
            MIME_REDIRECT => {
                let mut redirect = [0u8; 4];
                reader.read_exact(&mut redirect)?;
                DirentTarget::Redirect(le_u32(&redirect, 0))
            }
            MIME_LINK_TARGET | MIME_DELETED => DirentTarget::Nothing,
            _ => {
                let mut location = [0u8; 8];
                reader.read_exact(&mut location)?;
                DirentTarget::Blob {
                    cluster: le_u32(&location, 0),
                    blob: le_u32(&location, 4),
                }
            }
        };

        let url = read_cstring(&mut reader)?;
        let title = read_cstring(&mut reader)?;

        Ok(Dirent {
            mime,
            namespace,
            target,
            url,
            title,
        })
    }

    fn entry_path(&self, dirent: &Dirent) -> String {
        if self.header.uses_content_namespace() && dirent.namespace == 'C' {
            dirent.url.clone()
        } else {
            format!("{}/{}", dirent.namespace, dirent.url)
        }
    }

    fn cluster_end(&self, index: u32) -> Result<u64> {
        if index + 1 < self.header.cluster_count {
            return self.read_u64_at(self.header.cluster_ptr_pos + 8 * (index as u64 + 1));
        }
        let file_len = self.lock_file().metadata()?.len();
        if self.header.checksum_pos > 0 && self.header.checksum_pos <= file_len {
            Ok(self.header.checksum_pos)
        } else {
            Ok(file_len)
        }
    }

    fn load_cluster(&self, index: u32) -> Result<ClusterData> {
        if index >= self.header.cluster_count {
            return Err(ArchiveError::ClusterOutOfRange {
                index,
                count: self.header.cluster_count,
            });
        }

        let start = self.read_u64_at(self.header.cluster_ptr_pos + 8 * index as u64)?;
        let end = self.cluster_end(index)?;
        if end <= start {
            return Err(ArchiveError::ParseError(format!(
                "cluster {} has invalid bounds {}..{}",
                index, start, end
            )));
        }
        let raw = self.read_at(start, (end - start) as usize)?;

        let info = raw[0];
        let body = &raw[1..];
        let data = match info & COMPRESSION_MASK {
            0 | 1 => body.to_vec(),
            4 => {
                let mut out = Vec::new();
                xz2::read::XzDecoder::new(body).read_to_end(&mut out)?;
                out
            }
            5 => zstd::stream::decode_all(body)?,
            other => return Err(ArchiveError::UnsupportedCompression(other)),
        };

        Ok(ClusterData {
            extended: info & EXTENDED_OFFSETS != 0,
            data,
        })
    }

    fn cluster(&self, index: u32) -> Result<Arc<ClusterData>> {
        let mut last = self
            .last_cluster
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached, data)) = last.as_ref()
            && *cached == index
        {
            return Ok(data.clone());
        }

        let data = Arc::new(self.load_cluster(index)?);
        *last = Some((index, data.clone()));
        Ok(data)
    }
}

impl Archive for ZimArchive {
    fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    fn entry(&self, index: u32) -> Result<Entry> {
        let dirent = self.read_dirent(index)?;
        let path = self.entry_path(&dirent);
        let kind = match dirent.target {
            DirentTarget::Redirect(target) => EntryKind::Redirect { target },
            DirentTarget::Nothing => EntryKind::Placeholder,
            DirentTarget::Blob { .. } => {
                let mimetype = self
                    .mime_types
                    .get(dirent.mime as usize)
                    .cloned()
                    .ok_or_else(|| {
                        ArchiveError::ParseError(format!(
                            "entry {} references unknown MIME type {}",
                            index, dirent.mime
                        ))
                    })?;
                EntryKind::Item { mimetype }
            }
        };
        let title = if dirent.title.is_empty() {
            dirent.url
        } else {
            dirent.title
        };

        Ok(Entry {
            index,
            path,
            title,
            kind,
        })
    }

    fn main_entry(&self) -> Result<Option<Entry>> {
        self.header.main_page.map(|index| self.entry(index)).transpose()
    }

    fn content(&self, index: u32) -> Result<Vec<u8>> {
        match self.read_dirent(index)?.target {
            DirentTarget::Blob { cluster, blob } => self.cluster(cluster)?.blob(cluster, blob),
            _ => Err(ArchiveError::NoContent(index)),
        }
    }

    fn search(&self, query: &str, start: usize, count: usize) -> Result<Vec<String>> {
        scan_titles(self, query, start, count)
    }
}

/// Opens a ZIM file by path; every call yields an independent file handle.
#[derive(Debug, Clone)]
pub struct ZimSource {
    path: PathBuf,
}

impl ZimSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveSource for ZimSource {
    type Archive = ZimArchive;

    fn open(&self) -> Result<ZimArchive> {
        ZimArchive::open(&self.path)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
