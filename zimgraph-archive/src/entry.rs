/// What an archive entry points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Alias for another entry, identified by its index.
    Redirect { target: u32 },
    /// Entry backed by a content blob of the given MIME type.
    Item { mimetype: String },
    /// Link-target or deleted entry: has a path but neither content nor target.
    Placeholder,
}

/// One directory entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub index: u32,
    pub path: String,
    pub title: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn item(index: u32, path: impl Into<String>, title: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self {
            index,
            path: path.into(),
            title: title.into(),
            kind: EntryKind::Item {
                mimetype: mimetype.into(),
            },
        }
    }

    pub fn redirect(index: u32, path: impl Into<String>, title: impl Into<String>, target: u32) -> Self {
        Self {
            index,
            path: path.into(),
            title: title.into(),
            kind: EntryKind::Redirect { target },
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.kind, EntryKind::Redirect { .. })
    }

    pub fn redirect_target(&self) -> Option<u32> {
        match self.kind {
            EntryKind::Redirect { target } => Some(target),
            _ => None,
        }
    }

    pub fn mimetype(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Item { mimetype } => Some(mimetype),
            _ => None,
        }
    }

    /// True for `text/html` items, ignoring any `; charset=...` parameters.
    pub fn is_html(&self) -> bool {
        self.mimetype()
            .map(|mt| mt.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("text/html"))
            .unwrap_or(false)
    }
}
