// crates/catalog/src/view.rs
//! Snapshot of what the collection screen shows

use libris_core::{page_list, Book, BookId, BookQuery};

/// The modal dialogs the controller tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Add,
    Edit,
    Delete,
}

/// Collection view state, owned by the controller and published as snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionView {
    /// Books on the current page, in the order last applied
    pub items: Vec<Book>,
    /// Number of books matching the query across all pages
    pub total: u64,
    /// A fetch is in flight
    pub loading: bool,
    /// User-facing message for the last failure
    pub error: Option<String>,
    /// Book targeted by the edit or delete dialog
    pub selected: Option<Book>,
    pub add_open: bool,
    pub edit_open: bool,
    pub delete_open: bool,
    /// A create, update or delete is in flight
    pub busy: bool,
    /// Query the items were (or are being) fetched for
    pub query: BookQuery,
}

impl CollectionView {
    /// Empty view for `query`
    pub fn new(query: BookQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            selected: None,
            add_open: false,
            edit_open: false,
            delete_open: false,
            busy: false,
            query,
        }
    }

    pub fn is_dialog_open(&self, kind: DialogKind) -> bool {
        match kind {
            DialogKind::Add => self.add_open,
            DialogKind::Edit => self.edit_open,
            DialogKind::Delete => self.delete_open,
        }
    }

    /// Number of pages for the current total
    pub fn total_pages(&self) -> u32 {
        self.query.total_pages(self.total)
    }

    /// Page buttons to render; `ELLIPSIS` marks a gap
    pub fn page_numbers(&self) -> Vec<u32> {
        page_list(self.query.page(), self.total_pages())
    }

    pub fn find(&self, id: BookId) -> Option<&Book> {
        self.items.iter().find(|book| book.id == id)
    }
}

impl Default for CollectionView {
    fn default() -> Self {
        Self::new(BookQuery::default())
    }
}
