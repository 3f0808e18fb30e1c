//! Keeps the state of the directory list page.
//!
//! A [DirectoryView] remembers the current search term, sort order and page. Changing the search
//! or the sort order jumps back to the first page, as the previous page number would most
//! probably be meaningless for the new result. Rendering is a pure function of this state and a
//! [Batch].
//!
//! # Example
//! ```
//! # use roster::batch::Batch;
//! # use roster::view::DirectoryView;
//! # use serde_json::json;
//! let rows: Vec<_> = (1..=23).map(|id| json!({ "name": format!("P{:02}", id), "id": id })).collect();
//! let batch = Batch::from_payload(&json!(rows));
//!
//! let mut view = DirectoryView::default();
//! view.set_page(3);
//! let page = view.render(&batch);
//! assert_eq!(page.page.items().len(), 3);
//! assert_eq!(page.page.page_count(), 3);
//!
//! view.set_search("p1");
//! assert_eq!(view.page(), 1);
//! assert_eq!(view.render(&batch).page.total(), 10);
//! ```
use crate::batch::Batch;
use crate::query::{
    columns, page_window, paginate, search, sort, Page, PageWindow, SortSpec, PAGE_SIZE,
};
use crate::record::Record;

/// Contains everything required to render a page of the directory list.
#[derive(Debug, Clone)]
pub struct ListPage<'a> {
    /// The columns to show.
    pub columns: Vec<String>,

    /// The records on the current page.
    pub page: Page<&'a Record>,

    /// The pagination controls or `None` if everything fits on a single page.
    pub window: Option<PageWindow>,
}

/// Represents the search, sort and pagination state of the directory list.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView {
    search: String,
    sort: SortSpec,
    page: usize,
    page_size: usize,
}

impl Default for DirectoryView {
    fn default() -> Self {
        DirectoryView::new(PAGE_SIZE)
    }
}

impl DirectoryView {
    /// Creates a new view which shows the given number of records per page.
    pub fn new(page_size: usize) -> Self {
        DirectoryView {
            search: String::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size,
        }
    }

    /// Returns the current search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns the current sort order.
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Returns the current page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the number of records per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changes the search term and jumps to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Sorts by the given key (keeping the direction) and jumps to the first page.
    pub fn set_sort_key(&mut self, key: impl Into<String>) {
        self.sort.key = key.into();
        self.page = 1;
    }

    /// Toggles the sort order as if the column header of the given key was clicked.
    ///
    /// See [SortSpec::toggle] for the exact semantics. Jumps to the first page.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
        self.page = 1;
    }

    /// Inverts the sort direction while staying on the current page.
    pub fn flip_direction(&mut self) {
        self.sort.direction = self.sort.direction.flip();
    }

    /// Jumps to the given page.
    ///
    /// The page isn't validated here, an out of range page simply renders as empty page.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Runs search, sort and pagination for the given batch.
    pub fn render<'a>(&self, batch: &'a Batch) -> ListPage<'a> {
        let matches = search(batch.records(), &self.search);
        let sorted = sort(matches, &self.sort, batch.roles());
        let page = paginate(&sorted, self.page, self.page_size);
        let window = page_window(self.page, page.page_count());

        ListPage {
            columns: columns(batch.records()),
            page,
            window,
        }
    }
}
