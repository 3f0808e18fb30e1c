//! Provides search, sort and pagination over the records of a batch.
//!
//! All operations here are pure functions which derive a new view from their input. They never
//! modify or reorder the underlying batch, but rather operate on lists of references to its
//! records. Therefore a typical pipeline looks like this:
//!
//! ```
//! # use roster::batch::Batch;
//! # use roster::query::{paginate, search, sort, SortSpec};
//! # use serde_json::json;
//! let batch = Batch::from_payload(&json!([
//!     { "name": "Ravi", "city": "Pune" },
//!     { "name": "Asha", "city": "Pune" },
//!     { "name": "Meera", "city": "Agra" }
//! ]));
//!
//! let matches = search(batch.records(), "pune");
//! let sorted = sort(matches, &SortSpec::default(), batch.roles());
//! let page = paginate(&sorted, 1, 10);
//!
//! assert_eq!(page.total(), 2);
//! assert_eq!(page.items()[0].get("name").unwrap().to_string(), "Asha");
//! ```
//!
//! # Sorting
//! Values are compared by their lowercased string representation using the Unicode collation
//! algorithm (root locale), so that "—" sorts before letters and "éclair" sorts between "asha"
//! and "farah". If both sides start with a number (as `parseFloat` would see it), they are
//! compared numerically so that "9" sorts before "10". As this mix of numeric and textual
//! comparisons isn't necessarily a total order, we use our own stable merge sort, which yields a
//! deterministic result for any comparator.
use feruca::{Collator, Locale, Tailoring};
use std::cmp::Ordering;

use crate::record::{parse_number, Record};
use crate::schema::{resolve_field, FieldRole, RoleMap};

/// Contains the default number of records per page.
pub const PAGE_SIZE: usize = 10;

/// Contains the number of pages shown before and after the current page in a [PageWindow].
pub const PAGE_WINDOW_DELTA: usize = 2;

/// Lists the fields which are preferred as table columns (in this order).
pub const PREFERRED_COLUMNS: [&str; 7] = [
    "name",
    "salary",
    "department",
    "city",
    "email",
    "phone",
    "designation",
];

/// Contains the maximal number of table columns.
pub const MAX_COLUMNS: usize = 7;

/// Filters the given records by a case-insensitive substring search over all fields.
///
/// A record matches if the string representation of any of its fields contains the query. An
/// empty query matches all records. The order of the records is retained.
///
/// # Example
/// ```
/// # use roster::record::Record;
/// # use roster::query::search;
/// let records: Vec<Record> = vec![
///     vec![("name", "Asha"), ("city", "Pune")].into_iter().collect(),
///     vec![("name", "Ravi"), ("city", "Agra")].into_iter().collect(),
/// ];
///
/// assert_eq!(search(&records, "PUN").len(), 1);
/// assert_eq!(search(&records, "").len(), 2);
/// assert_eq!(search(&records, "delhi").len(), 0);
/// ```
pub fn search<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record
                .values()
                .any(|value| value.to_text().to_lowercase().contains(query.as_str()))
        })
        .collect()
}

/// Determines the direction of a sort.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Smallest values first.
    Ascending,

    /// Largest values first.
    Descending,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flip(self) -> Direction {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

/// Describes by which field and in which direction records are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// The name of the field to sort by.
    pub key: String,

    /// The direction to sort in.
    pub direction: Direction,
}

impl Default for SortSpec {
    /// Sorts by "name" in ascending order.
    fn default() -> Self {
        SortSpec::new("name", Direction::Ascending)
    }
}

impl SortSpec {
    /// Creates a new sort specification.
    pub fn new(key: impl Into<String>, direction: Direction) -> Self {
        SortSpec {
            key: key.into(),
            direction,
        }
    }

    /// Selects the given key just like clicking on a column header would.
    ///
    /// Selecting the current key again flips the direction, selecting another key sorts by it
    /// in ascending order.
    ///
    /// # Example
    /// ```
    /// # use roster::query::{Direction, SortSpec};
    /// let mut spec = SortSpec::default();
    ///
    /// spec.toggle("name");
    /// assert_eq!(spec.direction, Direction::Descending);
    ///
    /// spec.toggle("city");
    /// assert_eq!(spec, SortSpec::new("city", Direction::Ascending));
    /// ```
    pub fn toggle(&mut self, key: &str) {
        if self.key == key {
            self.direction = self.direction.flip();
        } else {
            self.key = key.to_owned();
            self.direction = Direction::Ascending;
        }
    }
}

/// Represents the value of a record which is used for sorting.
struct SortKey {
    text: String,
    number: Option<f64>,
}

impl SortKey {
    fn new(record: &Record, spec: &SortSpec, roles: &RoleMap) -> Self {
        let value = match record.get(&spec.key) {
            Some(value) if !value.is_empty() => value,
            _ => resolve_field(record, roles, FieldRole::DisplayName),
        };

        let text = value.to_text().to_lowercase();
        let number = parse_number(&text).filter(|number| number.is_finite());

        SortKey { text, number }
    }

    fn compare(&self, other: &SortKey, collator: &mut Collator) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => collator.collate(self.text.as_str(), other.text.as_str()),
        }
    }
}

/// Sorts the given records according to the given specification.
///
/// If a record has no value (or an empty one) for the sort key, its display name is used
/// instead. The sort is stable: records which compare as equal keep their relative order,
/// in both directions.
///
/// # Example
/// ```
/// # use roster::record::Record;
/// # use roster::query::{sort, Direction, SortSpec};
/// # use roster::schema::RoleMap;
/// let records: Vec<Record> = vec![
///     vec![("name", "b"), ("id", "10")].into_iter().collect(),
///     vec![("name", "a"), ("id", "9")].into_iter().collect(),
/// ];
///
/// let sorted = sort(records.iter().collect(), &SortSpec::new("id", Direction::Ascending), &RoleMap::default());
/// assert_eq!(sorted[0].get("id").unwrap().to_string(), "9");
/// ```
pub fn sort<'a>(records: Vec<&'a Record>, spec: &SortSpec, roles: &RoleMap) -> Vec<&'a Record> {
    let keys: Vec<SortKey> = records
        .iter()
        .map(|record| SortKey::new(record, spec, roles))
        .collect();

    let mut collator = Collator::new(Tailoring::Cldr(Locale::Root), false, true);
    let indices: Vec<usize> = (0..records.len()).collect();
    let order = merge_sort(&indices, &mut |a: usize, b: usize| {
        let ordering = keys[a].compare(&keys[b], &mut collator);
        match spec.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });

    order.into_iter().map(|index| records[index]).collect()
}

/// Sorts the given indices using a top-down merge sort.
///
/// When merging, the element of the left half is taken unless the right one is strictly less.
/// This keeps equal elements in their original order and never panics, even if the comparator
/// isn't a total order.
fn merge_sort<F>(indices: &[usize], compare: &mut F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    if indices.len() <= 1 {
        return indices.to_vec();
    }

    let (left, right) = indices.split_at(indices.len() / 2);
    let left = merge_sort(left, &mut *compare);
    let right = merge_sort(right, &mut *compare);

    let mut merged = Vec::with_capacity(indices.len());
    let mut left_pos = 0;
    let mut right_pos = 0;
    while left_pos < left.len() && right_pos < right.len() {
        if compare(right[right_pos], left[left_pos]) == Ordering::Less {
            merged.push(right[right_pos]);
            right_pos += 1;
        } else {
            merged.push(left[left_pos]);
            left_pos += 1;
        }
    }
    merged.extend_from_slice(&left[left_pos..]);
    merged.extend_from_slice(&right[right_pos..]);

    merged
}

/// Represents a single page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    number: usize,
    size: usize,
    total: usize,
}

impl<T> Page<T> {
    /// Returns the items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the (1-based) number of this page.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the maximal number of items per page.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the total number of items across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the total number of pages.
    pub fn page_count(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }

    /// Returns the 1-based positions of the first and last item on this page.
    ///
    /// This is used to render something like "Showing 11-20 of 23". An empty page yields
    /// `(0, 0)`.
    pub fn range(&self) -> (usize, usize) {
        if self.items.is_empty() {
            (0, 0)
        } else {
            let offset = (self.number - 1) * self.size;
            (offset + 1, offset + self.items.len())
        }
    }
}

/// Extracts the given (1-based) page from the given items.
///
/// Requesting page 0 or a page beyond the last one yields an empty page which still reports
/// the correct total.
///
/// # Example
/// ```
/// # use roster::query::paginate;
/// let items: Vec<usize> = (1..=23).collect();
///
/// let page = paginate(&items, 3, 10);
/// assert_eq!(page.items(), &[21, 22, 23]);
/// assert_eq!(page.page_count(), 3);
/// assert_eq!(page.range(), (21, 23));
///
/// assert_eq!(paginate(&items, 4, 10).items().is_empty(), true);
/// assert_eq!(paginate(&items, 0, 10).items().is_empty(), true);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let start = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(page_size))
        .filter(|start| *start < items.len() && page_size > 0);

    let page_items = match start {
        Some(start) => {
            let end = items.len().min(start.saturating_add(page_size));
            items[start..end].to_vec()
        }
        None => Vec::new(),
    };

    Page {
        items: page_items,
        number: page,
        size: page_size,
        total: items.len(),
    }
}

/// Describes which pagination controls are visible around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// The page numbers shown as direct links around the current page.
    pub pages: Vec<usize>,

    /// The current page.
    pub current: usize,

    /// Determines if an explicit link to the first page is shown.
    pub show_first: bool,

    /// Determines if a gap is shown between the first page and the window.
    pub leading_gap: bool,

    /// Determines if an explicit link to the last page is shown.
    pub show_last: bool,

    /// Determines if a gap is shown between the window and the last page.
    pub trailing_gap: bool,

    /// Determines if a previous page exists.
    pub has_previous: bool,

    /// Determines if a next page exists.
    pub has_next: bool,
}

/// Computes the pagination controls for the given page.
///
/// Returns `None` if there is only a single page (or none at all), as no controls are required
/// then. The current page is clamped into the valid range.
///
/// # Example
/// ```
/// # use roster::query::page_window;
/// let window = page_window(6, 10).unwrap();
///
/// assert_eq!(window.pages, vec![4, 5, 6, 7, 8]);
/// assert_eq!(window.show_first && window.leading_gap, true);
/// assert_eq!(window.show_last && window.trailing_gap, true);
///
/// assert_eq!(page_window(1, 1), None);
/// ```
pub fn page_window(current: usize, page_count: usize) -> Option<PageWindow> {
    if page_count <= 1 {
        return None;
    }

    let current = current.clamp(1, page_count);
    let left = current.saturating_sub(PAGE_WINDOW_DELTA).max(1);
    let right = (current + PAGE_WINDOW_DELTA).min(page_count);

    Some(PageWindow {
        pages: (left..=right).collect(),
        current,
        show_first: left > 1,
        leading_gap: left > 2,
        show_last: right < page_count,
        trailing_gap: right + 1 < page_count,
        has_previous: current > 1,
        has_next: current < page_count,
    })
}

/// Determines the table columns for the given records.
///
/// The fields of the first record are inspected. Preferred fields come first (in the order of
/// [PREFERRED_COLUMNS]), followed by all other fields in their natural order. At most
/// [MAX_COLUMNS] columns are returned.
///
/// # Example
/// ```
/// # use roster::record::Record;
/// # use roster::query::columns;
/// let record: Record = vec![("id", "7"), ("city", "Pune"), ("name", "Asha")]
///     .into_iter()
///     .collect();
///
/// assert_eq!(columns(&[record]), vec!["name", "city", "id"]);
/// ```
pub fn columns(records: &[Record]) -> Vec<String> {
    let first = match records.first() {
        Some(record) => record,
        None => return Vec::new(),
    };

    let preferred = PREFERRED_COLUMNS
        .iter()
        .copied()
        .filter(|field| first.contains(field));
    let others = first
        .keys()
        .filter(|field| !PREFERRED_COLUMNS.contains(field));

    preferred
        .chain(others)
        .take(MAX_COLUMNS)
        .map(|field| field.to_owned())
        .collect()
}
