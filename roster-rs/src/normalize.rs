//! Converts a loosely structured payload into a sequence of [Records](crate::record::Record).
//!
//! The upstream source delivers its data in one of several shapes:
//!
//! 1) A list of fixed width rows, wrapped in a container:
//! ```json
//! { "TABLE_DATA": { "data": [ ["Asha", "Engineer", "Pune", "7", "2024-01-01", "₹50,000"] ] } }
//! ```
//! The columns of these rows are positional: name, designation, city, id, date and salary.
//! 2) A list of objects (again, either wrapped or bare), which are already records.
//! 3) A single object which is treated as a single record.
//!
//! Containers are probed in a fixed order: `TABLE_DATA.data`, `table_data.data` and finally
//! `data`. A payload which is a list itself is its own container.
//!
//! Normalizing never fails. Missing or malformed cells are replaced by fallback values and
//! shapes which cannot be interpreted at all yield an empty batch. Within a batch, all records
//! share the same fields in the same order.
//!
//! # Example
//! ```
//! # use roster::normalize::normalize;
//! # use roster::record::Value;
//! # use serde_json::json;
//! let payload = json!({
//!     "TABLE_DATA": { "data": [["Asha", "Engineer", "Pune", "7", "2024-01-01", "₹50,000"]] }
//! });
//!
//! let records = normalize(&payload);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get("city").unwrap(), &Value::from("Pune"));
//! assert_eq!(records[0].get("salary").unwrap(), &Value::from(50000.));
//! ```
use fnv::FnvHashSet;
use serde_json::{Map, Value as Json};

use crate::record::{format_number, parse_amount, Record, Value};

/// Lists the paths probed (in this order) to find the list of rows within a payload.
const CONTAINER_PATHS: [&[&str]; 3] = [&["TABLE_DATA", "data"], &["table_data", "data"], &["data"]];

/// Describes the positional columns of a fixed width row along with their fallback values.
const ROW_COLUMNS: [(&str, &str); 5] = [
    ("name", "—"),
    ("designation", "Staff"),
    ("city", "Unknown"),
    ("id", "0"),
    ("date", "—"),
];

/// Contains the field name and position of the salary within a fixed width row.
const SALARY_COLUMN: (&str, usize) = ("salary", 5);

/// Normalizes the given payload into a list of records.
///
/// See the [module documentation](crate::normalize) for the supported shapes.
pub fn normalize(payload: &Json) -> Vec<Record> {
    if let Some(Json::Array(rows)) = find_container(payload) {
        match rows.first() {
            None => return Vec::new(),
            Some(Json::Array(_)) => {
                log::debug!("Normalizing {} fixed width rows...", rows.len());
                return rows.iter().map(row_to_record).collect();
            }
            Some(Json::Object(_)) => {
                log::debug!("Normalizing {} objects...", rows.len());
                return unify_objects(rows);
            }
            Some(_) => {}
        }
    }

    match payload {
        Json::Object(map) if map.is_empty() => Vec::new(),
        Json::Object(map) => {
            log::debug!("Normalizing a single object with {} fields...", map.len());
            vec![object_to_record(map, map.keys())]
        }
        Json::Array(rows) if rows.is_empty() => Vec::new(),
        Json::Null => Vec::new(),
        _ => {
            log::warn!("Cannot interpret the given payload - yielding an empty batch.");
            Vec::new()
        }
    }
}

/// Determines the list of rows within the given payload.
///
/// Just like a browser would evaluate `a || b || c`, a candidate only counts if it is truthy.
fn find_container(payload: &Json) -> Option<&Json> {
    if payload.is_array() {
        return Some(payload);
    }

    CONTAINER_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(payload, |node, key| node.get(*key))
            .filter(|node| is_truthy(node))
    })
}

fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(flag) => *flag,
        Json::Number(number) => number.as_f64().map(|n| n != 0. && !n.is_nan()).unwrap_or(false),
        Json::String(string) => !string.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}

/// Renders a cell of a fixed width row or returns `None` if the cell is missing or falsy.
fn cell_text(cell: Option<&Json>) -> Option<String> {
    let cell = cell.filter(|cell| is_truthy(cell))?;
    match cell {
        Json::String(string) => Some(string.clone()),
        Json::Number(number) => number.as_f64().map(format_number),
        other => Some(other.to_string()),
    }
}

/// Converts a fixed width row into a record with positional column semantics.
///
/// A row which isn't a list at all is treated like a row without any cells.
fn row_to_record(row: &Json) -> Record {
    let cells = row.as_array().map(|cells| cells.as_slice()).unwrap_or(&[]);

    let mut record = Record::new();
    for (position, (field, fallback)) in ROW_COLUMNS.iter().enumerate() {
        let text = cell_text(cells.get(position)).unwrap_or_else(|| fallback.to_string());
        record.put(*field, text);
    }

    let (field, position) = SALARY_COLUMN;
    let salary = cell_text(cells.get(position)).unwrap_or_else(|| "0".to_owned());
    record.put(field, parse_amount(&salary));

    record
}

/// Turns a list of objects into records which all share the same fields.
///
/// The fields are ordered like in the first object, fields which only show up in later objects
/// are appended in the order they are first seen. Elements which aren't objects yield records
/// which only contain empty values.
fn unify_objects(rows: &[Json]) -> Vec<Record> {
    let mut seen = FnvHashSet::default();
    let mut fields = Vec::new();
    for map in rows.iter().filter_map(Json::as_object) {
        for key in map.keys() {
            if seen.insert(key.as_str()) {
                fields.push(key.as_str());
            }
        }
    }

    let no_fields = Map::new();
    rows.iter()
        .map(|row| {
            let map = row.as_object().unwrap_or(&no_fields);
            object_to_record(map, fields.iter().copied())
        })
        .collect()
}

/// Converts the given object into a record containing exactly the given fields.
fn object_to_record<I, K>(map: &Map<String, Json>, fields: I) -> Record
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| {
            let value = map
                .get(field.as_ref())
                .map(Value::from_json)
                .unwrap_or(Value::Empty);
            (field.as_ref().to_owned(), value)
        })
        .collect()
}
