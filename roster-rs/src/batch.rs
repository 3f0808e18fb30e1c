//! Bundles a set of normalized records along with their inferred schema.
//!
//! A [Batch] is created once per load and is immutable afterwards. It is shared via `Arc` by the
//! [session store](crate::session::SessionStore) so that all views derived from it (tables,
//! charts and maps) operate on the same snapshot.
//!
//! # Example
//! ```
//! # use roster::batch::Batch;
//! # use roster::schema::FieldRole;
//! # use serde_json::json;
//! let batch = Batch::from_payload(&json!({ "data": [{ "Employee_Name": "Asha", "CTC": 10 }] }));
//!
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.roles().key(FieldRole::DisplayName), Some("Employee_Name"));
//! ```
use chrono::{DateTime, Local};

use crate::normalize::normalize;
use crate::record::Record;
use crate::schema::RoleMap;

/// Represents an immutable snapshot of normalized records.
#[derive(Debug, Clone)]
pub struct Batch {
    records: Vec<Record>,
    roles: RoleMap,
    loaded_at: DateTime<Local>,
}

impl Batch {
    /// Creates a new batch for the given records and infers their roles.
    pub fn new(records: Vec<Record>) -> Self {
        let roles = RoleMap::infer(&records);
        Batch {
            records,
            roles,
            loaded_at: Local::now(),
        }
    }

    /// Normalizes the given payload and wraps the result in a batch.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        Batch::new(normalize(payload))
    }

    /// Returns all records in their original order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the inferred role map of this batch.
    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    /// Returns the timestamp when this batch was created.
    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Returns the number of records in this batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Determines if this batch contains no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::Batch;
    use crate::schema::{FieldRole, RoleMap};
    use serde_json::json;

    #[test]
    fn roles_are_inferred_from_the_first_record() {
        let batch = Batch::from_payload(&json!([
            { "location": "Pune", "name": "Asha" },
            { "city": "Agra", "name": "Ravi" }
        ]));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.roles().key(FieldRole::Location), Some("location"));
    }

    #[test]
    fn empty_payloads_yield_empty_batches_with_default_roles() {
        let batch = Batch::from_payload(&json!([]));

        assert_eq!(batch.is_empty(), true);
        assert_eq!(batch.roles(), &RoleMap::default());
    }
}
