//! Infers which fields of a batch carry which semantic role.
//!
//! Payloads are only loosely structured: the employee name might be called `name`, `Name` or
//! `employee_name`, a salary might be delivered as `salary` or `CTC`. Therefore we inspect the
//! field names of the first record of a batch once and store the result in a [RoleMap] which is
//! then passed to everything downstream.
//!
//! For each role, the first field (in the natural field order of the sample record) which matches
//! one of the role's synonyms case-insensitively wins. If no field matches, the role's default
//! name is used even though it isn't present. Lookups via [resolve_field] then simply yield
//! an empty value.
//!
//! # Example
//! ```
//! # use roster::record::{Record, Value};
//! # use roster::schema::{FieldRole, RoleMap};
//! let record: Record = vec![("CTC", Value::from(10.)), ("Employee_Name", Value::from("Asha"))]
//!     .into_iter()
//!     .collect();
//!
//! let roles = RoleMap::infer(&[record]);
//! assert_eq!(roles.key(FieldRole::DisplayName), Some("Employee_Name"));
//! assert_eq!(roles.key(FieldRole::Compensation), Some("CTC"));
//! assert_eq!(roles.key(FieldRole::Location), Some("city"));
//! assert_eq!(roles.key(FieldRole::Unclassified), None);
//! ```
use crate::record::{Record, Value, EMPTY};

/// Enumerates the semantic roles a field can have.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// The name under which an employee is displayed.
    DisplayName,

    /// The salary or cost to company.
    Compensation,

    /// The city or location an employee works at.
    Location,

    /// Any other field.
    Unclassified,
}

/// Used to render a display name if the record doesn't provide one.
pub const UNKNOWN_NAME: &str = "Unknown";

impl FieldRole {
    /// Lists all roles for which a field can be inferred.
    pub const INFERRED: [FieldRole; 3] = [
        FieldRole::DisplayName,
        FieldRole::Compensation,
        FieldRole::Location,
    ];

    /// Returns the (lower case) field names which are accepted for this role.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            FieldRole::DisplayName => &["name", "employee_name"],
            FieldRole::Compensation => &["salary", "ctc"],
            FieldRole::Location => &["city", "location"],
            FieldRole::Unclassified => &[],
        }
    }

    /// Returns the field name to use if no synonym is present in a record.
    pub fn default_key(self) -> Option<&'static str> {
        match self {
            FieldRole::DisplayName => Some("name"),
            FieldRole::Compensation => Some("salary"),
            FieldRole::Location => Some("city"),
            FieldRole::Unclassified => None,
        }
    }
}

/// Determines the field which carries the given role within the given sample record.
///
/// Returns `None` only for [FieldRole::Unclassified].
///
/// # Example
/// ```
/// # use roster::record::{Record, Value};
/// # use roster::schema::{infer_role_key, FieldRole};
/// let record: Record = vec![("location", Value::from("Pune")), ("City", Value::from("Agra"))]
///     .into_iter()
///     .collect();
///
/// // The natural field order of the record breaks the tie, not the order of the synonyms...
/// assert_eq!(infer_role_key(&record, FieldRole::Location).unwrap(), "location");
/// assert_eq!(infer_role_key(&record, FieldRole::Compensation).unwrap(), "salary");
/// ```
pub fn infer_role_key(sample: &Record, role: FieldRole) -> Option<String> {
    let synonyms = role.synonyms();
    sample
        .keys()
        .find(|key| {
            let key = key.to_lowercase();
            synonyms.iter().any(|synonym| *synonym == key)
        })
        .map(|key| key.to_owned())
        .or_else(|| role.default_key().map(|key| key.to_owned()))
}

/// Contains the field names for all inferred roles of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleMap {
    display_name: String,
    compensation: String,
    location: String,
}

impl Default for RoleMap {
    /// Creates a role map which uses the default field name for each role.
    fn default() -> Self {
        RoleMap {
            display_name: "name".to_owned(),
            compensation: "salary".to_owned(),
            location: "city".to_owned(),
        }
    }
}

impl RoleMap {
    /// Infers the role map of a batch by inspecting its first record.
    ///
    /// An empty batch yields the default field names.
    pub fn infer(records: &[Record]) -> Self {
        match records.first() {
            Some(sample) => {
                let defaults = RoleMap::default();
                let key = |role| infer_role_key(sample, role);

                RoleMap {
                    display_name: key(FieldRole::DisplayName).unwrap_or(defaults.display_name),
                    compensation: key(FieldRole::Compensation).unwrap_or(defaults.compensation),
                    location: key(FieldRole::Location).unwrap_or(defaults.location),
                }
            }
            None => RoleMap::default(),
        }
    }

    /// Returns the field name which carries the given role.
    pub fn key(&self, role: FieldRole) -> Option<&str> {
        match role {
            FieldRole::DisplayName => Some(self.display_name.as_str()),
            FieldRole::Compensation => Some(self.compensation.as_str()),
            FieldRole::Location => Some(self.location.as_str()),
            FieldRole::Unclassified => None,
        }
    }

    /// Determines the role of the given field.
    ///
    /// # Example
    /// ```
    /// # use roster::schema::{FieldRole, RoleMap};
    /// let roles = RoleMap::default();
    ///
    /// assert_eq!(roles.role_of("salary"), FieldRole::Compensation);
    /// assert_eq!(roles.role_of("email"), FieldRole::Unclassified);
    /// ```
    pub fn role_of(&self, field: &str) -> FieldRole {
        FieldRole::INFERRED
            .iter()
            .copied()
            .find(|role| self.key(*role) == Some(field))
            .unwrap_or(FieldRole::Unclassified)
    }
}

/// Resolves the value which carries the given role within the given record.
///
/// This is the one place which decides how role lookups fall back: the value of the role's field
/// is returned if present, otherwise (absent field or [FieldRole::Unclassified]) the empty value.
pub fn resolve_field<'a>(record: &'a Record, roles: &RoleMap, role: FieldRole) -> &'a Value {
    roles
        .key(role)
        .and_then(|key| record.get(key))
        .unwrap_or(&EMPTY)
}

/// Returns the display name of the given record or "Unknown" if it is blank.
pub fn display_name(record: &Record, roles: &RoleMap) -> String {
    let value = resolve_field(record, roles, FieldRole::DisplayName);
    if value.is_blank() {
        UNKNOWN_NAME.to_owned()
    } else {
        value.to_string()
    }
}
