//! Provides the record model which is produced by the [normalizer](crate::normalize).
//!
//! A [Record] is an insertion ordered map from field names to [Value]s. The order of the fields
//! matters, as both the [schema inference](crate::schema) and the table columns derived by the
//! [query engine](crate::query::columns) break ties using the natural field order of the first
//! record of a batch.
//!
//! Values are rendered as strings the same way a browser would render them via `String(value)`,
//! so that searching and sorting behave identically no matter if a salary was delivered as
//! `50000` or as `"50000"`.
//!
//! # Example
//!
//! ```
//! # use roster::record::{Record, Value};
//! let record: Record = vec![("name", Value::from("Asha")), ("salary", Value::from(50000.))]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(record.get("name").unwrap().to_string(), "Asha");
//! assert_eq!(record.get("salary").unwrap().to_string(), "50000");
//! assert_eq!(record.get("unknown").is_none(), true);
//! assert_eq!(record.keys().collect::<Vec<_>>(), vec!["name", "salary"]);
//! ```
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use linked_hash_map::LinkedHashMap;

lazy_static::lazy_static! {
    /// Matches the numeric prefix of a string just like `parseFloat` would accept it.
    static ref NUMERIC_PREFIX: regex::Regex =
        regex::Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();

    /// Matches currency symbols, thousands separators and whitespace within an amount.
    static ref AMOUNT_NOISE: regex::Regex = regex::Regex::new(r"[\p{Sc},\s]").unwrap();
}

/// Represents a single field value within a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A plain string.
    Text(String),

    /// A numeric value. Integral numbers are rendered without a fraction.
    Number(f64),

    /// A boolean flag.
    Bool(bool),

    /// The placeholder for missing or null values.
    Empty,
}

/// Used to hand out a reference to an empty value for absent fields.
pub static EMPTY: Value = Value::Empty;

impl Value {
    /// Converts a JSON value into a field value.
    ///
    /// Nested arrays and objects are kept as their compact JSON rendering, so that they remain
    /// searchable.
    ///
    /// # Example
    /// ```
    /// # use roster::record::Value;
    /// # use serde_json::json;
    /// assert_eq!(Value::from_json(&json!("Pune")), Value::Text("Pune".to_owned()));
    /// assert_eq!(Value::from_json(&json!(42)), Value::Number(42.));
    /// assert_eq!(Value::from_json(&json!(null)), Value::Empty);
    /// assert_eq!(Value::from_json(&json!([1, 2])), Value::Text("[1,2]".to_owned()));
    /// ```
    pub fn from_json(value: &serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Empty,
            serde_json::Value::Bool(flag) => Value::Bool(*flag),
            serde_json::Value::Number(number) => {
                number.as_f64().map(Value::Number).unwrap_or(Value::Empty)
            }
            serde_json::Value::String(string) => Value::Text(string.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Determines if this is the empty placeholder.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Determines if this value is "falsy" as JavaScript would see it.
    ///
    /// Empty values, empty strings, `0`, `NaN` and `false` are considered blank and are replaced
    /// by fallback values in various places.
    ///
    /// # Example
    /// ```
    /// # use roster::record::Value;
    /// assert_eq!(Value::Empty.is_blank(), true);
    /// assert_eq!(Value::from("").is_blank(), true);
    /// assert_eq!(Value::from(0.).is_blank(), true);
    /// assert_eq!(Value::Bool(false).is_blank(), true);
    /// assert_eq!(Value::from("0").is_blank(), false);
    /// ```
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.is_empty(),
            Value::Number(number) => *number == 0. || number.is_nan(),
            Value::Bool(flag) => !flag,
        }
    }

    /// Returns the string representation of this value.
    ///
    /// This is the same as `to_string()` but avoids an allocation for text values.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(text) => Cow::Borrowed(text.as_str()),
            Value::Empty => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Number(number) => Cow::Owned(format_number(*number)),
        }
    }

    /// Interprets this value as a number using `parseFloat` semantics.
    ///
    /// # Example
    /// ```
    /// # use roster::record::Value;
    /// assert_eq!(Value::from(12.5).as_number(), Some(12.5));
    /// assert_eq!(Value::from("10 years").as_number(), Some(10.));
    /// assert_eq!(Value::from("n/a").as_number(), None);
    /// assert_eq!(Value::Empty.as_number(), None);
    /// ```
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            Value::Text(text) => parse_number(text),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

/// Renders a number the way JavaScript does for the common cases.
///
/// Integral values are printed without a fraction and negative zero is printed as "0".
///
/// # Example
/// ```
/// # use roster::record::format_number;
/// assert_eq!(format_number(50000.), "50000");
/// assert_eq!(format_number(12.25), "12.25");
/// assert_eq!(format_number(-0.), "0");
/// assert_eq!(format_number(f64::NAN), "NaN");
/// ```
pub fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_owned()
    } else if number.is_infinite() {
        if number > 0. {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else if number == 0. {
        "0".to_owned()
    } else {
        format!("{}", number)
    }
}

/// Parses the numeric prefix of the given string just like JavaScript's `parseFloat`.
///
/// Leading whitespace is skipped and any trailing garbage after the number is ignored. If no
/// number can be found at the start of the string, `None` is returned.
///
/// # Example
/// ```
/// # use roster::record::parse_number;
/// assert_eq!(parse_number("42"), Some(42.));
/// assert_eq!(parse_number("  -1.5e2kg"), Some(-150.));
/// assert_eq!(parse_number(".5"), Some(0.5));
/// assert_eq!(parse_number("abc"), None);
/// assert_eq!(parse_number(""), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    NUMERIC_PREFIX
        .find(text.trim_start())
        .and_then(|prefix| prefix.as_str().parse::<f64>().ok())
}

/// Parses a monetary amount by stripping currency symbols and thousands separators first.
///
/// Anything which still cannot be parsed yields `0`.
///
/// # Example
/// ```
/// # use roster::record::parse_amount;
/// assert_eq!(parse_amount("₹50,000"), 50000.);
/// assert_eq!(parse_amount("$1,234.50"), 1234.5);
/// assert_eq!(parse_amount("€ 12 000"), 12000.);
/// assert_eq!(parse_amount("n/a"), 0.);
/// ```
pub fn parse_amount(text: &str) -> f64 {
    parse_number(AMOUNT_NOISE.replace_all(text, "").as_ref())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.)
}

/// Represents a single normalized row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: LinkedHashMap<String, Value>,
}

impl Record {
    /// Creates a new and empty record.
    pub fn new() -> Self {
        Record {
            fields: LinkedHashMap::new(),
        }
    }

    /// Stores the given value for the given field.
    ///
    /// If the field is already present, its value is replaced but it keeps its position.
    pub fn put(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.get_mut(&field) {
            Some(slot) => *slot = value,
            None => {
                let _ = self.fields.insert(field, value);
            }
        }
    }

    /// Returns the value of the given field or `None` if the field is absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Determines if the given field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates over all field names in their natural order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|key| key.as_str())
    }

    /// Iterates over all values in their natural order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    /// Iterates over all fields along with their values.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Determines if this record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.put(key, value);
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{parse_amount, parse_number, Record, Value};
    use serde_json::json;

    #[test]
    fn fields_keep_their_insertion_order() {
        let mut record = Record::new();
        record.put("zeta", "1");
        record.put("alpha", "2");
        record.put("zeta", "3");

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(record.get("zeta").unwrap(), &Value::from("3"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn values_render_like_strings_in_a_browser() {
        assert_eq!(Value::from(50000.).to_string(), "50000");
        assert_eq!(Value::from(0.1).to_string(), "0.1");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(
            Value::from_json(&json!({"a": 1})).to_string(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn numbers_are_parsed_by_prefix() {
        assert_eq!(parse_number("9"), Some(9.));
        assert_eq!(parse_number("10"), Some(10.));
        assert_eq!(parse_number("1e3"), Some(1000.));
        assert_eq!(parse_number("2024-01-01"), Some(2024.));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("infinity"), None);
    }

    #[test]
    fn amounts_ignore_currency_noise() {
        assert_eq!(parse_amount("₹50,000"), 50000.);
        assert_eq!(parse_amount("₹ 1,20,000.75"), 120000.75);
        assert_eq!(parse_amount(""), 0.);
        assert_eq!(parse_amount("—"), 0.);
    }
}
