//! Aggregates the compensation of a batch into the data of a bar chart.
//!
//! The chart shows at most [CHART_LIMIT] employees. It can optionally be narrowed down by a
//! search term, which (in contrast to the table search) only inspects the display name.
//!
//! # Example
//! ```
//! # use roster::batch::Batch;
//! # use roster::chart::chart;
//! # use serde_json::json;
//! let batch = Batch::from_payload(&json!([
//!     { "name": "Asha Rao", "salary": "₹50,000" },
//!     { "name": "Ravi Kumar", "salary": 30000 },
//!     { "name": "Meera", "salary": "n/a" }
//! ]));
//!
//! let data = chart(&batch, "");
//! assert_eq!(data.bars.len(), 3);
//! assert_eq!(data.bars[0].short_label, "Asha");
//! assert_eq!(data.bars[0].value, 50000.);
//! assert_eq!(data.bars[2].value, 0.);
//! assert_eq!(data.max, 50000.);
//!
//! assert_eq!(chart(&batch, "RAVI").bars[0].full_label, "Ravi Kumar");
//! ```
use crate::batch::Batch;
use crate::fmt::format_rupees;
use crate::record::parse_amount;
use crate::schema::{display_name, resolve_field, FieldRole};

/// Contains the maximal number of bars in a chart.
pub const CHART_LIMIT: usize = 10;

/// Represents a single bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The first word of the display name, used as axis label.
    pub short_label: String,

    /// The full display name, used for tooltips.
    pub full_label: String,

    /// The compensation of the employee.
    pub value: f64,
}

impl Bar {
    /// Renders the value of this bar as used in a tooltip.
    ///
    /// # Example
    /// ```
    /// # use roster::chart::Bar;
    /// let bar = Bar { short_label: "Asha".to_owned(), full_label: "Asha Rao".to_owned(), value: 123456. };
    /// assert_eq!(bar.tooltip(), "Asha Rao: ₹1,23,456");
    /// ```
    pub fn tooltip(&self) -> String {
        format!("{}: {}", self.full_label, format_rupees(self.value))
    }
}

/// Contains the bars of a chart along with some summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// The bars in batch order.
    pub bars: Vec<Bar>,

    /// The largest value of all bars or 0 if there are none.
    pub max: f64,

    /// The average value of all bars or 0 if there are none.
    pub mean: f64,

    /// The number of bars.
    pub shown: usize,

    /// The number of records in the underlying batch.
    pub total: usize,
}

/// Computes the chart data for the given batch.
///
/// If the search term isn't blank, only records whose display name contains it
/// (case-insensitively and including any surrounding whitespace) are considered. At most [CHART_LIMIT] bars are emitted.
pub fn chart(batch: &Batch, search: &str) -> ChartData {
    let filtered = !search.trim().is_empty();
    let search = search.to_lowercase();
    let roles = batch.roles();

    let bars: Vec<Bar> = batch
        .records()
        .iter()
        .filter(|record| {
            !filtered
                || resolve_field(record, roles, FieldRole::DisplayName)
                    .to_text()
                    .to_lowercase()
                    .contains(search.as_str())
        })
        .take(CHART_LIMIT)
        .map(|record| {
            let full_label = display_name(record, roles);
            let short_label = full_label
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_owned();
            let value = parse_amount(&resolve_field(record, roles, FieldRole::Compensation).to_text());

            Bar {
                short_label,
                full_label,
                value,
            }
        })
        .collect();

    let shown = bars.len();
    let (max, mean) = if bars.is_empty() {
        (0., 0.)
    } else {
        let max = bars.iter().map(|bar| bar.value).fold(f64::MIN, f64::max);
        let sum: f64 = bars.iter().map(|bar| bar.value).sum();
        (max, sum / shown as f64)
    };

    ChartData {
        bars,
        max,
        mean,
        shown,
        total: batch.len(),
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::Batch;
    use crate::chart::{chart, CHART_LIMIT};
    use serde_json::json;

    #[test]
    fn at_most_ten_bars_are_shown() {
        let rows: Vec<_> = (0..25)
            .map(|index| json!({ "name": format!("Person {}", index), "salary": index * 1000 }))
            .collect();
        let batch = Batch::from_payload(&json!(rows));

        let data = chart(&batch, "  ");

        assert_eq!(data.shown, CHART_LIMIT);
        assert_eq!(data.total, 25);
        assert_eq!(data.bars[9].full_label, "Person 9");
        assert_eq!(data.max, 9000.);
        assert_eq!(data.mean, 4500.);
    }

    #[test]
    fn search_only_inspects_the_display_name() {
        let batch = Batch::from_payload(&json!([
            { "employee_name": "Asha Rao", "city": "Pune", "CTC": "₹ 1,00,000" },
            { "employee_name": "Punit Shah", "city": "Agra", "CTC": "70000" }
        ]));

        let data = chart(&batch, "pun");

        assert_eq!(data.shown, 1);
        assert_eq!(data.bars[0].short_label, "Punit");
        assert_eq!(data.bars[0].value, 70000.);
        assert_eq!(chart(&batch, "asha").bars[0].value, 100000.);
    }

    #[test]
    fn search_terms_are_matched_including_whitespace() {
        let batch = Batch::from_payload(&json!([
            { "employee_name": "Asha Rao", "CTC": "50000" },
            { "employee_name": "Punit Shah", "CTC": "70000" }
        ]));

        assert_eq!(chart(&batch, " pun ").shown, 0);
        assert_eq!(chart(&batch, "a r").shown, 1);
        assert_eq!(chart(&batch, "   ").shown, 2);
    }

    #[test]
    fn blank_names_are_rendered_as_unknown() {
        let batch = Batch::from_payload(&json!([{ "name": "", "salary": 10 }]));

        let data = chart(&batch, "");

        assert_eq!(data.bars[0].full_label, "Unknown");
        assert_eq!(data.bars[0].short_label, "Unknown");
    }

    #[test]
    fn empty_batches_yield_empty_charts() {
        let data = chart(&Batch::from_payload(&json!([])), "");

        assert_eq!(data.bars.is_empty(), true);
        assert_eq!(data.max, 0.);
        assert_eq!(data.mean, 0.);
        assert_eq!(data.shown, 0);
        assert_eq!(data.total, 0);
    }
}
