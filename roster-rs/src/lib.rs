//! Roster is a library which turns loosely structured employee payloads into a searchable,
//! sortable and plottable directory.
//!
//! # Introduction
//! The payloads delivered by typical HR backends are anything but stable: sometimes they are
//! lists of unlabeled fixed width rows wrapped in a `TABLE_DATA` container, sometimes they are
//! plain lists of objects whose field names vary from system to system (`name` vs.
//! `employee_name`, `salary` vs. `CTC`). **Roster** takes such a payload and
//!
//! * [normalizes](normalize) it into a batch of [records](record::Record) which all share the
//!   same fields,
//! * [infers](schema) which fields carry the name, salary and location of an employee,
//! * executes [search, sort and pagination](query) deterministically,
//! * aggregates salaries into [chart data](chart::chart) and
//! * [resolves](geo) free-text city names to coordinates and groups them into
//!   [map clusters](map::clusters).
//!
//! All of these operations are pure and synchronous. The only asynchronous part is fetching the
//! payload, which is handled by the [session store](session::SessionStore) so that it happens at
//! most once per session.
//!
//! # Features
//! * **Forgiving normalization**: Malformed rows are filled up with fallback values, unknown
//!   shapes yield an empty batch. Nothing panics on bad input.
//! * **Stable sorting**: Mixed numeric and textual values are sorted by a merge sort which
//!   retains the order of equal elements and is deterministic even for inconsistent values.
//! * **Reload-aware config facility** which permits to update the configuration (e.g. additional
//!   places for the geo resolver) during operation.
//!
//! # Examples
//! A complete example of using Roster can be found in **roster-io**. A short example on how to
//! initialize the library can be found here: [Builder](builder::Builder).
//!
//! ```
//! # use roster::prelude::*;
//! # use serde_json::json;
//! let batch = Batch::from_payload(&json!({ "TABLE_DATA": { "data": [
//!     ["Asha Rao", "Engineer", "Pune", "7", "2024-01-01", "₹50,000"],
//!     ["Ravi", "Lead", "Mumbai", "8", "2023-03-01", "₹70,000"],
//!     ["Meera", "Staff", "mumbai", "9", "2022-05-01", "₹40,000"]
//! ]}}));
//!
//! let page = DirectoryView::default().render(&batch);
//! assert_eq!(page.page.total(), 3);
//!
//! let data = chart(&batch, "");
//! assert_eq!(data.max, 70000.);
//!
//! let map = clusters(&batch, &GeoResolver::default());
//! assert_eq!(map.clusters.len(), 2);
//! ```
#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_results
)]
use simplelog::{format_description, ConfigBuilder, LevelFilter, SimpleLogger};
use std::sync::Once;

pub mod batch;
pub mod builder;
pub mod chart;
pub mod config;
pub mod errors;
pub mod fmt;
pub mod geo;
pub mod map;
pub mod normalize;
pub mod query;
pub mod record;
pub mod schema;
pub mod session;
pub mod source;
pub mod view;

/// Re-exports the types and functions which are most commonly used.
pub mod prelude {
    pub use crate::batch::Batch;
    pub use crate::builder::{Builder, Directory};
    pub use crate::chart::{chart, ChartData};
    pub use crate::errors::LoadError;
    pub use crate::geo::{Coordinates, GeoResolver};
    pub use crate::map::{clusters, ClusterMap, GeoCluster};
    pub use crate::query::{columns, page_window, paginate, search, sort, Direction, SortSpec};
    pub use crate::record::{Record, Value};
    pub use crate::schema::{FieldRole, RoleMap};
    pub use crate::view::DirectoryView;
}

/// Contains the version of the Roster library.
pub const ROSTER_VERSION: &str = "DEVELOPMENT-SNAPSHOT";

/// Contains the git commit hash of the Roster build being used.
pub const ROSTER_REVISION: &str = "NO-REVISION";

/// Initializes the logging system.
///
/// Note that most probably the simplest way is to use a [Builder](builder::Builder) to set up the
/// directory, which will also set up logging if enabled.
pub fn init_logging() {
    static INIT_LOGGING: Once = Once::new();

    // We need to do this as otherwise the tests might crash as the logging system
    // is initialized several times...
    INIT_LOGGING.call_once(|| {
        if let Err(error) = SimpleLogger::init(
            LevelFilter::Debug,
            ConfigBuilder::new()
                .set_time_format_custom(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                ))
                .set_thread_level(LevelFilter::Trace)
                .set_target_level(LevelFilter::Error)
                .set_location_level(LevelFilter::Trace)
                .build(),
        ) {
            eprintln!("Failed to initialize logging system: {}", error);
        }
    });
}
