//! Groups the records of a batch into clusters on a map.
//!
//! Each record's location is resolved via the [GeoResolver]. Records which resolve to identical
//! coordinates end up in the same [GeoCluster] (e.g. "Bangalore" and "Bengaluru"). Clusters are
//! emitted in the order in which their first record appears in the batch.
//!
//! Records whose location cannot be resolved are not shown, but they are counted so that the
//! map can report how many employees are missing.
//!
//! # Example
//! ```
//! # use roster::batch::Batch;
//! # use roster::geo::GeoResolver;
//! # use roster::map::clusters;
//! # use serde_json::json;
//! let batch = Batch::from_payload(&json!([
//!     { "name": "Asha", "city": "Bangalore" },
//!     { "name": "Ravi", "city": "Atlantis" },
//!     { "name": "Meera", "city": "bengaluru" }
//! ]));
//!
//! let map = clusters(&batch, &GeoResolver::default());
//! assert_eq!(map.clusters.len(), 1);
//! assert_eq!(map.clusters[0].source_label, "Bangalore");
//! assert_eq!(map.clusters[0].members, vec!["Asha", "Meera"]);
//! assert_eq!(map.unresolved, 1);
//! ```
use fnv::FnvHashMap;
use itertools::Itertools;

use crate::batch::Batch;
use crate::geo::{Coordinates, GeoResolver};
use crate::schema::{display_name, resolve_field, FieldRole};

/// Contains the number of members listed in a cluster popup before it is abbreviated.
pub const POPUP_MEMBER_LIMIT: usize = 5;

/// Represents all employees located at the same coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCluster {
    /// The position of the cluster.
    pub coordinates: Coordinates,

    /// The location as spelled by the first record of the cluster.
    pub source_label: String,

    /// The display names of all members in batch order.
    pub members: Vec<String>,
}

impl GeoCluster {
    /// Returns the members to show in a popup along with the number of hidden ones.
    ///
    /// # Example
    /// ```
    /// # use roster::geo::Coordinates;
    /// # use roster::map::GeoCluster;
    /// let cluster = GeoCluster {
    ///     coordinates: Coordinates::new(18.52, 73.856),
    ///     source_label: "Pune".to_owned(),
    ///     members: (1..=7).map(|index| format!("Member {}", index)).collect(),
    /// };
    ///
    /// let (visible, hidden) = cluster.preview(5);
    /// assert_eq!(visible.len(), 5);
    /// assert_eq!(hidden, 2);
    /// assert_eq!(cluster.overflow_label(5).unwrap(), "+2 more");
    /// assert_eq!(cluster.overflow_label(10), None);
    /// ```
    pub fn preview(&self, limit: usize) -> (&[String], usize) {
        let visible = self.members.len().min(limit);
        (&self.members[..visible], self.members.len() - visible)
    }

    /// Returns the "+N more" suffix if not all members fit into a popup.
    pub fn overflow_label(&self, limit: usize) -> Option<String> {
        match self.preview(limit) {
            (_, 0) => None,
            (_, hidden) => Some(format!("+{} more", hidden)),
        }
    }

    /// Renders the member list of a popup like "Asha, Ravi +3 more".
    pub fn popup_text(&self, limit: usize) -> String {
        let (visible, _) = self.preview(limit);
        let names = visible.iter().join(", ");
        match self.overflow_label(limit) {
            Some(overflow) => format!("{} {}", names, overflow),
            None => names,
        }
    }
}

/// Contains all clusters of a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterMap {
    /// The clusters in order of first appearance.
    pub clusters: Vec<GeoCluster>,

    /// The number of records which were placed in a cluster.
    pub resolved: usize,

    /// The number of records whose location couldn't be resolved.
    pub unresolved: usize,
}

/// Groups the records of the given batch into clusters.
pub fn clusters(batch: &Batch, geo: &GeoResolver) -> ClusterMap {
    let roles = batch.roles();
    let mut map = ClusterMap::default();
    let mut positions: FnvHashMap<(u64, u64), usize> = FnvHashMap::default();

    for record in batch.records() {
        let location = resolve_field(record, roles, FieldRole::Location);
        let coordinates = match geo.resolve_value(location) {
            Some(coordinates) => coordinates,
            None => {
                map.unresolved += 1;
                continue;
            }
        };

        let position = *positions.entry(coordinates.key()).or_insert_with(|| {
            map.clusters.push(GeoCluster {
                coordinates,
                source_label: location.to_string(),
                members: Vec::new(),
            });
            map.clusters.len() - 1
        });

        map.clusters[position]
            .members
            .push(display_name(record, roles));
        map.resolved += 1;
    }

    if map.unresolved > 0 {
        log::debug!(
            "{} of {} records could not be placed on the map.",
            map.unresolved,
            batch.len()
        );
    }

    map
}

#[cfg(test)]
mod tests {
    use crate::batch::Batch;
    use crate::geo::{Coordinates, GeoResolver};
    use crate::map::{clusters, POPUP_MEMBER_LIMIT};
    use serde_json::json;

    #[test]
    fn identical_places_are_merged_in_order() {
        let batch = Batch::from_payload(&json!([
            { "name": "Asha", "city": "Mumbai" },
            { "name": "Ravi", "city": "Pune" },
            { "name": "Meera", "city": "MUMBAI " }
        ]));

        let map = clusters(&batch, &GeoResolver::default());

        assert_eq!(map.clusters.len(), 2);
        assert_eq!(map.clusters[0].coordinates, Coordinates::new(19.076, 72.877));
        assert_eq!(map.clusters[0].members, vec!["Asha", "Meera"]);
        assert_eq!(map.clusters[0].source_label, "Mumbai");
        assert_eq!(map.clusters[1].members, vec!["Ravi"]);
        assert_eq!(map.resolved, 3);
        assert_eq!(map.unresolved, 0);
    }

    #[test]
    fn unresolvable_and_missing_locations_are_counted() {
        let batch = Batch::from_payload(&json!([
            { "Name": "Asha", "Location": "Atlantis" },
            { "Name": "Ravi", "Location": null },
            { "Name": "", "Location": "Greater Noida" }
        ]));

        let map = clusters(&batch, &GeoResolver::default());

        assert_eq!(map.clusters.len(), 1);
        assert_eq!(map.clusters[0].members, vec!["Unknown"]);
        assert_eq!(map.clusters[0].source_label, "Greater Noida");
        assert_eq!(map.unresolved, 2);
    }

    #[test]
    fn large_clusters_are_abbreviated_in_popups() {
        let rows: Vec<_> = (0..8)
            .map(|index| json!({ "name": format!("P{}", index), "city": "Agra" }))
            .collect();
        let map = clusters(&Batch::from_payload(&json!(rows)), &GeoResolver::default());

        let (visible, hidden) = map.clusters[0].preview(POPUP_MEMBER_LIMIT);
        assert_eq!(visible, &["P0", "P1", "P2", "P3", "P4"]);
        assert_eq!(hidden, 3);
        assert_eq!(map.clusters[0].members.len(), 8);
        assert_eq!(
            map.clusters[0].popup_text(POPUP_MEMBER_LIMIT),
            "P0, P1, P2, P3, P4 +3 more"
        );
        assert_eq!(map.clusters[0].popup_text(10), "P0, P1, P2, P3, P4, P5, P6, P7");
    }

    #[test]
    fn empty_batches_yield_empty_maps() {
        let map = clusters(&Batch::from_payload(&json!([])), &GeoResolver::default());

        assert_eq!(map.clusters.is_empty(), true);
        assert_eq!(map.resolved, 0);
        assert_eq!(map.unresolved, 0);
    }
}
