//! Resolves free-text place names to coordinates.
//!
//! The resolver is backed by a static table of well known Indian cities. Some cities are listed
//! under several spellings (e.g. "bangalore" and "bengaluru") which all resolve to the same
//! coordinates, so that records using different spellings still end up in the same
//! [cluster](crate::map::GeoCluster).
//!
//! A lookup first tries an exact (case-insensitive, trimmed) match. If this fails, we fall back
//! to a fuzzy match, which picks the **first** place in table order which is either contained in
//! the input or which contains the input. Note that this is deliberately not a "longest match":
//! an input like "Greater Noida" resolves to "noida" only because no earlier entry is contained
//! in it.
//!
//! # Example
//! ```
//! # use roster::geo::{Coordinates, GeoResolver};
//! let geo = GeoResolver::default();
//!
//! assert_eq!(geo.resolve(Some("Mumbai")), Some(Coordinates::new(19.076, 72.877)));
//! assert_eq!(geo.resolve(Some("  BENGALURU ")), geo.resolve(Some("bangalore")));
//! assert_eq!(geo.resolve(Some("Greater Noida")), geo.resolve(Some("noida")));
//! assert_eq!(geo.resolve(Some("Atlantis")), None);
//! assert_eq!(geo.resolve(None), None);
//! ```
use fnv::FnvHashMap;

use crate::record::Value;

/// Represents a position on the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinates {
    /// The latitude in degrees.
    pub lat: f64,

    /// The longitude in degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    pub fn new(lat: f64, lon: f64) -> Self {
        Coordinates { lat, lon }
    }

    /// Returns a hashable key which is identical for identical coordinates.
    pub fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

/// Contains the built-in places in their enumeration order, which matters for fuzzy matching.
const BUILTIN_PLACES: [(&str, f64, f64); 48] = [
    ("mumbai", 19.076, 72.877),
    ("delhi", 28.704, 77.102),
    ("new delhi", 28.613, 77.209),
    ("bangalore", 12.972, 77.594),
    ("bengaluru", 12.972, 77.594),
    ("hyderabad", 17.385, 78.487),
    ("ahmedabad", 23.023, 72.572),
    ("chennai", 13.083, 80.270),
    ("kolkata", 22.572, 88.364),
    ("pune", 18.520, 73.856),
    ("jaipur", 26.912, 75.787),
    ("lucknow", 26.847, 80.947),
    ("surat", 21.170, 72.831),
    ("kanpur", 26.449, 80.331),
    ("nagpur", 21.146, 79.088),
    ("patna", 25.594, 85.137),
    ("indore", 22.719, 75.857),
    ("bhopal", 23.259, 77.413),
    ("visakhapatnam", 17.686, 83.218),
    ("vadodara", 22.307, 73.181),
    ("coimbatore", 11.017, 76.955),
    ("agra", 27.178, 78.006),
    ("nashik", 19.998, 73.791),
    ("ranchi", 23.344, 85.310),
    ("faridabad", 28.408, 77.317),
    ("meerut", 28.984, 77.706),
    ("rajkot", 22.303, 70.801),
    ("jabalpur", 23.181, 79.987),
    ("guwahati", 26.144, 91.736),
    ("chandigarh", 30.733, 76.779),
    ("noida", 28.535, 77.391),
    ("gurgaon", 28.459, 77.027),
    ("gurugram", 28.459, 77.027),
    ("kochi", 9.931, 76.267),
    ("thiruvananthapuram", 8.524, 76.936),
    ("goa", 15.491, 73.832),
    ("mysore", 12.305, 76.655),
    ("mangalore", 12.914, 74.856),
    ("hubli", 15.362, 75.124),
    ("tirupati", 13.628, 79.418),
    ("jodhpur", 26.286, 73.014),
    ("udaipur", 24.571, 73.691),
    ("amritsar", 31.634, 74.872),
    ("ludhiana", 30.900, 75.847),
    ("varanasi", 25.316, 82.973),
    ("ghaziabad", 28.670, 77.412),
    ("allahabad", 25.435, 81.846),
    ("prayagraj", 25.435, 81.846),
];

/// Resolves place names to coordinates using a table of known places.
pub struct GeoResolver {
    places: Vec<(String, Coordinates)>,
    index: FnvHashMap<String, usize>,
}

impl Default for GeoResolver {
    /// Creates a resolver which only knows the built-in places.
    fn default() -> Self {
        GeoResolver::with_places(Vec::new())
    }
}

impl GeoResolver {
    /// Creates a resolver which knows the built-in places followed by the given additional ones.
    ///
    /// Additional places are appended after the built-in table. Therefore they never shadow a
    /// built-in entry, neither for exact nor for fuzzy matches.
    ///
    /// # Example
    /// ```
    /// # use roster::geo::{Coordinates, GeoResolver};
    /// let geo = GeoResolver::with_places(vec![("Shillong".to_owned(), Coordinates::new(25.578, 91.893))]);
    ///
    /// assert_eq!(geo.resolve(Some("shillong")), Some(Coordinates::new(25.578, 91.893)));
    /// assert_eq!(geo.len(), 49);
    /// ```
    pub fn with_places(additional_places: Vec<(String, Coordinates)>) -> Self {
        let mut resolver = GeoResolver {
            places: Vec::with_capacity(BUILTIN_PLACES.len() + additional_places.len()),
            index: FnvHashMap::default(),
        };

        for (name, lat, lon) in BUILTIN_PLACES.iter() {
            resolver.add(name, Coordinates::new(*lat, *lon));
        }
        for (name, coordinates) in additional_places {
            resolver.add(&name, coordinates);
        }

        resolver
    }

    fn add(&mut self, name: &str, coordinates: Coordinates) {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            log::warn!("Ignoring a place without a name at {:?}", coordinates);
            return;
        }

        let position = self.places.len();
        let _ = self.index.entry(key.clone()).or_insert(position);
        self.places.push((key, coordinates));
    }

    /// Returns the number of known places (including aliases).
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Determines if no places are known at all.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Resolves the given place name into coordinates.
    ///
    /// Returns `None` for absent or blank input or if neither an exact nor a fuzzy match exists.
    pub fn resolve(&self, place: Option<&str>) -> Option<Coordinates> {
        self.lookup(place).map(|(_, coordinates)| coordinates)
    }

    /// Resolves the given field value into coordinates.
    ///
    /// Blank values (empty, `0`, `false`) never resolve; everything else is resolved via its
    /// string representation.
    pub fn resolve_value(&self, value: &Value) -> Option<Coordinates> {
        if value.is_blank() {
            None
        } else {
            self.resolve(Some(value.to_text().as_ref()))
        }
    }

    /// Resolves the given place name and also reports the matching table key.
    ///
    /// # Example
    /// ```
    /// # use roster::geo::GeoResolver;
    /// let geo = GeoResolver::default();
    ///
    /// assert_eq!(geo.lookup(Some("Greater Noida")).unwrap().0, "noida");
    /// assert_eq!(geo.lookup(Some("New Delhi")).unwrap().0, "new delhi");
    /// ```
    pub fn lookup(&self, place: Option<&str>) -> Option<(&str, Coordinates)> {
        let name = place?.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        if let Some(position) = self.index.get(&name) {
            let (key, coordinates) = &self.places[*position];
            return Some((key.as_str(), *coordinates));
        }

        // First match in table order wins, even if a later key would be more specific...
        self.places
            .iter()
            .find(|(key, _)| name.contains(key.as_str()) || key.contains(name.as_str()))
            .map(|(key, coordinates)| (key.as_str(), *coordinates))
    }
}

#[cfg(test)]
mod tests {
    use crate::geo::{Coordinates, GeoResolver};
    use crate::record::Value;

    #[test]
    fn exact_matches_ignore_case_and_whitespace() {
        let geo = GeoResolver::default();

        assert_eq!(
            geo.resolve(Some("Mumbai")),
            Some(Coordinates::new(19.076, 72.877))
        );
        assert_eq!(
            geo.resolve(Some("  pune ")),
            Some(Coordinates::new(18.520, 73.856))
        );
        assert_eq!(
            geo.resolve(Some("Gurugram")),
            geo.resolve(Some("gurgaon"))
        );
    }

    #[test]
    fn unknown_and_blank_places_are_not_found() {
        let geo = GeoResolver::default();

        assert_eq!(geo.resolve(Some("Atlantis")), None);
        assert_eq!(geo.resolve(Some("")), None);
        assert_eq!(geo.resolve(Some("   ")), None);
        assert_eq!(geo.resolve(None), None);
        assert_eq!(geo.resolve_value(&Value::Empty), None);
        assert_eq!(geo.resolve_value(&Value::from("")), None);
    }

    #[test]
    fn fuzzy_matches_use_the_first_entry_in_table_order() {
        let geo = GeoResolver::default();

        // The input contains a known key...
        assert_eq!(geo.lookup(Some("Greater Noida")).unwrap().0, "noida");
        assert_eq!(geo.lookup(Some("Pune, Maharashtra")).unwrap().0, "pune");

        // A key contains the input...
        assert_eq!(geo.lookup(Some("Hyder")).unwrap().0, "hyderabad");

        // "delhi" is enumerated before "new delhi", so a sloppy spelling picks the former...
        assert_eq!(geo.lookup(Some("New Delhi NCR")).unwrap().0, "delhi");

        // A short input contained in many keys resolves to the first one...
        assert_eq!(geo.lookup(Some("pur")).unwrap().0, "jaipur");
    }

    #[test]
    fn additional_places_never_shadow_builtin_ones() {
        let geo = GeoResolver::with_places(vec![
            ("Mumbai".to_owned(), Coordinates::new(0., 0.)),
            ("Leh".to_owned(), Coordinates::new(34.152, 77.577)),
            (" ".to_owned(), Coordinates::new(1., 1.)),
        ]);

        assert_eq!(geo.len(), 50);
        assert_eq!(
            geo.resolve(Some("mumbai")),
            Some(Coordinates::new(19.076, 72.877))
        );
        assert_eq!(
            geo.resolve(Some("Leh")),
            Some(Coordinates::new(34.152, 77.577))
        );
    }
}
