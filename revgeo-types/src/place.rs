use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute mapping of a place: string keys to nullable string values.
pub type Attributes = BTreeMap<String, Option<String>>;

/// One reference record: a named place and the coordinate it was indexed at.
///
/// Places have no primary key of their own; they are identified by their
/// position in the reference store.
///
/// # Examples
///
/// ```
/// use revgeo_types::coordinate::Coordinate;
/// use revgeo_types::place::Place;
///
/// let place = Place::new(Coordinate::new(51.5074, -0.1278))
///     .with_attribute("name", Some("London"))
///     .with_attribute("admin2", None::<String>);
///
/// assert_eq!(place.get("name"), Some("London"));
/// assert_eq!(place.get("admin2"), None);
/// assert!(place.attributes().contains_key("admin2"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    coordinate: Coordinate,
    attributes: Attributes,
}

impl Place {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            attributes: Attributes::new(),
        }
    }

    pub fn from_parts(coordinate: Coordinate, attributes: Attributes) -> Self {
        Self {
            coordinate,
            attributes,
        }
    }

    pub fn with_attribute<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes.insert(key.into(), value.map(Into::into));
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Value of `key`, or `None` when the key is absent or its value is null.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_deref())
    }

    /// Keep only the attributes named in `allow`.
    pub fn retain_attributes<S: AsRef<str>>(&mut self, allow: &[S]) {
        self.attributes
            .retain(|key, _| allow.iter().any(|a| a.as_ref() == key));
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}
