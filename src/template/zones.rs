use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;

use crate::foundation::error::{ThumbError, ThumbResult};
use crate::template::model::Zone;

/// Zones keyed by unique name, kept in insertion order.
///
/// Serializes as a JSON object whose key order is the insertion order; duplicate names in input
/// are rejected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneMap {
    entries: Vec<(String, Zone)>,
}

impl ZoneMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.index_of(name).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Zone> {
        self.index_of(name).map(move |i| &mut self.entries[i].1)
    }

    /// Append a new zone; errors if the name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, zone: Zone) -> ThumbResult<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ThumbError::validation(format!(
                "duplicate zone name '{name}'"
            )));
        }
        self.entries.push((name, zone));
        Ok(())
    }

    /// Replace an existing zone in place, or append it. Returns the previous zone.
    pub fn upsert(&mut self, name: impl Into<String>, zone: Zone) -> Option<Zone> {
        let name = name.into();
        match self.index_of(&name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, zone)),
            None => {
                self.entries.push((name, zone));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Zone> {
        let i = self.index_of(name)?;
        Some(self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Zone)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Zone)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == name)
    }
}

impl<'a> IntoIterator for &'a ZoneMap {
    type Item = (&'a str, &'a Zone);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, Zone)>,
        fn(&'a (String, Zone)) -> (&'a str, &'a Zone),
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn split(entry: &(String, Zone)) -> (&str, &Zone) {
            (entry.0.as_str(), &entry.1)
        }
        self.entries
            .iter()
            .map(split as fn(&'a (String, Zone)) -> (&'a str, &'a Zone))
    }
}

impl serde::Serialize for ZoneMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, zone) in &self.entries {
            map.serialize_entry(name, zone)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for ZoneMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ZoneMapVisitor;

        impl<'de> Visitor<'de> for ZoneMapVisitor {
            type Value = ZoneMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of zone name to zone")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ZoneMap, A::Error> {
                let mut out = ZoneMap::new();
                while let Some((name, zone)) = access.next_entry::<String, Zone>()? {
                    if out.contains(&name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate zone name '{name}'"
                        )));
                    }
                    out.entries.push((name, zone));
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(ZoneMapVisitor)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/zones.rs"]
mod tests;
