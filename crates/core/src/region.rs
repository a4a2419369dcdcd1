//! Areal units: regions with polygon boundaries and attribute values
//!
//! A `RegionTable` is the fixed, ordered collection one analysis runs over.
//! Index position is the canonical addressing scheme: spatial weights and
//! every statistic array produced downstream align with it.

use geo_types::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{Error, Result};

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// One areal unit: a stable identifier, a polygon boundary and attributes
#[derive(Debug, Clone)]
pub struct Region {
    /// Stable region identifier, unique within a table
    pub id: String,
    /// Region boundary. Single polygons are stored as one-part multipolygons.
    pub geometry: MultiPolygon<f64>,
    /// Attribute values keyed by field name
    pub attributes: HashMap<String, AttributeValue>,
}

impl Region {
    /// Create a region from a multipolygon boundary
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
            attributes: HashMap::new(),
        }
    }

    /// Create a region from a single polygon boundary
    pub fn from_polygon(id: impl Into<String>, polygon: Polygon<f64>) -> Self {
        Self::new(id, MultiPolygon(vec![polygon]))
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, field: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(field.into(), value);
    }

    /// Get an attribute
    pub fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }
}

/// Ordered collection of regions for one analysis run.
///
/// Ids are unique; the insertion order is fixed for the lifetime of the
/// table and defines the index every downstream array aligns with.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// Build a table from regions, validating id uniqueness.
    pub fn from_regions(regions: Vec<Region>) -> Result<Self> {
        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.id.as_str()) {
                return Err(Error::DuplicateRegionId(region.id.clone()));
            }
        }
        Ok(Self { regions })
    }

    /// Append a region, rejecting duplicate ids.
    pub fn push(&mut self, region: Region) -> Result<()> {
        if self.regions.iter().any(|r| r.id == region.id) {
            return Err(Error::DuplicateRegionId(region.id));
        }
        self.regions.push(region);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Region ids in table order
    pub fn ids(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    /// The set of attribute field names present on any region, sorted.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .regions
            .iter()
            .flat_map(|r| r.attributes.keys().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        fields.sort();
        fields
    }

    /// Extract a numeric attribute column aligned with the table order.
    ///
    /// A missing or non-numeric value on any region is a precondition
    /// violation, not a skippable row.
    pub fn column(&self, field: &str) -> Result<Vec<f64>> {
        if !self.regions.iter().any(|r| r.attributes.contains_key(field)) {
            return Err(Error::UnknownField(field.to_string()));
        }
        self.regions
            .iter()
            .enumerate()
            .map(|(index, region)| {
                region
                    .attribute(field)
                    .and_then(AttributeValue::as_f64)
                    .ok_or_else(|| Error::MissingAttribute {
                        index,
                        field: field.to_string(),
                    })
            })
            .collect()
    }
}

impl IntoIterator for RegionTable {
    type Item = Region;
    type IntoIter = std::vec::IntoIter<Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn unit_square(id: &str) -> Region {
        let polygon = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (1.0, 0.0),
                (1.0, 1.0),
                (0.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        Region::from_polygon(id, polygon)
    }

    #[test]
    fn test_attribute_as_f64() {
        assert_eq!(AttributeValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::Null.as_f64(), None);
        assert_eq!(AttributeValue::String("x".into()).as_f64(), None);
        assert_eq!(AttributeValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_column_extraction() {
        let mut a = unit_square("a");
        a.set_attribute("pop", AttributeValue::Int(120));
        let mut b = unit_square("b");
        b.set_attribute("pop", AttributeValue::Float(80.5));

        let table = RegionTable::from_regions(vec![a, b]).unwrap();
        let column = table.column("pop").unwrap();
        assert_eq!(column, vec![120.0, 80.5]);
    }

    #[test]
    fn test_column_missing_value() {
        let mut a = unit_square("a");
        a.set_attribute("rate", AttributeValue::Float(0.2));
        let b = unit_square("b");

        let table = RegionTable::from_regions(vec![a, b]).unwrap();
        let err = table.column("rate").unwrap_err();
        match err {
            Error::MissingAttribute { index, field } => {
                assert_eq!(index, 1);
                assert_eq!(field, "rate");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_column_unknown_field() {
        let table = RegionTable::from_regions(vec![unit_square("a")]).unwrap();
        assert!(matches!(
            table.column("nope"),
            Err(Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RegionTable::from_regions(vec![unit_square("a"), unit_square("a")]);
        assert!(matches!(result, Err(Error::DuplicateRegionId(_))));

        let mut table = RegionTable::new();
        table.push(unit_square("a")).unwrap();
        assert!(table.push(unit_square("a")).is_err());
    }

    #[test]
    fn test_fields_union() {
        let mut a = unit_square("a");
        a.set_attribute("pop", AttributeValue::Int(1));
        let mut b = unit_square("b");
        b.set_attribute("cases", AttributeValue::Int(2));

        let table = RegionTable::from_regions(vec![a, b]).unwrap();
        assert_eq!(table.fields(), vec!["cases".to_string(), "pop".to_string()]);
    }
}
