//! Annotation document produced by the conversion service.
//!
//! The document is hierarchical: a metadata header, an ordered list of
//! geometric [`Location`] regions, an ordered list of [`DataField`] values each
//! pointing at a location by identifier, optional child references and a
//! parent reference.
//!
//! # Referential integrity
//!
//! Every [`DataField::location_id`] is expected to name an existing
//! [`Location::id`]. Producing that guarantee is the conversion service's job;
//! the import pipeline forwards documents untouched.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "Meta": { "Type": "line", "URL": "" },
//!   "Location": [
//!     { "Type": "line", "Polygon": [[0, 0], [10, 0], [10, 5], [0, 5]], "Id": "loc_0" }
//!   ],
//!   "Data": [
//!     { "Type": "line", "LocationId": "loc_0", "Value": "", "Id": "0" }
//!   ],
//!   "Children": null,
//!   "Parent": 0
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A 2D integer point, serialized as a two-element array `[x, y]`.
pub type Point = [i32; 2];

/// Structured annotation document returned by the conversion service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnnotationDocument {
    /// Type/URL metadata header.
    #[serde(default)]
    pub meta: Meta,

    /// Ordered geometric regions.
    #[serde(default, with = "nullable_vec")]
    pub location: Vec<Location>,

    /// Ordered data fields, each tied to a location.
    #[serde(default, with = "nullable_vec")]
    pub data: Vec<DataField>,

    /// Optional child-node references. `None` round-trips as `null`.
    #[serde(default)]
    pub children: Option<Vec<i64>>,

    /// Parent-node reference.
    #[serde(default)]
    pub parent: i64,
}

/// Document metadata header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "URL", default)]
    pub url: String,
}

/// A tagged closed polygon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Polygon", default, with = "nullable_vec")]
    pub polygon: Vec<Point>,
    #[serde(rename = "Id", default)]
    pub id: String,
}

/// A typed value attached to a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "LocationId", default)]
    pub location_id: String,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Id", default)]
    pub id: String,
}

/// `Vec<T>` that reads `null` as empty and always writes an array.
mod nullable_vec {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, T>(value: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        crate::serde_null::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AnnotationDocument {
        AnnotationDocument {
            meta: Meta {
                kind: "line".into(),
                url: String::new(),
            },
            location: vec![Location {
                kind: "line".into(),
                polygon: vec![[0, 0], [0, 0], [0, 0], [0, 0]],
                id: "loc_0".into(),
            }],
            data: vec![DataField {
                kind: "line".into(),
                location_id: "loc_0".into(),
                value: String::new(),
                id: "0".into(),
            }],
            children: None,
            parent: 0,
        }
    }

    #[test]
    fn serializes_with_pascal_case_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["Meta"]["Type"], "line");
        assert_eq!(value["Meta"]["URL"], "");
        assert_eq!(value["Location"][0]["Polygon"][1], json!([0, 0]));
        assert_eq!(value["Data"][0]["LocationId"], "loc_0");
        assert!(value["Children"].is_null());
        assert_eq!(value["Parent"], 0);
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let doc: AnnotationDocument = serde_json::from_value(json!({
            "Meta": { "Type": "page", "URL": "http://x" },
            "Location": null,
            "Data": null,
            "Children": [3, 4],
            "Parent": 1
        }))
        .unwrap();

        assert!(doc.location.is_empty());
        assert!(doc.data.is_empty());
        assert_eq!(doc.children, Some(vec![3, 4]));
        assert_eq!(doc.parent, 1);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let doc: AnnotationDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, AnnotationDocument::default());
    }

    #[test]
    fn malformed_polygon_is_rejected() {
        let err = serde_json::from_value::<AnnotationDocument>(json!({
            "Location": [{ "Type": "line", "Polygon": [[1, 2, 3]], "Id": "a" }]
        }));
        assert!(err.is_err());
    }
}
