use serde::{Deserialize, Serialize};

use crate::document::AnnotationDocument;

/// Unit submitted to the storage service.
///
/// The import pipeline only ever creates fresh records, so every workflow flag
/// starts out `false` and the annotator is empty. Later stages of the wider
/// system flip the flags; this type carries them so the storage service
/// receives a complete entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(rename = "PiFF")]
    pub document: AnnotationDocument,

    /// Path of the stored image on the shared volume.
    #[serde(rename = "Url")]
    pub url: String,

    /// Original name of the uploaded file, verbatim.
    #[serde(rename = "Filename")]
    pub filename: String,

    #[serde(rename = "Annotated", default)]
    pub annotated: bool,
    #[serde(rename = "Corrected", default)]
    pub corrected: bool,
    #[serde(rename = "SentToReco", default)]
    pub sent_to_reco: bool,
    #[serde(rename = "SentToUser", default)]
    pub sent_to_user: bool,
    #[serde(rename = "Unreadable", default)]
    pub unreadable: bool,
    #[serde(rename = "Annotator", default)]
    pub annotator: String,
}

impl ImportRecord {
    /// Build a fresh record with all workflow flags cleared.
    pub fn new(
        document: AnnotationDocument,
        url: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            document,
            url: url.into(),
            filename: filename.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_cleared_workflow_flags() {
        let record = ImportRecord::new(AnnotationDocument::default(), "/v/1_p.png", "a.png");
        assert!(!record.annotated && !record.corrected && !record.unreadable);
        assert!(!record.sent_to_reco && !record.sent_to_user);
        assert!(record.annotator.is_empty());
        assert_eq!(record.url, "/v/1_p.png");
        assert_eq!(record.filename, "a.png");
    }

    #[test]
    fn serializes_storage_field_names() {
        let record = ImportRecord::new(AnnotationDocument::default(), "/v/1_p.png", "a.png");
        let value = serde_json::to_value([record]).unwrap();
        let entry = &value[0];

        for key in [
            "PiFF",
            "Url",
            "Filename",
            "Annotated",
            "Corrected",
            "SentToReco",
            "SentToUser",
            "Unreadable",
            "Annotator",
        ] {
            assert!(entry.get(key).is_some(), "missing {key}");
        }
        assert_eq!(entry["Annotated"], false);
        assert_eq!(entry["Annotator"], "");
    }

    #[test]
    fn filename_is_kept_verbatim() {
        let name = "Scan 01 (copy).JPG";
        let record = ImportRecord::new(AnnotationDocument::default(), "/v/x", name);
        let back: ImportRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(back.filename, name);
    }
}
