//! Classified result rows returned once a job completes.

use serde::{Deserialize, Deserializer, Serialize};

/// Building classification label.
///
/// Labels outside the known set are kept verbatim in `Other` so a newer
/// service never breaks result parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Residential,
    CommercialOffice,
    CommercialHotel,
    CommercialMedical,
    CommercialRetail,
    CommercialWarehouse,
    Mixed,
    Misc,
    Other(String),
}

impl Category {
    /// All labels the service is known to produce.
    pub const KNOWN: [Category; 8] = [
        Category::Residential,
        Category::CommercialOffice,
        Category::CommercialHotel,
        Category::CommercialMedical,
        Category::CommercialRetail,
        Category::CommercialWarehouse,
        Category::Mixed,
        Category::Misc,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Residential => "residential",
            Category::CommercialOffice => "commercial-office",
            Category::CommercialHotel => "commercial-hotel",
            Category::CommercialMedical => "commercial-medical",
            Category::CommercialRetail => "commercial-retail",
            Category::CommercialWarehouse => "commercial-warehouse",
            Category::Mixed => "mixed",
            Category::Misc => "misc",
            Category::Other(label) => label,
        }
    }

    pub fn is_commercial(&self) -> bool {
        matches!(
            self,
            Category::CommercialOffice
                | Category::CommercialHotel
                | Category::CommercialMedical
                | Category::CommercialRetail
                | Category::CommercialWarehouse
        )
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.as_str() {
            "residential" => Category::Residential,
            "commercial-office" => Category::CommercialOffice,
            "commercial-hotel" => Category::CommercialHotel,
            "commercial-medical" => Category::CommercialMedical,
            "commercial-retail" => Category::CommercialRetail,
            "commercial-warehouse" => Category::CommercialWarehouse,
            "mixed" => Category::Mixed,
            "misc" => Category::Misc,
            _ => Category::Other(label),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence the classifier attached to a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Unknown confidence labels are treated as absent rather than failing the
/// whole result collection.
fn lenient_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(match label.as_deref() {
        None => None,
        Some("high") => Some(Confidence::High),
        Some("medium") => Some(Confidence::Medium),
        Some("low") => Some(Confidence::Low),
        Some(other) => {
            log::warn!("Ignoring unknown confidence label '{}'", other);
            None
        }
    })
}

/// Number of street-view images captured per address.
pub const IMAGES_PER_SET: u32 = 4;

/// Reference to the street-view images captured for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageSet {
    folder: String,
}

impl ImageSet {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// File names of the set: one image every 90 degrees of heading.
    pub fn image_names(&self) -> Vec<String> {
        (0..IMAGES_PER_SET)
            .map(|i| format!("streetview_{}_{}deg.jpg", i, i * 90))
            .collect()
    }
}

/// One classified input row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    #[serde(default)]
    pub street_number: String,
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(rename = "building_type", default)]
    pub category: Option<Category>,
    /// Estimated window-to-wall ratio, in percent.
    #[serde(rename = "wwr_estimate", default)]
    pub ratio_estimate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "images_folder", default)]
    pub image_set: Option<ImageSet>,
}

impl ResultRecord {
    /// Street line, e.g. `350 5th Avenue`.
    pub fn street_line(&self) -> String {
        format!("{} {}", self.street_number, self.street_name)
            .trim()
            .to_string()
    }

    /// `County, ST` when both are known, else whichever is present.
    pub fn locality(&self) -> Option<String> {
        match (&self.county, &self.state) {
            (Some(county), Some(state)) => Some(format!("{}, {}", county, state)),
            (None, Some(state)) => Some(state.clone()),
            _ => None,
        }
    }

    /// Text for the notes column: the row error wins over the reasoning.
    pub fn notes(&self) -> Option<&str> {
        self.error.as_deref().or(self.reasoning.as_deref())
    }
}

/// Body of the JSON results endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsEnvelope {
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_known_label() {
        let category: Category = serde_json::from_str("\"commercial-hotel\"").unwrap();
        assert_eq!(category, Category::CommercialHotel);
        assert!(category.is_commercial());
        assert_eq!(
            serde_json::to_string(&category).unwrap(),
            "\"commercial-hotel\""
        );
    }

    #[test]
    fn test_unknown_category_is_kept() {
        let category: Category = serde_json::from_str("\"industrial\"").unwrap();
        assert_eq!(category, Category::Other("industrial".to_string()));
        assert!(!category.is_recognized());
        assert_eq!(category.to_string(), "industrial");
    }

    #[test]
    fn test_record_with_failure_row() {
        let json = r#"{
            "street_number": "1", "street_name": "Nowhere Rd", "zip_code": "00000",
            "state": null, "county": null, "building_type": null,
            "wwr_estimate": null, "confidence": null, "reasoning": null,
            "images_folder": null,
            "error": "Could not fetch street view images for this address"
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert!(record.category.is_none());
        assert!(record.ratio_estimate.is_none());
        assert_eq!(
            record.notes(),
            Some("Could not fetch street view images for this address")
        );
        assert_eq!(record.locality(), None);
    }

    #[test]
    fn test_record_full_row() {
        let json = r#"{
            "street_number": "350", "street_name": "5th Avenue", "zip_code": "10118",
            "state": "NY", "county": "New York County",
            "building_type": "commercial-office", "wwr_estimate": 45,
            "confidence": "high", "reasoning": "Curtain wall facade",
            "images_folder": "350_5th_Avenue_10118", "error": null
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.category, Some(Category::CommercialOffice));
        assert_eq!(record.ratio_estimate, Some(45.0));
        assert_eq!(record.confidence, Some(Confidence::High));
        assert_eq!(record.street_line(), "350 5th Avenue");
        assert_eq!(record.locality().as_deref(), Some("New York County, NY"));
        assert_eq!(
            record.image_set.as_ref().map(|s| s.folder()),
            Some("350_5th_Avenue_10118")
        );
    }

    #[test]
    fn test_unknown_confidence_is_absent() {
        let json = r#"{"street_number": "1", "street_name": "A", "zip_code": "1",
                       "confidence": "certain"}"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert!(record.confidence.is_none());
    }

    #[test]
    fn test_image_names_follow_heading_convention() {
        let set = ImageSet::new("folder");
        assert_eq!(
            set.image_names(),
            vec![
                "streetview_0_0deg.jpg",
                "streetview_1_90deg.jpg",
                "streetview_2_180deg.jpg",
                "streetview_3_270deg.jpg",
            ]
        );
    }
}
