//! Inventory record types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Extension every derived image filename carries
pub const IMAGE_EXTENSION: &str = "jpg";

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9]").expect("static pattern is valid")
});

/// One inventory item as represented by a spreadsheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub review: String,
    pub quantity: i64,
    pub description: String,
    /// Opaque token used when deriving the image filename
    pub time_stamp: String,
    /// 1-based offset within the header-excluded rows
    pub position: u32,
    /// Public URL of the assigned image, if any
    pub image: Option<String>,
}

impl InventoryRecord {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Canonical filename for this record's image
    pub fn image_filename(&self) -> String {
        image_filename(&self.name, &self.time_stamp)
    }

    /// Key of the stored asset, taken from the last path segment of the image URL
    pub fn image_key(&self) -> Option<&str> {
        self.image.as_deref().and_then(asset_key_from_url)
    }
}

/// Derive the image filename for an item name and timestamp token.
///
/// Every character that is not an ASCII letter or digit becomes `_`, the result
/// is lower-cased and suffixed with `-{time_stamp}.jpg`.
pub fn image_filename(name: &str, time_stamp: &str) -> String {
    let stem = NON_ALPHANUMERIC.replace_all(name, "_").to_lowercase();
    format!("{}-{}.{}", stem, time_stamp, IMAGE_EXTENSION)
}

/// Last non-empty path segment of an asset URL
pub fn asset_key_from_url(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

/// Counters shown above the inventory table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total: usize,
    pub without_image: usize,
}

impl InventorySummary {
    pub fn from_records(records: &[InventoryRecord]) -> Self {
        Self {
            total: records.len(),
            without_image: records.iter().filter(|r| !r.has_image()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_filename_replaces_non_alphanumerics() {
        assert_eq!(image_filename("Red Widget", "111"), "red_widget-111.jpg");
        assert_eq!(image_filename("A&B (XL)", "42"), "a_b__xl_-42.jpg");
    }

    #[test]
    fn test_image_filename_replaces_each_non_ascii_char() {
        assert_eq!(image_filename("Café", "7"), "caf_-7.jpg");
    }

    #[test]
    fn test_image_filename_empty_inputs() {
        assert_eq!(image_filename("", ""), "-.jpg");
    }

    #[test]
    fn test_asset_key_from_url() {
        assert_eq!(asset_key_from_url("https://x/a.jpg"), Some("a.jpg"));
        assert_eq!(
            asset_key_from_url("https://utfs.io/f/abc123-widget.jpg?v=2"),
            Some("abc123-widget.jpg")
        );
        assert_eq!(asset_key_from_url("https://utfs.io/f/key/"), Some("key"));
        assert_eq!(asset_key_from_url("https://"), None);
    }

    #[test]
    fn test_summary_counts_missing_images() {
        let mut with_image = sample("Widget", 1);
        with_image.image = Some("https://x/a.jpg".to_string());
        let without_image = sample("Gadget", 2);

        let summary = InventorySummary::from_records(&[with_image, without_image]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.without_image, 1);
    }

    fn sample(name: &str, position: u32) -> InventoryRecord {
        InventoryRecord {
            name: name.to_string(),
            category: String::new(),
            price: 0.0,
            rating: 0.0,
            review: String::new(),
            quantity: 0,
            description: String::new(),
            time_stamp: String::new(),
            position,
            image: None,
        }
    }
}
