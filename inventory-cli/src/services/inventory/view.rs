//! Filtered view over the latest query result
//!
//! Holds the full record list of one query and a derived view of it. Filters
//! never reach the datastore; replacing the result resets the view.

use super::models::{InventoryRecord, InventorySummary};
use super::query::{Audience, InventoryQueryService};

/// Search input shorter than this leaves the view unchanged
pub const MIN_SEARCH_LEN: usize = 2;

/// Filter currently applied to the view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    All,
    MissingImage,
    Search(String),
}

#[derive(Debug, Clone, Default)]
pub struct InventoryView {
    records: Vec<InventoryRecord>,
    /// Indices into `records`, in record order
    visible: Vec<usize>,
    filter: ActiveFilter,
    stale: bool,
}

impl InventoryView {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        let mut view = Self::default();
        view.replace_result(records);
        view
    }

    /// Install a new query result, discarding any filter or search
    pub fn replace_result(&mut self, records: Vec<InventoryRecord>) {
        self.records = records;
        self.stale = false;
        self.reset();
    }

    /// Show every record
    pub fn reset(&mut self) {
        self.visible = (0..self.records.len()).collect();
        self.filter = ActiveFilter::All;
    }

    /// Show only records without an image
    pub fn filter_missing_image(&mut self) {
        self.visible = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.has_image())
            .map(|(i, _)| i)
            .collect();
        self.filter = ActiveFilter::MissingImage;
    }

    /// Apply one keystroke's worth of search input.
    ///
    /// Empty input resets. Input shorter than [`MIN_SEARCH_LEN`] characters
    /// leaves the view as it is. Anything longer keeps records whose name
    /// contains the input, ignoring case.
    pub fn search(&mut self, input: &str) {
        if input.is_empty() {
            self.reset();
            return;
        }
        if input.chars().count() < MIN_SEARCH_LEN {
            return;
        }

        let needle = input.to_lowercase();
        self.visible = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.filter = ActiveFilter::Search(input.to_string());
    }

    /// Mark the result as outdated after a mutation changed the sheet
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Re-run the admin query and install its result
    pub async fn refetch(&mut self, query: &InventoryQueryService) {
        let records = query.get_all(Audience::Admin).await;
        log::debug!("Refetched {} records", records.len());
        self.replace_result(records);
    }

    /// Records in the filtered view
    pub fn visible(&self) -> impl Iterator<Item = &InventoryRecord> + '_ {
        self.visible.iter().map(|&i| &self.records[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Record at `index` within the filtered view
    pub fn get(&self, index: usize) -> Option<&InventoryRecord> {
        self.visible.get(index).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Counters over the full result, independent of the active filter
    pub fn summary(&self) -> InventorySummary {
        InventorySummary::from_records(&self.records)
    }

    pub fn filter(&self) -> &ActiveFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sheets::memory::MemorySheet;
    use std::sync::Arc;

    fn record(name: &str, position: u32, image: Option<&str>) -> InventoryRecord {
        InventoryRecord {
            name: name.to_string(),
            category: String::new(),
            price: 0.0,
            rating: 0.0,
            review: String::new(),
            quantity: 0,
            description: String::new(),
            time_stamp: "1".to_string(),
            position,
            image: image.map(str::to_string),
        }
    }

    fn sample() -> InventoryView {
        InventoryView::new(vec![
            record("Widget", 1, Some("https://x/a.jpg")),
            record("Gadget", 2, None),
            record("Gizmo", 3, None),
            record("Big Widget", 4, None),
        ])
    }

    fn names(view: &InventoryView) -> Vec<&str> {
        view.visible().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_new_view_shows_everything() {
        let view = sample();
        assert_eq!(view.visible_len(), 4);
        assert_eq!(view.filter(), &ActiveFilter::All);
    }

    #[test]
    fn test_filter_missing_image() {
        let mut view = sample();
        view.filter_missing_image();
        assert_eq!(names(&view), vec!["Gadget", "Gizmo", "Big Widget"]);
        assert_eq!(view.filter(), &ActiveFilter::MissingImage);
    }

    #[test]
    fn test_single_character_search_is_a_no_op() {
        let mut view = sample();
        view.filter_missing_image();
        view.search("G");
        assert_eq!(names(&view), vec!["Gadget", "Gizmo", "Big Widget"]);
        assert_eq!(view.filter(), &ActiveFilter::MissingImage);
    }

    #[test]
    fn test_empty_search_resets() {
        let mut view = sample();
        view.search("gad");
        view.search("");
        assert_eq!(view.visible_len(), 4);
        assert_eq!(view.filter(), &ActiveFilter::All);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut view = sample();
        view.search("wIdG");
        assert_eq!(names(&view), vec!["Widget", "Big Widget"]);
    }

    #[test]
    fn test_search_searches_full_result_not_current_view() {
        let mut view = sample();
        view.filter_missing_image();
        view.search("widget");
        assert_eq!(names(&view), vec!["Widget", "Big Widget"]);
    }

    #[test]
    fn test_search_counts_characters_not_bytes() {
        let mut view = InventoryView::new(vec![record("Émile", 1, None), record("Other", 2, None)]);
        view.search("é");
        assert_eq!(view.visible_len(), 2);
        view.search("ém");
        assert_eq!(names(&view), vec!["Émile"]);
    }

    #[test]
    fn test_replace_result_discards_filter() {
        let mut view = sample();
        view.filter_missing_image();
        view.invalidate();
        view.replace_result(vec![record("Only", 1, Some("https://x/o.jpg"))]);
        assert_eq!(names(&view), vec!["Only"]);
        assert_eq!(view.filter(), &ActiveFilter::All);
        assert!(!view.is_stale());
    }

    #[test]
    fn test_summary_ignores_filter() {
        let mut view = sample();
        view.search("gizmo");
        let summary = view.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.without_image, 3);
        assert_eq!(view.get(0).map(|r| r.position), Some(3));
        assert!(view.get(1).is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_result() {
        let sheet = Arc::new(MemorySheet::from_strings(
            "inventory",
            &[
                &["name", "category", "price", "rating", "review", "quantity", "description", "timeStamp", "image"],
                &["Widget", "A", "1", "1", "", "1", "", "111", "https://x/a.jpg"],
            ],
        ));
        let query = InventoryQueryService::new(sheet, "inventory");
        let mut view = sample();
        view.filter_missing_image();
        view.invalidate();

        view.refetch(&query).await;

        assert!(!view.is_stale());
        assert_eq!(names(&view), vec!["Widget"]);
        assert_eq!(view.filter(), &ActiveFilter::All);
    }
}
