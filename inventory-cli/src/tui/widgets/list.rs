use crossterm::event::KeyCode;

/// Selection and scrolling state of a table or list
#[derive(Debug, Clone)]
pub struct ListState {
    selected: Option<usize>,
    scroll_offset: usize,
    scroll_off: usize, // Rows from edge before scrolling (like vim scrolloff)
    wrap_around: bool,
    viewport_height: Option<usize>, // Last known viewport height from renderer
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            selected: None,
            scroll_offset: 0,
            scroll_off: 3,
            wrap_around: true,
            viewport_height: None,
        }
    }

    /// Create a new ListState with first item selected
    pub fn with_selection() -> Self {
        Self {
            selected: Some(0),
            ..Self::new()
        }
    }

    /// Set the viewport height (called by renderer with actual area height)
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = Some(height);
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Keep the selection valid after the item count changed
    pub fn clamp(&mut self, item_count: usize) {
        self.selected = match (self.selected, item_count) {
            (_, 0) => None,
            (Some(sel), n) => Some(sel.min(n - 1)),
            (None, _) => Some(0),
        };
        let height = self.viewport_height.unwrap_or(item_count);
        if self.selected.is_none() {
            self.scroll_offset = 0;
        }
        self.update_scroll(height, item_count);
    }

    /// Handle navigation key, returns true if handled.
    /// Uses stored viewport_height if available, otherwise falls back to provided visible_height
    pub fn handle_key(&mut self, key: KeyCode, item_count: usize, visible_height: usize) -> bool {
        if item_count == 0 {
            return false;
        }

        let height = self.viewport_height.unwrap_or(visible_height);

        match key {
            KeyCode::Up => self.move_up(item_count, height),
            KeyCode::Down => self.move_down(item_count, height),
            KeyCode::PageUp => self.page_up(height, item_count),
            KeyCode::PageDown => self.page_down(item_count, height),
            KeyCode::Home => self.select_first(height, item_count),
            KeyCode::End => self.select_last(item_count, height),
            _ => return false,
        }
        true
    }

    fn move_up(&mut self, item_count: usize, visible_height: usize) {
        match self.selected {
            Some(sel) if sel > 0 => self.selected = Some(sel - 1),
            Some(_) if self.wrap_around => self.selected = Some(item_count - 1),
            Some(_) => {}
            None => self.selected = Some(0),
        }
        self.update_scroll(visible_height, item_count);
    }

    fn move_down(&mut self, item_count: usize, visible_height: usize) {
        match self.selected {
            Some(sel) if sel < item_count - 1 => self.selected = Some(sel + 1),
            Some(_) if self.wrap_around => self.selected = Some(0),
            Some(_) => {}
            None => self.selected = Some(0),
        }
        self.update_scroll(visible_height, item_count);
    }

    fn page_up(&mut self, visible_height: usize, item_count: usize) {
        self.selected = Some(
            self.selected
                .map(|sel| sel.saturating_sub(visible_height))
                .unwrap_or(0),
        );
        self.update_scroll(visible_height, item_count);
    }

    fn page_down(&mut self, item_count: usize, visible_height: usize) {
        self.selected = Some(
            self.selected
                .map(|sel| (sel + visible_height).min(item_count - 1))
                .unwrap_or(0),
        );
        self.update_scroll(visible_height, item_count);
    }

    fn select_first(&mut self, visible_height: usize, item_count: usize) {
        self.selected = Some(0);
        self.update_scroll(visible_height, item_count);
    }

    fn select_last(&mut self, item_count: usize, visible_height: usize) {
        self.selected = Some(item_count - 1);
        self.update_scroll(visible_height, item_count);
    }

    /// Update scroll offset so the selection stays visible with scrolloff
    pub fn update_scroll(&mut self, visible_height: usize, item_count: usize) {
        if let Some(sel) = self.selected {
            let min_scroll = sel.saturating_sub(visible_height.saturating_sub(self.scroll_off + 1));
            let max_scroll = sel.saturating_sub(self.scroll_off);

            if self.scroll_offset < min_scroll {
                self.scroll_offset = min_scroll;
            } else if self.scroll_offset > max_scroll {
                self.scroll_offset = max_scroll;
            }

            let max_offset = item_count.saturating_sub(visible_height);
            self.scroll_offset = self.scroll_offset.min(max_offset);
        }
    }
}
