/// Position and size of an item currently on screen, relative to the top of
/// the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleItem {
    pub index: usize,
    pub offset: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutInfo {
    pub visible_items: Vec<VisibleItem>,
    pub total_items_count: usize,
    pub viewport_size: f32,
}

/// The slice of a vertical list's scroll state the gesture controller needs.
///
/// Positive deltas scroll forward (content moves up, later items come into
/// view).
pub trait ScrollableList {
    fn can_scroll_forward(&self) -> bool;
    fn can_scroll_backward(&self) -> bool;
    /// Scrolls by `delta` and returns the part of it actually consumed.
    fn scroll_by(&mut self, delta: f32) -> f32;
    fn first_visible_item_index(&self) -> usize;
    /// How far the first visible item is scrolled past the viewport top.
    fn first_visible_item_scroll_offset(&self) -> f32;
    fn layout_info(&self) -> LayoutInfo;
}

/// Scroll state of a vertical list with known item heights.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    item_heights: Vec<f32>,
    spacing: f32,
    viewport_height: f32,
    scroll_offset: f32,
}

impl ListState {
    pub fn new(item_heights: Vec<f32>, spacing: f32, viewport_height: f32) -> Self {
        Self {
            item_heights,
            spacing: spacing.max(0.0),
            viewport_height: viewport_height.max(0.0),
            scroll_offset: 0.0,
        }
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn item_count(&self) -> usize {
        self.item_heights.len()
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn content_height(&self) -> f32 {
        let items: f32 = self.item_heights.iter().sum();
        let gaps = self.item_heights.len().saturating_sub(1) as f32 * self.spacing;
        items + gaps
    }

    pub fn max_scroll_offset(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    /// Replaces the item heights, keeping the offset inside the new content.
    pub fn set_item_heights(&mut self, item_heights: Vec<f32>) {
        self.item_heights = item_heights;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height.max(0.0);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    /// Start position of every item in content coordinates.
    fn item_starts(&self) -> impl Iterator<Item = (usize, f32, f32)> + '_ {
        let spacing = self.spacing;
        self.item_heights
            .iter()
            .scan(0.0f32, move |start, &height| {
                let item_start = *start;
                *start += height + spacing;
                Some((item_start, height))
            })
            .enumerate()
            .map(|(index, (start, height))| (index, start, height))
    }

    fn first_visible(&self) -> Option<(usize, f32)> {
        self.item_starts()
            .find(|&(_, start, height)| start + height > self.scroll_offset)
            .map(|(index, start, _)| (index, start))
    }
}

impl ScrollableList for ListState {
    fn can_scroll_forward(&self) -> bool {
        self.scroll_offset < self.max_scroll_offset()
    }

    fn can_scroll_backward(&self) -> bool {
        self.scroll_offset > 0.0
    }

    fn scroll_by(&mut self, delta: f32) -> f32 {
        let previous = self.scroll_offset;
        self.scroll_offset = (previous + delta).clamp(0.0, self.max_scroll_offset());
        self.scroll_offset - previous
    }

    fn first_visible_item_index(&self) -> usize {
        self.first_visible().map_or(0, |(index, _)| index)
    }

    fn first_visible_item_scroll_offset(&self) -> f32 {
        self.first_visible()
            .map_or(0.0, |(_, start)| (self.scroll_offset - start).max(0.0))
    }

    fn layout_info(&self) -> LayoutInfo {
        let top = self.scroll_offset;
        let bottom = top + self.viewport_height;
        let visible_items = self
            .item_starts()
            .skip_while(|&(_, start, height)| start + height <= top)
            .take_while(|&(_, start, _)| start < bottom)
            .map(|(index, start, size)| VisibleItem {
                index,
                offset: start - top,
                size,
            })
            .collect();
        LayoutInfo {
            visible_items,
            total_items_count: self.item_heights.len(),
            viewport_size: self.viewport_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages() -> ListState {
        // 5 items of 300 with 20 between: content 1580
        ListState::new(vec![300.0; 5], 20.0, 500.0)
    }

    #[test]
    fn content_and_bounds() {
        let list = pages();
        assert_eq!(list.content_height(), 1580.0);
        assert_eq!(list.max_scroll_offset(), 1080.0);
        assert!(list.can_scroll_forward());
        assert!(!list.can_scroll_backward());
    }

    #[test]
    fn scroll_by_reports_consumed_part() {
        let mut list = pages();
        assert_eq!(list.scroll_by(-50.0), 0.0);
        assert_eq!(list.scroll_by(100.0), 100.0);
        assert_eq!(list.scroll_by(5000.0), 980.0);
        assert!(!list.can_scroll_forward());
        assert!(list.can_scroll_backward());
    }

    #[test]
    fn first_visible_item_tracks_offset() {
        let mut list = pages();
        list.scroll_by(330.0);
        assert_eq!(list.first_visible_item_index(), 1);
        assert_eq!(list.first_visible_item_scroll_offset(), 10.0);

        // Inside the gap after item 1
        list.scroll_by(300.0);
        assert_eq!(list.first_visible_item_index(), 2);
        assert_eq!(list.first_visible_item_scroll_offset(), 0.0);
    }

    #[test]
    fn layout_info_lists_items_on_screen() {
        let mut list = pages();
        list.scroll_by(250.0);
        let info = list.layout_info();
        assert_eq!(info.total_items_count, 5);
        assert_eq!(
            info.visible_items,
            vec![
                VisibleItem {
                    index: 0,
                    offset: -250.0,
                    size: 300.0
                },
                VisibleItem {
                    index: 1,
                    offset: 70.0,
                    size: 300.0
                },
                VisibleItem {
                    index: 2,
                    offset: 390.0,
                    size: 300.0
                },
            ]
        );
    }

    #[test]
    fn short_content_cannot_scroll() {
        let mut list = ListState::new(vec![100.0], 0.0, 500.0);
        assert!(!list.can_scroll_forward());
        assert_eq!(list.scroll_by(10.0), 0.0);
    }

    #[test]
    fn shrinking_content_clamps_offset() {
        let mut list = pages();
        list.scroll_by(1000.0);
        list.set_item_heights(vec![300.0, 300.0]);
        assert_eq!(list.scroll_offset(), 120.0);
    }
}
