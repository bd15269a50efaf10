use serde::{Serialize, Serializer};

/// Hosts shown per result page
pub const PAGE_SIZE: usize = 10;

/// Up to this many pages are listed without an ellipsis
const FULL_WINDOW: usize = 5;

/// How the viewport should move after a page change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollBehavior {
    SmoothTop,
}

/// Whatever displays the result list
pub trait Viewport {
    fn scroll_to_top(&mut self, behavior: ScrollBehavior);
}

/// Viewport that only remembers the last scroll request, for JSON responses
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollHint {
    pub scroll: Option<ScrollBehavior>,
}

impl Viewport for ScrollHint {
    fn scroll_to_top(&mut self, behavior: ScrollBehavior) {
        self.scroll = Some(behavior);
    }
}

/// Entry in the page number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageLink::Page(n) => serializer.serialize_u64(*n as u64),
            PageLink::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Client-side pagination over an already fetched result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current: usize,
    total_items: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
            total_items: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// `ceil(total / page_size)`, zero when there is nothing to show
    pub fn total_pages(&self) -> usize {
        (self.total_items + self.page_size - 1) / self.page_size
    }

    /// Track a new result count; falls back to page 1 when the current page vanished
    pub fn sync(&mut self, total_items: usize) {
        self.total_items = total_items;
        if self.current > self.total_pages() {
            self.current = 1;
        }
    }

    /// Jump to a page (clamped to the valid range) and scroll the viewport up
    pub fn go_to(&mut self, target: i64, viewport: &mut dyn Viewport) -> usize {
        let last = self.total_pages().max(1) as i64;
        self.current = target.clamp(1, last) as usize;
        viewport.scroll_to_top(ScrollBehavior::SmoothTop);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Index range of the current page within the full list
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.current - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Current page slice of `items`, which should hold `total_items` entries
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        &items[range.start.min(end)..end]
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    pub fn window(&self) -> Vec<PageLink> {
        page_window(self.current, self.total_pages())
    }
}

/// Page number strip: everything up to five pages, otherwise an ellipsis
/// window around `current` that always keeps the first and last page.
pub fn page_window(current: usize, total: usize) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total <= FULL_WINDOW {
        return (1..=total).map(Page).collect();
    }

    let mut pages = Vec::with_capacity(7);
    if current <= 3 {
        pages.extend((1..=4).map(Page));
        pages.push(Ellipsis);
        pages.push(Page(total));
    } else if current >= total - 2 {
        pages.push(Page(1));
        pages.push(Ellipsis);
        pages.extend((total - 3..=total).map(Page));
    } else {
        pages.push(Page(1));
        pages.push(Ellipsis);
        pages.extend([Page(current - 1), Page(current), Page(current + 1)]);
        pages.push(Ellipsis);
        pages.push(Page(total));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Page};

    #[derive(Default)]
    struct RecordingViewport {
        scrolls: Vec<ScrollBehavior>,
    }

    impl Viewport for RecordingViewport {
        fn scroll_to_top(&mut self, behavior: ScrollBehavior) {
            self.scrolls.push(behavior);
        }
    }

    #[test]
    fn pages_over_23_results() {
        let items: Vec<usize> = (0..23).collect();
        let mut paginator = Paginator::default();
        paginator.sync(items.len());
        assert_eq!(paginator.total_pages(), 3);

        let mut viewport = RecordingViewport::default();
        assert_eq!(paginator.go_to(3, &mut viewport), 3);
        assert_eq!(paginator.slice(&items), &[20, 21, 22]);

        assert_eq!(paginator.go_to(4, &mut viewport), 3);
        assert_eq!(paginator.go_to(0, &mut viewport), 1);
        assert_eq!(paginator.go_to(-7, &mut viewport), 1);
        assert_eq!(paginator.slice(&items), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(viewport.scrolls, vec![ScrollBehavior::SmoothTop; 4]);
    }

    #[test]
    fn empty_results_have_no_pages() {
        let mut paginator = Paginator::default();
        paginator.sync(0);
        assert_eq!(paginator.total_pages(), 0);
        assert!(paginator.slice::<u8>(&[]).is_empty());
        assert!(paginator.window().is_empty());
        assert_eq!(paginator.go_to(5, &mut ScrollHint::default()), 1);
    }

    #[test]
    fn single_result_is_one_page() {
        let mut paginator = Paginator::default();
        paginator.sync(1);
        assert_eq!(paginator.total_pages(), 1);
        assert!(!paginator.has_next());
        assert!(!paginator.has_previous());
    }

    #[test]
    fn shrinking_results_reset_to_first_page() {
        let mut paginator = Paginator::default();
        paginator.sync(45);
        paginator.go_to(5, &mut ScrollHint::default());
        paginator.sync(12);
        assert_eq!(paginator.current_page(), 1);

        paginator.go_to(2, &mut ScrollHint::default());
        paginator.sync(20);
        assert_eq!(paginator.current_page(), 2);
    }

    #[test]
    fn windowing_for_ten_pages() {
        assert_eq!(page_window(1, 10), vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]);
        assert_eq!(page_window(10, 10), vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]);
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn small_totals_list_every_page() {
        assert_eq!(page_window(2, 5), (1..=5).map(Page).collect::<Vec<_>>());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_serializes_ellipsis_as_string() {
        let json = serde_json::to_string(&page_window(1, 6)).unwrap();
        assert_eq!(json, r#"[1,2,3,4,"...",6]"#);
    }

    #[test]
    fn scroll_hint_records_smooth_top() {
        let mut hint = ScrollHint::default();
        let mut paginator = Paginator::default();
        paginator.sync(30);
        paginator.go_to(2, &mut hint);
        assert_eq!(serde_json::to_string(&hint).unwrap(), r#"{"scroll":"smooth-top"}"#);
    }
}
