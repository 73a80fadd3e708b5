/// One page of an ordered result set plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        (self.total.div_ceil(per_page)).max(1) as u32
    }

    pub fn has_pages(&self) -> bool {
        self.last_page() > 1
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    /// 1-based position of the first item on this page, `None` when empty.
    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(u64::from(self.current_page.saturating_sub(1)) * u64::from(self.per_page) + 1)
    }

    pub fn to(&self) -> Option<u64> {
        self.from().map(|from| from + self.items.len() as u64 - 1)
    }

    /// Sliding window of at most `max_pages` page numbers, kept centered on
    /// the current page where the bounds allow.
    pub fn page_window(&self, max_pages: u32) -> Vec<u32> {
        let max_pages = i64::from(max_pages.max(1));
        let current = i64::from(self.current_page);
        let last = i64::from(self.last_page());
        let half = max_pages / 2;

        let start = (current - half).min(last - max_pages + 1).max(1);
        let end = (start + max_pages - 1).min(last);

        (start..=end).map(|page| page as u32).collect()
    }
}
