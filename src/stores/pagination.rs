//! Filter and paging state for server-paginated lists, plus chunking for
//! lists that are paginated in memory.

/// Default page size of the customer and order lists.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PageState<F> {
    pub filters: F,
    pub limit: u32,
    pub offset: u32,
    /// 1-based.
    pub current_page: u32,
}

impl<F: Default> Default for PageState<F> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<F: Default> PageState<F> {
    pub fn new(limit: u32) -> Self {
        Self {
            filters: F::default(),
            limit: limit.max(1),
            offset: 0,
            current_page: 1,
        }
    }

    /// Reset filters and paging, keeping the page size.
    pub fn clear(&mut self) {
        self.filters = F::default();
        self.offset = 0;
        self.current_page = 1;
    }
}

impl<F> PageState<F> {
    /// Replace the filters and go back to the first page.
    pub fn set_filters(&mut self, filters: F) {
        self.filters = filters;
        self.offset = 0;
        self.current_page = 1;
    }

    /// Jump to `page` (1-based; 0 is treated as 1).
    pub fn go_to_page(&mut self, page: u32) {
        let page = page.max(1);
        self.current_page = page;
        self.offset = (page - 1).saturating_mul(self.limit);
    }

    /// Pages needed for `total` items; at least 1 so an empty list still
    /// shows a page.
    pub fn total_pages(&self, total: u64) -> u32 {
        let limit = u64::from(self.limit.max(1));
        let pages = total.div_ceil(limit).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.current_page < self.total_pages(total)
    }
}

/// Split `items` into pages of `per_page` (a size of 0 is treated as 1).
pub fn paginate<T: Clone>(items: &[T], per_page: usize) -> Vec<Vec<T>> {
    items.chunks(per_page.max(1)).map(<[T]>::to_vec).collect()
}
