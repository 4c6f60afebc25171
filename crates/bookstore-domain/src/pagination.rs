//! Pagination and sort direction types.

/// Sort direction of one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Desc,
    Asc,
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One page of a list: `page` ≥ 1, `page_size` in 1..=[`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Page `page` of `page_size` rows, clamped into range.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// The page a list request asked for. Lists are unpaged unless the caller names a page
    /// or a page size; a missing half falls back to its default.
    pub fn requested(page: Option<u32>, page_size: Option<u32>) -> Option<Self> {
        if page.is_none() && page_size.is_none() {
            return None;
        }
        Some(Self::new(
            page.unwrap_or(1),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        ))
    }

    /// Number of rows to skip.
    pub fn offset(self) -> u64 {
        let Self { page, page_size } = Self::new(self.page, self.page_size);
        u64::from(page - 1) * u64::from(page_size)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}
