use serde::{Deserialize, Serialize};

/// Every listing returns at most this many items.
pub const PAGE_SIZE: i64 = 10;

/// `?page=N`, 1-based. Missing or zero means the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn number(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.number()) - 1) * PAGE_SIZE
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, count: i64) -> Self {
        Self {
            items,
            page,
            total_pages: total_pages(count),
            count,
        }
    }
}

fn total_pages(count: i64) -> u32 {
    let pages = (count + PAGE_SIZE - 1) / PAGE_SIZE;
    pages.max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_clamps_to_first_page() {
        let q = PageQuery { page: Some(0) };
        assert_eq!(q.number(), 1);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn offset_steps_by_page_size() {
        let q = PageQuery { page: Some(3) };
        assert_eq!(q.offset(), 2 * PAGE_SIZE);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(25), 3);
    }
}
