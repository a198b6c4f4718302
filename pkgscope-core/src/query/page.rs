use serde::Serialize;

/// One page of results plus the counts a pager needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Results after filtering, before pagination
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, page: usize, per_page: usize) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        }
    }

    /// 1-based index range shown on this page, `None` when empty
    pub fn item_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page - 1) * self.per_page + 1;
        Some((first, first + self.items.len() - 1))
    }
}

/// Page count for a result size; an empty result still has one page
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if total == 0 || per_page == 0 {
        1
    } else {
        total.div_ceil(per_page)
    }
}
