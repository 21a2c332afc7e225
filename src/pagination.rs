//! Fixed-size, 1-based offset pagination.

use serde::Deserialize;

pub const PAGE_SIZE: usize = 10;

/// The `?page=N` query parameter. Missing means the first page.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "first_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

/// Returns items `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)`. Pages below 1 and
/// pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: i64) -> Vec<T> {
    let Some(start) = page
        .checked_sub(1)
        .and_then(|p| usize::try_from(p).ok())
        .and_then(|p| p.checked_mul(PAGE_SIZE))
    else {
        return Vec::new();
    };
    items.into_iter().skip(start).take(PAGE_SIZE).collect()
}
