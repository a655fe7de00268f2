//! Page/limit handling shared by list endpoints.

use bookshelf_http::Links;
use bookshelf_kernel::settings::PaginationSettings;
use serde::Deserialize;

/// Raw `?page=&limit=` query. Kept as text so that junk values fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn from_params(params: &PageParams, settings: &PaginationSettings) -> Self {
        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(params.limit.as_deref())
            .unwrap_or(settings.default_limit)
            .min(settings.max_limit);
        Self { page, limit }
    }

    /// Number of records before this page
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    /// `self`, plus `next`/`prev` when those pages exist
    pub fn links(&self, base_path: &str, total: u64) -> Links {
        let total_pages = self.total_pages(total);
        let href = |page: u64| format!("{}?page={}&limit={}", base_path, page, self.limit);
        Links {
            self_link: href(self.page),
            next: (self.page < total_pages).then(|| href(self.page + 1)),
            prev: (self.page > 1).then(|| href(self.page - 1)),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|value| *value > 0)
}
