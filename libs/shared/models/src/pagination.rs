use serde::{Deserialize, Serialize};

/// The page the caller wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: 10 }
    }
}

/// Counts reported by the backend alongside a page of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub info: PageInfo,
}

/// Tracks pagination state for a list view and keeps it in sync with URL
/// query parameters. Page changes are single-flight: a new change is
/// refused until the previous fetch settles via `complete` or `abort`.
#[derive(Debug, Clone)]
pub struct Paginator {
    request: PageRequest,
    info: PageInfo,
    in_flight: bool,
    clean_url_on_first_page: bool,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageRequest::default())
    }
}

impl Paginator {
    pub fn new(initial: PageRequest) -> Self {
        Self {
            request: initial,
            info: PageInfo::default(),
            in_flight: false,
            clean_url_on_first_page: true,
        }
    }

    pub fn with_clean_first_page(mut self, clean: bool) -> Self {
        self.clean_url_on_first_page = clean;
        self
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn info(&self) -> PageInfo {
        self.info
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a page change. Returns the request to issue, or `None` when a
    /// change is already in flight or the page is out of range.
    pub fn begin_change(&mut self, page: u32) -> Option<PageRequest> {
        self.begin_change_with_size(page, self.request.page_size)
    }

    pub fn begin_change_with_size(&mut self, page: u32, page_size: u32) -> Option<PageRequest> {
        if self.in_flight || page == 0 || page_size == 0 {
            return None;
        }
        if self.info.total_pages > 0 && page > self.info.total_pages {
            return None;
        }

        self.request = PageRequest { page, page_size };
        self.in_flight = true;
        Some(self.request)
    }

    /// Settle an in-flight change with the counts the backend reported.
    pub fn complete(&mut self, info: PageInfo) {
        self.info = info;
        self.request = PageRequest {
            page: info.page.max(1),
            page_size: if info.page_size > 0 { info.page_size } else { self.request.page_size },
        };
        self.in_flight = false;
    }

    /// The fetch failed; keep the previous counts and allow a retry.
    pub fn abort(&mut self) {
        self.in_flight = false;
    }

    /// Build URL query pairs for the current request. The first page with no
    /// additional filters produces an empty set so the URL stays clean.
    pub fn query_pairs(&self, additional: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = additional
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let clean = self.clean_url_on_first_page && self.request.page == 1 && pairs.is_empty();
        if !clean {
            pairs.push(("page".to_string(), self.request.page.to_string()));
            pairs.push(("pageSize".to_string(), self.request.page_size.to_string()));
        }

        pairs
    }

    pub fn query_string(&self, additional: &[(&str, &str)]) -> String {
        let pairs = self.query_pairs(additional);
        if pairs.is_empty() {
            return String::new();
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
