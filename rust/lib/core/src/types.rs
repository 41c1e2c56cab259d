use serde::{Deserialize, Serialize};

/// Parameters for paged backend queries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    500
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ListParams {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Parameters for the page after one that returned `returned` items.
    pub fn next_page(&self, returned: usize) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + returned,
        }
    }
}

/// Result wrapper for paged queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    /// Total matches across all pages.
    pub total: usize,
}

impl<T> ListResult<T> {
    /// Slice one page out of a complete, ordered result set.
    pub fn paginate(all: Vec<T>, params: &ListParams) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();
        Self { items, total }
    }
}
