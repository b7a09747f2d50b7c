/// Success envelope and pagination helpers
///
/// Every successful response carries the same JSON shape:
///
/// ```json
/// {
///   "success": true,
///   "message": "Task created",
///   "data": { ... },
///   "pagination": { "page": 1, "limit": 20, "total": 57, "total_pages": 3 }
/// }
/// ```
///
/// `message` and `pagination` are omitted when absent. Handlers build the
/// envelope through the constructors here and return `Json<ApiResponse<T>>`.

use axum::extract::Query;
use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest accepted page size
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Uniform success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Always true; error bodies carry `success: false`
    pub success: bool,

    /// Optional human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Present on paginated list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload with no message
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    /// Wraps a payload with a message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }

    /// Wraps a page of results
    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// A message-only envelope, used by deletes
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

/// Pagination metadata on list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-based)
    pub page: i64,

    /// Page size
    pub limit: i64,

    /// Total matching rows
    pub total: i64,

    /// Total number of pages
    pub total_pages: i64,
}

impl Pagination {
    /// Builds pagination metadata from a page request and a total count
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Query parameters accepted by list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    /// Page number, 1-based
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,
}

impl PageParams {
    /// Normalizes raw query parameters into (page, limit, offset)
    ///
    /// Pages below 1 clamp to 1; limits clamp to [1, MAX_PAGE_LIMIT].
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = (page - 1) * limit;

        (page, limit, offset)
    }
}

/// Convenience alias for extracting page parameters
pub type PageQuery = Query<PageParams>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_arithmetic() {
        let p = Pagination::new(1, 20, 57);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(1, 20, 60);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(1, 20, 61);
        assert_eq!(p.total_pages, 4);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn test_page_params_normalize() {
        let params = PageParams {
            page: None,
            limit: None,
        };
        assert_eq!(params.normalize(), (1, DEFAULT_PAGE_LIMIT, 0));

        let params = PageParams {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(params.normalize(), (3, 10, 20));

        // Out-of-range values clamp rather than error
        let params = PageParams {
            page: Some(-4),
            limit: Some(100_000),
        };
        assert_eq!(params.normalize(), (1, MAX_PAGE_LIMIT, 0));
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ApiResponse::with_message(serde_json::json!({"id": 1}), "Created");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Created");
        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_message_only_envelope() {
        let envelope = ApiResponse::message("Task deleted");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Task deleted");
        assert!(json.get("data").is_none());
    }
}
