//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `Page<T>`: pagination envelope
//! - `error_codes`: Standard error code constants

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Page/size query parameters (`?page=0&size=10`)
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

impl PageParams {
    /// Page size clamped to 1..=100, page clamped to >= 0
    pub fn normalized(self) -> (i64, i64) {
        (self.page.max(0), self.size.clamp(1, 100))
    }

    pub fn offset(self) -> i64 {
        let (page, size) = self.normalized();
        page * size
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
        }
    }
}

/// One page of results plus the total row count
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let (page, size) = params.normalized();
        Self {
            items,
            page,
            size,
            total,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const ACCESS_DENIED: i32 = 2003;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_shape() {
        let resp = ApiResponse::success(42);
        assert_eq!(resp.code, 0);
        assert_eq!(resp.msg, "ok");
        assert_eq!(resp.data, Some(42));
    }

    #[test]
    fn test_error_response_has_no_data() {
        let resp = ApiResponse::<()>::error(error_codes::NOT_FOUND, "Card not found");
        assert_eq!(resp.code, error_codes::NOT_FOUND);
        assert!(resp.data.is_none());

        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("data"), "null data must be omitted");
    }

    #[test]
    fn test_page_params_normalization() {
        let params = PageParams { page: -3, size: 0 };
        assert_eq!(params.normalized(), (0, 1));

        let params = PageParams {
            page: 2,
            size: 5000,
        };
        assert_eq!(params.normalized(), (2, 100));
        assert_eq!(params.offset(), 200);
    }
}
