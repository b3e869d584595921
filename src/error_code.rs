//! Procedure error codes.
//!
//! Every [`Error`](crate::Error) maps onto one of these codes so that an RPC
//! layer can render a stable error class to the client without inspecting the
//! error message.
//!
//! | Code                    | HTTP | Raised for                               |
//! |-------------------------|------|------------------------------------------|
//! | `BAD_REQUEST`           | 400  | Blank query, malformed input             |
//! | `UNAUTHORIZED`          | 401  | Missing caller identity                  |
//! | `FORBIDDEN`             | 403  | Insufficient credit balance              |
//! | `NOT_FOUND`             | 404  | User record does not exist               |
//! | `TIMEOUT`               | 408  | Upstream call exceeded its deadline      |
//! | `INTERNAL_SERVER_ERROR` | 500  | Model failure, schema violation, config  |
//!
//! ## Example
//!
//! ```rust
//! use talent_query::error_code::ErrorCode;
//!
//! let code = ErrorCode::from_http_status(403);
//! assert_eq!(code, ErrorCode::Forbidden);
//! assert_eq!(code.as_str(), "FORBIDDEN");
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    InternalServerError,
}

impl ErrorCode {
    /// Returns the wire name (e.g., `"NOT_FOUND"`).
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    #[inline]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Timeout => 408,
            Self::InternalServerError => 500,
        }
    }

    /// Maps an upstream HTTP status to the closest code.
    ///
    /// Statuses without a direct mapping are treated as internal errors, since
    /// from the caller's point of view an upstream fault is ours.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 413 | 422 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            _ => Self::InternalServerError,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
