use crate::cache::CacheError;
use crate::error_code::ErrorCode;
use thiserror::Error;

/// Message shown to a caller whose balance does not cover the query.
pub const INSUFFICIENT_CREDITS: &str = "Insufficient credits";

/// Structured error context for logging and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "kv_store.url", "newJob.role")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., upstream status, elapsed time)
    pub details: Option<String>,
    /// Component that raised the error (e.g., "generator", "credit_ledger")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the query service and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {message}{}", format_context(.context))]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Internal error: {message}{}", format_context(.context))]
    Internal {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Upstream error: HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Error::Unauthorized {
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound {
            message: msg.into(),
        }
    }

    pub fn insufficient_credits() -> Self {
        Error::Forbidden {
            message: INSUFFICIENT_CREDITS.to_string(),
        }
    }

    pub fn internal_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Internal {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Procedure-level classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidInput { .. } => ErrorCode::BadRequest,
            Error::Unauthorized { .. } => ErrorCode::Unauthorized,
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::Forbidden { .. } => ErrorCode::Forbidden,
            Error::Upstream { status, .. } => ErrorCode::from_http_status(*status),
            Error::Transport(e) if e.is_timeout() => ErrorCode::Timeout,
            Error::Internal { .. }
            | Error::Configuration { .. }
            | Error::Transport(_)
            | Error::Serialization(_)
            | Error::Cache(_) => ErrorCode::InternalServerError,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidInput { context, .. }
            | Error::Internal { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
