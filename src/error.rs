use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Negative or non-finite surface size.
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    /// Bars, scales, margins or primitives that cannot be laid out or drawn.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A request form field that does not parse or breaks a range rule.
    #[error("invalid `{field}`: {reason}")]
    InvalidQuery { field: &'static str, reason: String },

    #[error("{context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Paint backend failure (surface or context creation, stroke, fill).
    #[error("render backend: {0}")]
    Backend(String),
}

impl ChartError {
    pub(crate) fn json(context: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Json { context, source }
    }

    pub(crate) fn query(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            field,
            reason: reason.into(),
        }
    }
}
