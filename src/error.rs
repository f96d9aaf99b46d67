//! Error taxonomy shared by every pipeline stage.
//!
//! Each variant maps to a process exit code so the binary can report failures
//! without inspecting message text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Unparsable or ragged assay text.
    #[error("Malformed assay input: {0}")]
    MalformedInput(String),

    /// Non-positive or zero-denominator reaction parameters.
    #[error("Invalid reaction parameter: {0}")]
    InvalidParameter(String),

    /// Optimizer failure or insufficient data.
    #[error("Fit did not converge: {0}")]
    FitConvergence(String),

    /// Division by a zero fitted parameter, or zero variance in R².
    #[error("Degenerate parameter: {0}")]
    DegenerateParameter(String),

    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error ({context}): {message}")]
    Serialization { context: String, message: String },
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn convergence(message: impl Into<String>) -> Self {
        Self::FitConvergence(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateParameter(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn serialization(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MalformedInput(_) | AppError::Io { .. } | AppError::Serialization { .. } => 2,
            AppError::InvalidParameter(_) => 3,
            AppError::FitConvergence(_) => 4,
            AppError::DegenerateParameter(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_numeric_failure() {
        let codes = [
            AppError::malformed("x").exit_code(),
            AppError::invalid("x").exit_code(),
            AppError::convergence("x").exit_code(),
            AppError::degenerate("x").exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn display_includes_category_and_detail() {
        let err = AppError::convergence("singular Jacobian");
        assert_eq!(err.to_string(), "Fit did not converge: singular Jacobian");
    }
}
