use thiserror::Error;

use crate::repository::RepositoryError;

/// Failure of a translator operation.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The storage backend failed; `op` names the translator operation.
    #[error("{op}: {source}")]
    Repository {
        op: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl TranslationError {
    pub(crate) fn repository(op: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| TranslationError::Repository { op, source }
    }

    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        match self {
            TranslationError::Repository { op, .. } => *op,
        }
    }
}

pub type Result<T, E = TranslationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_includes_operation() {
        let err = TranslationError::repository("translator.save_translations")(
            RepositoryError::Backend("timeout".to_string()),
        );
        assert_eq!(err.to_string(), "translator.save_translations: timeout");
        assert_eq!(err.op(), "translator.save_translations");
        assert!(err.source().is_some());
    }
}
