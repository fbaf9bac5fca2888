//! Error types for pbxpatch-edit.
//!
//! Every variant is fatal for a migration run: the document's structure is not
//! what the engine can safely edit, so nothing may be written.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Unbalanced or nested section markers, undecodable content, or a
    /// missing `objects` dictionary.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// The object graph and the line view disagree about an identifier.
    #[error("locator mismatch: {id} ({isa}) {message}")]
    LocatorMismatch {
        id: String,
        isa: String,
        message: String,
    },

    #[error("section `{section}` not found")]
    SectionNotFound { section: String },

    #[error("record {id} not found in section `{section}`")]
    RecordNotFound { section: String, id: String },

    #[error("field `{field}` not found in record {id}")]
    FieldNotFound { id: String, field: String },
}

impl EditError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EditError::MalformedDocument {
            message: message.into(),
        }
    }

    /// Actionable fallback for the user when the engine gives up.
    pub fn manual_fallback(&self) -> String {
        match self {
            EditError::MalformedDocument { .. } | EditError::LocatorMismatch { .. } => {
                "the project file could not be parsed reliably; open it in Xcode, \
                 let Xcode re-save it, or add the package dependency manually"
                    .to_string()
            }
            EditError::SectionNotFound { section } => {
                format!("add the `{section}` section manually, then re-run")
            }
            EditError::RecordNotFound { section, id } => {
                format!("add record {id} to the `{section}` section manually, then re-run")
            }
            EditError::FieldNotFound { id, field } => {
                format!("add the `{field}` list to record {id} manually, then re-run")
            }
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::EditError;

    #[test]
    fn display_includes_variant_context() {
        let err = EditError::RecordNotFound {
            section: "PBXNativeTarget".to_string(),
            id: "Runner".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "record Runner not found in section `PBXNativeTarget`"
        );
    }

    #[test]
    fn fallback_names_the_missing_anchor() {
        let err = EditError::FieldNotFound {
            id: "97C146ED1CF9000F007C117D".to_string(),
            field: "files".to_string(),
        };
        assert!(err.manual_fallback().contains("`files`"));

        let err = EditError::malformed("boom");
        assert!(err.to_string().contains("malformed document"));
        assert!(err.manual_fallback().contains("manually"));
    }
}
