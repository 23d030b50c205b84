//! Tool-name parsing for the transform dispatch.
//!
//! Clients send the human-facing tool label (`"Merge PDF"`, `"Split PDF"`,
//! `"Compress PDF"`). Anything else, including tools that exist in the UI
//! but have no backend (`"PDF to Word"`, `"Protect PDF"`), resolves to
//! `UnsupportedOperation`.

use serde::Serialize;

use crate::error::TransformError;

/// Tool names the product surface advertises but the engine does not
/// implement. They parse to `UnsupportedOperation` like any unknown name;
/// the list exists so tests can pin that behavior.
pub const PLANNED_TOOLS: &[&str] = &["PDF to Word", "Word to PDF", "Protect PDF", "Unlock PDF"];

/// An implemented document transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Merge,
    Split,
    Compress,
}

impl Operation {
    /// Resolve a client-supplied tool name. Empty names are an
    /// `InvalidRequest`; unknown or not-yet-implemented names are
    /// `UnsupportedOperation`.
    pub fn parse(tool: &str) -> Result<Self, TransformError> {
        let tool = tool.trim();
        if tool.is_empty() {
            return Err(TransformError::InvalidRequest(
                "no operation name given".into(),
            ));
        }
        match tool.to_lowercase().as_str() {
            "merge pdf" | "merge" => Ok(Operation::Merge),
            "split pdf" | "split" => Ok(Operation::Split),
            "compress pdf" | "compress" => Ok(Operation::Compress),
            _ => Err(TransformError::UnsupportedOperation(tool.to_string())),
        }
    }

    /// Human-facing label, as shown in the client UI.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Merge => "Merge PDF",
            Operation::Split => "Split PDF",
            Operation::Compress => "Compress PDF",
        }
    }

    /// Short lowercase form, used in generated artifact names.
    pub fn slug(&self) -> &'static str {
        match self {
            Operation::Merge => "merge",
            Operation::Split => "split",
            Operation::Compress => "compress",
        }
    }

    /// Suggested filename for the operation's output, derived from the
    /// label with whitespace collapsed to underscores.
    pub fn attachment_name(&self) -> String {
        let ext = match self {
            Operation::Split => "zip",
            _ => "pdf",
        };
        format!("{}.{}", self.label().replace(' ', "_"), ext)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_tool_names() {
        assert_eq!(Operation::parse("Merge PDF").unwrap(), Operation::Merge);
        assert_eq!(Operation::parse("Split PDF").unwrap(), Operation::Split);
        assert_eq!(
            Operation::parse("Compress PDF").unwrap(),
            Operation::Compress
        );
    }

    #[test]
    fn parses_short_forms_case_insensitively() {
        assert_eq!(Operation::parse("merge").unwrap(), Operation::Merge);
        assert_eq!(Operation::parse("  SPLIT  ").unwrap(), Operation::Split);
    }

    #[test]
    fn empty_name_is_invalid_request() {
        assert!(matches!(
            Operation::parse("   "),
            Err(TransformError::InvalidRequest(_))
        ));
    }

    #[test]
    fn planned_tools_are_unsupported() {
        for tool in PLANNED_TOOLS {
            match Operation::parse(tool) {
                Err(TransformError::UnsupportedOperation(name)) => assert_eq!(&name, tool),
                other => panic!("expected UnsupportedOperation for {tool}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_name_is_unsupported() {
        assert!(matches!(
            Operation::parse("Rotate PDF"),
            Err(TransformError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn attachment_names_match_labels() {
        assert_eq!(Operation::Merge.attachment_name(), "Merge_PDF.pdf");
        assert_eq!(Operation::Split.attachment_name(), "Split_PDF.zip");
        assert_eq!(Operation::Compress.attachment_name(), "Compress_PDF.pdf");
    }
}
