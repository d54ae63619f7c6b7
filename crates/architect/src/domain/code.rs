use std::fmt;

use crate::error::{ArchitectError, ArchitectResult};

/// Markdown fence markers the generator may emit despite instructions.
/// The language-tagged opener must be stripped before the bare fence.
const FENCE_MARKERS: &[&str] = &["```python", "```"];

/// Source text produced by the code generator. Never empty.
///
/// Replaced wholesale on refactor, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode(String);

impl GeneratedCode {
    /// Clean raw model output: trim and drop fence markers.
    ///
    /// Fails with [`ArchitectError::Generation`] if nothing is left.
    pub fn from_raw(raw: &str) -> ArchitectResult<Self> {
        let mut text = raw.trim().to_string();
        for marker in FENCE_MARKERS {
            text = text.replace(marker, "");
        }
        let text = text.trim();

        if text.is_empty() {
            return Err(ArchitectError::Generation(
                "generator returned empty response".to_string(),
            ));
        }

        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
