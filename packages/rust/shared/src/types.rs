//! Core domain types: verse records and translation targets.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VerseRecord
// ---------------------------------------------------------------------------

/// One verse in the app's bundled chapter format.
///
/// A chapter file is a JSON array of these, sorted ascending by `verse`
/// with each verse number appearing once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// Verse number, starting at 1.
    pub verse: u32,
    /// Plain verse text.
    pub text: String,
}

impl VerseRecord {
    pub fn new(verse: u32, text: impl Into<String>) -> Self {
        Self {
            verse,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationTarget
// ---------------------------------------------------------------------------

/// Maps a remote API translation ID to the output folder the app reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTarget {
    /// Translation identifier used in API URLs (e.g. `BSB`).
    pub api_id: String,
    /// Folder name under the output directory (e.g. `bsb`).
    pub folder: String,
}

impl TranslationTarget {
    pub fn new(api_id: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            folder: folder.into(),
        }
    }
}

impl std::str::FromStr for TranslationTarget {
    type Err = String;

    /// Parse `API_ID` or `API_ID:folder`. Without a folder the lowercased
    /// API ID is used.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (api_id, folder) = match s.split_once(':') {
            Some((api_id, folder)) => (api_id.trim(), folder.trim()),
            None => (s.trim(), ""),
        };

        if api_id.is_empty() {
            return Err(format!("invalid translation '{s}': empty API id"));
        }

        let folder = if folder.is_empty() {
            api_id.to_lowercase()
        } else {
            folder.to_string()
        };

        Ok(Self::new(api_id, folder))
    }
}
