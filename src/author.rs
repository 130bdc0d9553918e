//! Personal author identity.
//!
//! Authors come out of the archive database with an optional first name, an
//! optional last name and a free-form title ("Reich Minister of Justice",
//! "Defense Counsel", ...). Everything shown about an author on the site is
//! keyed off two derived values:
//!
//! - **Full name**: first and last name joined with a single space. Either
//!   part may be missing; legacy rows often carry only a surname.
//! - **Slug**: the full name reduced to a URL-safe, lowercase, dash-separated
//!   form. `"First Name: So Many #$ different Characters! ♡ Last ↦ Name"`
//!   becomes `first-name-so-many-different-characters-last-name`.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A personal author as stored in the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: String,
}

impl Author {
    /// First and last name joined with a space, skipping missing or blank parts.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn slug(&self) -> String {
        slugify(&self.full_name())
    }
}

/// Reduce free text to a URL slug.
///
/// - Text is NFKD-decomposed and only the ASCII part kept, so accented
///   letters fold to their base letter (`Göring` → `goring`)
/// - ASCII letters and digits are lowercased and kept, as are underscores
/// - Whitespace and dashes become separators, collapsed into a single dash
/// - Every other character (punctuation, symbols, non-Latin scripts) is dropped
/// - Leading and trailing dashes and underscores are stripped
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(['-', '_']).to_string()
}
