//! Keyword filter over file references: an item is kept when its name, path,
//! or mime type contains the pattern, case-insensitively.

use regex::Regex;

use crate::error::ViewerError;
use crate::FileReference;

/// How the filter pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Substring,
    Regex,
}

enum Matcher {
    All,
    Substring(String),
    Pattern(Regex),
}

impl Matcher {
    fn build(pattern: &str, mode: FilterMode) -> Result<Self, ViewerError> {
        if pattern.is_empty() {
            return Ok(Matcher::All);
        }
        match mode {
            FilterMode::Substring => Ok(Matcher::Substring(pattern.to_lowercase())),
            FilterMode::Regex => Regex::new(&format!("(?i){}", pattern))
                .map(Matcher::Pattern)
                .map_err(|source| ViewerError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                }),
        }
    }

    fn is_match(&self, reference: &FileReference) -> bool {
        let fields = [reference.name(), reference.path.as_str(), reference.mime_type.as_str()];
        match self {
            Matcher::All => true,
            Matcher::Substring(needle) => fields.iter().any(|f| f.to_lowercase().contains(needle.as_str())),
            Matcher::Pattern(re) => fields.iter().any(|f| re.is_match(f)),
        }
    }
}

/// Keep the references matching `pattern`, preserving order. An empty pattern
/// keeps everything; an invalid regex is an error.
pub fn filter_references(
    references: Vec<FileReference>,
    pattern: &str,
    mode: FilterMode,
) -> Result<Vec<FileReference>, ViewerError> {
    let matcher = Matcher::build(pattern, mode)?;
    Ok(references.into_iter().filter(|r| matcher.is_match(r)).collect())
}
