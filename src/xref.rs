use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::identifier::is_missing;

/// Identifier body shape shared by UniProt-style accessions:
/// one letter, one digit, three alphanumerics, one digit, optional
/// "-digits" isoform suffix.
pub const UNIPROT_BODY: &str = r"[A-Z][0-9][A-Z0-9]{3}[0-9](?:-[0-9]+)?";

/// Prefixes under which UniProt accessions appear in knowledge-graph
/// cross-reference strings.
pub const UNIPROT_PREFIXES: &[&str] = &["UniProtKB", "UniProt", "PR", "uniprot"];

lazy_static! {
    static ref DEFAULT_PATTERN: XrefPattern =
        XrefPattern::new(UNIPROT_PREFIXES, UNIPROT_BODY).unwrap();
}

/// A precompiled extraction pattern: a case-insensitive prefix alternation
/// followed by ":" and a captured identifier body.
#[derive(Clone, Debug)]
pub struct XrefPattern {
    regex: Regex,
}

impl XrefPattern {
    pub fn new(prefixes: &[&str], body: &str) -> Result<Self, regex::Error> {
        let alternation = prefixes.iter().map(|p| regex::escape(p)).join("|");
        let regex = Regex::new(&format!(r"(?i:{alternation}):({body})"))?;
        Ok(Self { regex })
    }

    /// The pattern for UniProt accessions behind KG2c-style prefixes
    /// ("UniProtKB:", "PR:", ...).
    pub fn uniprot() -> &'static Self {
        &DEFAULT_PATTERN
    }

    /// Scans the whole text and returns every non-overlapping match's
    /// captured body, in order of appearance, duplicates preserved.
    /// Missing sentinels yield an empty extraction, not an error.
    pub fn extract(&self, text: &str) -> Vec<String> {
        if is_missing(text) {
            return vec![];
        }
        self.regex
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

/// Free-function form of [`XrefPattern::extract`].
pub fn extract_identifiers(text: &str, pattern: &XrefPattern) -> Vec<String> {
    pattern.extract(text)
}
