use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref UNIPROT_ACCESSION: Regex =
        Regex::new(r"^[A-Z][0-9][A-Z0-9]{3}[0-9](?:-[0-9]+)?$").unwrap();
    static ref HMDB_ID: Regex = Regex::new(r"^HMDB[0-9]{7}$").unwrap();
    static ref LOINC_CODE: Regex = Regex::new(r"^[0-9]{1,7}-[0-9]$").unwrap();
}

/// Literal values that mean "no identifier here", compared case-insensitively.
const MISSING_SENTINELS: &[&str] = &["", "nan", "none", "null", "no_match"];

/// Separators that may join multiple identifiers into one source field.
pub const COMPOSITE_SEPARATORS: &[char] = &[',', ';', '|'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    UniProt,
    Hmdb,
    Loinc,
    /// Multiple identifiers packed into one field, eg "Q67890,Q11111".
    Composite,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub raw: String,
    pub canonical: String,
    pub kind: IdentifierKind,
}

impl Identifier {
    /// Splits a composite canonical form into its parts. A non-composite
    /// identifier yields itself as the single part.
    pub fn parts(&self) -> Vec<&str> {
        match self.kind {
            IdentifierKind::Composite => self.canonical.split(',').collect(),
            _ => vec![self.canonical.as_str()],
        }
    }

    pub fn has_isoform_suffix(&self) -> bool {
        self.kind == IdentifierKind::UniProt && base_form(&self.canonical) != self.canonical
    }
}

pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_SENTINELS.iter().any(|s| trimmed.eq_ignore_ascii_case(s))
}

/// Normalizes a raw identifier field into its canonical, comparable form.
///
/// Returns `None` for missing sentinels ("", "nan", "None", "NO_MATCH", ...),
/// whitespace-only input, and anything that fails its kind's format check
/// after canonicalization. Normalization failures are data-quality signals,
/// not exceptions; this function never panics on any input.
///
/// Idempotent: `normalize` of a canonical form returns the same canonical form.
pub fn normalize(raw: &str) -> Option<Identifier> {
    if is_missing(raw) {
        return None;
    }
    let trimmed = raw.trim().trim_matches(['"', '\'']).trim();
    if is_missing(trimmed) {
        return None;
    }
    if let Some(canonical) = canonicalize_single(trimmed) {
        let kind = detect_kind(&canonical)?;
        return Some(Identifier {
            raw: raw.to_string(),
            canonical,
            kind,
        });
    }
    normalize_composite(raw, trimmed)
}

/// Strips one trailing "-N" isoform/version suffix, eg "Q6EMK4-2" -> "Q6EMK4".
/// Returns the input unchanged when no such suffix is present.
pub fn base_form(canonical: &str) -> &str {
    match canonical.rfind('-') {
        Some(pos) if pos > 0 => {
            let suffix = &canonical[pos + 1..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                &canonical[..pos]
            } else {
                canonical
            }
        }
        _ => canonical,
    }
}

fn canonicalize_single(trimmed: &str) -> Option<String> {
    let upper = trimmed.to_ascii_uppercase();
    if let Some(rest) = upper.strip_prefix("HMDB") {
        // Re-pad the numeric remainder to the modern 7-digit width,
        // eg "HMDB01234" -> "HMDB0001234".
        let digits = rest.trim_start_matches('0');
        if digits.is_empty() || digits.len() > 7 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return Some(format!("HMDB{digits:0>7}"));
    }
    if LOINC_CODE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if UNIPROT_ACCESSION.is_match(&upper) {
        return Some(upper);
    }
    None
}

fn detect_kind(canonical: &str) -> Option<IdentifierKind> {
    if HMDB_ID.is_match(canonical) {
        Some(IdentifierKind::Hmdb)
    } else if LOINC_CODE.is_match(canonical) {
        Some(IdentifierKind::Loinc)
    } else if UNIPROT_ACCESSION.is_match(canonical) {
        Some(IdentifierKind::UniProt)
    } else {
        None
    }
}

/// A field like "Q67890, Q11111" canonicalizes part by part; parts that fail
/// their format check are dropped, and the whole field is invalid only when
/// no part survives.
fn normalize_composite(raw: &str, trimmed: &str) -> Option<Identifier> {
    if !trimmed.contains(COMPOSITE_SEPARATORS) {
        return None;
    }
    let parts: Vec<String> = trimmed
        .split(COMPOSITE_SEPARATORS)
        .filter_map(|part| {
            let part = part.trim().trim_matches(['"', '\'']).trim();
            if is_missing(part) {
                return None;
            }
            canonicalize_single(part)
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    if parts.len() == 1 {
        let canonical = parts.into_iter().next()?;
        let kind = detect_kind(&canonical)?;
        return Some(Identifier {
            raw: raw.to_string(),
            canonical,
            kind,
        });
    }
    Some(Identifier {
        raw: raw.to_string(),
        canonical: parts.join(","),
        kind: IdentifierKind::Composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uniprot() {
        let id = normalize("q6emk4").unwrap();
        assert_eq!(id.canonical, "Q6EMK4");
        assert_eq!(id.kind, IdentifierKind::UniProt);
        let id = normalize("  \"O00533-1\" ").unwrap();
        assert_eq!(id.canonical, "O00533-1");
        assert!(id.has_isoform_suffix());
    }

    #[test]
    fn test_normalize_missing_sentinels() {
        for raw in ["", "   ", "nan", "NaN", "None", "NO_MATCH", "null", "\"\""] {
            assert!(normalize(raw).is_none(), "expected None for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_rejects_bad_format() {
        assert!(normalize("not an accession").is_none());
        assert!(normalize("Q6EM").is_none());
        assert!(normalize("HMDBXYZ").is_none());
        assert!(normalize("HMDB123456789").is_none());
    }

    #[test]
    fn test_normalize_hmdb_repadding() {
        let id = normalize("HMDB01234").unwrap();
        assert_eq!(id.canonical, "HMDB0001234");
        assert_eq!(id.kind, IdentifierKind::Hmdb);
        assert_eq!(normalize("hmdb1234").unwrap().canonical, "HMDB0001234");
    }

    #[test]
    fn test_normalize_loinc() {
        let id = normalize("2345-7").unwrap();
        assert_eq!(id.canonical, "2345-7");
        assert_eq!(id.kind, IdentifierKind::Loinc);
    }

    #[test]
    fn test_normalize_composite() {
        let id = normalize("Q67890,Q11111").unwrap();
        assert_eq!(id.kind, IdentifierKind::Composite);
        assert_eq!(id.parts(), vec!["Q67890", "Q11111"]);
        // A composite with one bad part keeps the good part.
        let id = normalize("Q67890, junk").unwrap();
        assert_eq!(id.kind, IdentifierKind::UniProt);
        assert_eq!(id.canonical, "Q67890");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["Q6EMK4", "q6emk4", "O00533-1", "HMDB01234", "2345-7", "Q67890,Q11111"] {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once.canonical).unwrap();
            assert_eq!(once.canonical, twice.canonical, "not idempotent for {raw:?}");
            assert_eq!(once.kind, twice.kind);
        }
    }

    #[test]
    fn test_base_form() {
        assert_eq!(base_form("Q6EMK4-2"), "Q6EMK4");
        assert_eq!(base_form("O00533-11"), "O00533");
        assert_eq!(base_form("Q6EMK4"), "Q6EMK4");
        assert_eq!(base_form("-2"), "-2");
        // Idempotent under repeated application.
        assert_eq!(base_form(base_form("Q6EMK4-2")), "Q6EMK4");
    }
}
