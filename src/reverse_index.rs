use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identifier::{self, base_form};
use crate::record::TargetRecord;
use crate::xref::XrefPattern;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Registered from the target's primary identifier field.
    PrimaryField,
    /// Extracted from the target's free-text cross-reference field.
    XrefExtracted,
    /// Derived by stripping the isoform suffix from another registration.
    BaseForm,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub target_index: usize,
    pub provenance: Provenance,
    /// The textual form that produced this entry, before any suffix stripping.
    pub extracted_form: String,
}

/// Maps canonical identifiers to the target records where they occur.
///
/// One canonical identifier may point at several target records, and one
/// target record is usually reachable via several canonical identifiers
/// (primary, extracted, base-form). Entry lists keep first-seen scan order
/// so that candidate emission downstream is deterministic.
#[derive(Clone, Debug, Default)]
pub struct ReverseIndex {
    entries: HashMap<String, Vec<IndexEntry>>,
    keys: Vec<String>,
}

impl ReverseIndex {
    /// Builds the index in a single linear pass over `targets`.
    ///
    /// For each record: the primary identifier field is registered when it is
    /// either a bare canonical identifier or a prefix-qualified form matching
    /// `pattern`; the cross-reference field is always scanned with `pattern`.
    /// Every isoform-suffixed registration also registers its base form
    /// against the same target, so a source lacking isoform specificity can
    /// still reach a target that only carries the qualified form. Unparseable
    /// fields contribute nothing and are skipped silently.
    pub fn build(targets: &[TargetRecord], pattern: &XrefPattern) -> Self {
        let mut index = Self::default();
        for record in targets {
            if let Some(id) = identifier::normalize(&record.primary_id) {
                index.register(&id.canonical, record.index, Provenance::PrimaryField);
            } else {
                for found in pattern.extract(&record.primary_id) {
                    index.register(&found, record.index, Provenance::PrimaryField);
                }
            }
            for found in pattern.extract(&record.xrefs) {
                index.register(&found, record.index, Provenance::XrefExtracted);
            }
        }
        index
    }

    /// Registers `canonical` against `target_index`, plus its base form when
    /// an isoform suffix is present. Duplicate (identifier, target) pairs
    /// from repeated textual occurrences collapse to one entry.
    pub fn register(&mut self, canonical: &str, target_index: usize, provenance: Provenance) {
        self.insert(canonical, target_index, provenance, canonical);
        let base = base_form(canonical);
        if base != canonical {
            self.insert(base, target_index, Provenance::BaseForm, canonical);
        }
    }

    fn insert(&mut self, key: &str, target_index: usize, provenance: Provenance, form: &str) {
        if !self.entries.contains_key(key) {
            self.keys.push(key.to_string());
        }
        let entries = self.entries.entry(key.to_string()).or_default();
        if entries.iter().any(|e| e.target_index == target_index) {
            return;
        }
        entries.push(IndexEntry {
            target_index,
            provenance,
            extracted_form: form.to_string(),
        });
    }

    /// Entries for a canonical identifier, in first-seen order.
    pub fn lookup(&self, canonical: &str) -> Option<&[IndexEntry]> {
        self.entries.get(canonical).map(Vec::as_slice)
    }

    /// Canonical identifiers in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
