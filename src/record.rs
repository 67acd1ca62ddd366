use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One row of the dataset being mapped. Read once at load time and never
/// mutated; the matcher refers to it by `index` throughout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    pub index: usize,
    /// Raw identifier field; may pack several identifiers ("Q67890,Q11111").
    pub identifier: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub payload: HashMap<String, String>,
}

impl SourceRecord {
    pub fn new(index: usize, identifier: &str) -> Self {
        Self {
            index,
            identifier: identifier.to_string(),
            payload: HashMap::new(),
        }
    }
}

/// One row of the reference dataset. Scanned once to build the reverse index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TargetRecord {
    pub index: usize,
    /// Primary identifier field, usually prefix-qualified ("NCBIGene:114990").
    pub primary_id: String,
    /// Free-text cross-reference field packing zero or more identifiers
    /// ("ENSEMBL:ENSG0001||UniProtKB:Q6EMK4||PR:Q6EMK4").
    pub xrefs: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub payload: HashMap<String, String>,
}

impl TargetRecord {
    pub fn new(index: usize, primary_id: &str, xrefs: &str) -> Self {
        Self {
            index,
            primary_id: primary_id.to_string(),
            xrefs: xrefs.to_string(),
            payload: HashMap::new(),
        }
    }
}
