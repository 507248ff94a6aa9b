use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Site configuration for one reconciliation run. Loaded once, immutable
/// after `from_toml`.
#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub vendors: BTreeMap<String, VendorConfig>,
    #[serde(default)]
    pub units: BTreeMap<String, UnitConfig>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,
    /// Lowercased raw spelling → canonical vendor key. Derived in `from_toml`.
    #[serde(skip)]
    alias_index: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorConfig {
    /// Raw spellings seen in exports that mean this vendor.
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitConfig {
    /// Canonical vendor keys this unit may purchase from.
    #[serde(default)]
    pub approved_vendors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Thresholds + embedding backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Minimum Jaccard score for a lexical suggestion, in [0, 1].
    #[serde(default = "default_lexical_min")]
    pub lexical_min_score: f64,
    /// Minimum semantic similarity percentage, in [0, 100].
    #[serde(default = "default_semantic_min")]
    pub semantic_min_pct: f64,
}

fn default_lexical_min() -> f64 {
    0.3
}

fn default_semantic_min() -> f64 {
    50.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            lexical_min_score: default_lexical_min(),
            semantic_min_pct: default_semantic_min(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
}

fn default_embed_timeout() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let mut config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        config.alias_index = config.build_alias_index()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.lexical_min_score) {
            return Err(ReconError::ConfigValidation(format!(
                "lexical_min_score must be in [0, 1], got {}",
                t.lexical_min_score
            )));
        }
        if !(0.0..=100.0).contains(&t.semantic_min_pct) {
            return Err(ReconError::ConfigValidation(format!(
                "semantic_min_pct must be in [0, 100], got {}",
                t.semantic_min_pct
            )));
        }

        for key in self.vendors.keys() {
            if key.trim().is_empty() {
                return Err(ReconError::ConfigValidation("empty vendor key".into()));
            }
        }

        // Approved vendors must reference declared vendor keys.
        for (unit, unit_config) in &self.units {
            for vendor in &unit_config.approved_vendors {
                if !self.vendors.contains_key(vendor) {
                    return Err(ReconError::ConfigValidation(format!(
                        "unit '{unit}': approved vendor '{vendor}' is not declared"
                    )));
                }
            }
        }

        if let Some(embedding) = &self.embedding {
            if embedding.endpoint.trim().is_empty() || embedding.model.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "[embedding] requires endpoint and model".into(),
                ));
            }
        }

        // Surfaces alias collisions.
        self.build_alias_index()?;

        Ok(())
    }

    fn build_alias_index(&self) -> Result<HashMap<String, String>, ReconError> {
        let mut index: HashMap<String, String> = HashMap::new();
        for (key, vendor) in &self.vendors {
            let mut spellings: Vec<&str> = vec![key.as_str()];
            spellings.extend(vendor.aliases.iter().map(String::as_str));
            for raw in spellings {
                let folded = raw.trim().to_lowercase();
                if folded.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "vendor '{key}': empty alias"
                    )));
                }
                if let Some(existing) = index.get(&folded) {
                    if existing != key {
                        return Err(ReconError::ConfigValidation(format!(
                            "alias '{raw}' is claimed by both '{existing}' and '{key}'"
                        )));
                    }
                }
                index.insert(folded, key.clone());
            }
        }
        Ok(index)
    }

    /// Resolve a raw vendor spelling to its canonical key. Case-insensitive
    /// exact match only, never fuzzy; unknown spellings return None.
    pub fn normalize_vendor(&self, raw: &str) -> Option<&str> {
        self.alias_index
            .get(&raw.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Canonical vendor keys a unit may purchase from. Empty for an unknown
    /// unit.
    pub fn approved_vendors(&self, unit: &str) -> &[String] {
        self.units
            .get(unit)
            .map(|u| u.approved_vendors.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Harborview Commissary"

[vendors.sysco]
aliases = ["SYSCO FOODS", "Sysco Seattle  "]

[vendors.usfoods]
aliases = ["US Foods", "U.S. FOODS INC"]

[units.main-kitchen]
approved_vendors = ["sysco", "usfoods"]

[units.cafe]
approved_vendors = ["sysco"]

[thresholds]
lexical_min_score = 0.3
semantic_min_pct = 50.0
"#;

    #[test]
    fn parse_valid() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Harborview Commissary");
        assert_eq!(config.vendors.len(), 2);
        assert_eq!(config.units.len(), 2);
        assert_eq!(config.thresholds.lexical_min_score, 0.3);
        assert!(config.embedding.is_none());
    }

    #[test]
    fn thresholds_default_when_absent() {
        let config = ReconConfig::from_toml("name = \"x\"").unwrap();
        assert_eq!(config.thresholds.lexical_min_score, 0.3);
        assert_eq!(config.thresholds.semantic_min_pct, 50.0);
    }

    #[test]
    fn normalize_vendor_case_insensitive_exact() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.normalize_vendor("sysco"), Some("sysco"));
        assert_eq!(config.normalize_vendor("SYSCO FOODS"), Some("sysco"));
        assert_eq!(config.normalize_vendor("sysco foods"), Some("sysco"));
        assert_eq!(config.normalize_vendor("  Sysco Seattle "), Some("sysco"));
        assert_eq!(config.normalize_vendor("u.s. foods inc"), Some("usfoods"));
        // Exact only: a near miss stays unresolved.
        assert_eq!(config.normalize_vendor("SYSCO FOOD"), None);
        assert_eq!(config.normalize_vendor(""), None);
    }

    #[test]
    fn approved_vendors_empty_for_unknown_unit() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.approved_vendors("main-kitchen").len(), 2);
        assert!(config.approved_vendors("nope").is_empty());
    }

    #[test]
    fn reject_unknown_approved_vendor() {
        let input = r#"
name = "Bad"
[units.cafe]
approved_vendors = ["ghost"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'ghost'"));
    }

    #[test]
    fn reject_alias_collision() {
        let input = r#"
name = "Bad"
[vendors.sysco]
aliases = ["ACME"]
[vendors.usfoods]
aliases = ["acme"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("acme"));
    }

    #[test]
    fn reject_out_of_range_thresholds() {
        let input = "name = \"x\"\n[thresholds]\nlexical_min_score = 1.5\n";
        assert!(ReconConfig::from_toml(input).is_err());
        let input = "name = \"x\"\n[thresholds]\nsemantic_min_pct = -1.0\n";
        assert!(ReconConfig::from_toml(input).is_err());
    }

    #[test]
    fn parse_embedding_block() {
        let input = r#"
name = "x"
[embedding]
endpoint = "http://127.0.0.1:11434/api/embed"
model = "nomic-embed-text"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        let embedding = config.embedding.unwrap();
        assert_eq!(embedding.model, "nomic-embed-text");
        assert_eq!(embedding.timeout_secs, 30);
    }

    #[test]
    fn reject_empty_embedding_endpoint() {
        let input = "name = \"x\"\n[embedding]\nendpoint = \"\"\nmodel = \"m\"\n";
        assert!(ReconConfig::from_toml(input).is_err());
    }
}
