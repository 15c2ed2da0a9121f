//! Built-in ranking definitions and JSON loading.

use ronda_traits::{RankingDefinition, Result, RondaError};
use std::path::Path;

/// Slug of the built-in quality + value ranking.
pub const QUALITY_VALUE: &str = "quality_value";

/// Revenue growth plus half-weighted trailing net income.
#[must_use]
pub fn quality_value() -> RankingDefinition {
    RankingDefinition::new(QUALITY_VALUE, "Quality + Value")
        .with_weight("Revenue_YoY", 1.0)
        .with_weight("NetIncome_TTM", 0.5)
}

/// Every built-in definition.
#[must_use]
pub fn builtin_definitions() -> Vec<RankingDefinition> {
    vec![quality_value()]
}

/// A built-in definition by slug.
#[must_use]
pub fn builtin(slug: &str) -> Option<RankingDefinition> {
    builtin_definitions().into_iter().find(|d| d.slug == slug)
}

/// Parse and validate a JSON definition.
///
/// ```
/// let def = ronda_rank::parse_definition(
///     r#"{"slug": "cheap", "name": "Cheap", "weights": {"PE_TTM": -1.0}}"#,
/// )
/// .unwrap();
/// assert_eq!(def.version, 1);
/// ```
///
/// # Errors
///
/// Returns a serialization error for malformed JSON and
/// [`RondaError::InvalidData`] for an unusable definition.
pub fn parse_definition(json: &str) -> Result<RankingDefinition> {
    let definition: RankingDefinition = serde_json::from_str(json)?;
    definition.validate()?;
    Ok(definition)
}

/// Load a definition from a JSON file.
///
/// # Errors
///
/// Fails when the file cannot be read or does not hold a valid definition.
pub fn load_definition(path: &Path) -> Result<RankingDefinition> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        RondaError::InvalidData(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_definition(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_value_weights() {
        let def = quality_value();
        assert!(def.validate().is_ok());
        assert_eq!(def.weights["Revenue_YoY"], 1.0);
        assert_eq!(def.weights["NetIncome_TTM"], 0.5);
        assert_eq!(builtin(QUALITY_VALUE), Some(def));
        assert!(builtin("missing").is_none());
    }

    #[test]
    fn test_parse_rejects_bad_definitions() {
        assert!(parse_definition("{").is_err());
        assert!(parse_definition(r#"{"slug": "x", "name": "X", "weights": {}}"#).is_err());
    }

    #[test]
    fn test_json_roundtrip_of_builtin() {
        let json = serde_json::to_string(&quality_value()).unwrap();
        assert_eq!(parse_definition(&json).unwrap(), quality_value());
    }
}
