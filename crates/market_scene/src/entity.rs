//! Entity records as delivered by the upstream data source.

use crate::error::FetchError;
use crate::label::format_price;
use serde::Deserialize;

/// One market item to visualise.
///
/// Records carry no stable identifier; identity is the position in the input
/// sequence. Market payloads that use `current_price` and `image` load as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub symbol: String,
    #[serde(alias = "current_price")]
    pub price: f64,
    #[serde(alias = "image", default)]
    pub icon_ref: Option<String>,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            price,
            icon_ref: None,
        }
    }

    pub fn with_icon(mut self, icon_ref: impl Into<String>) -> Self {
        self.icon_ref = Some(icon_ref.into());
        self
    }

    /// Icon reference, ignoring blank strings.
    pub fn icon(&self) -> Option<&str> {
        self.icon_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The two label lines: identity first, value second.
    pub fn label_lines(&self) -> [String; 2] {
        [
            format!("{} ({})", self.name, self.symbol.to_uppercase()),
            format!("${}", format_price(self.price)),
        ]
    }

    fn validate(&self, index: usize) -> Result<(), FetchError> {
        let reason = if self.name.trim().is_empty() {
            "empty name"
        } else if self.symbol.trim().is_empty() {
            "empty symbol"
        } else if !self.price.is_finite() || self.price < 0.0 {
            "price must be a finite, non-negative number"
        } else {
            return Ok(());
        };

        Err(FetchError::InvalidRecord {
            index,
            reason: reason.to_string(),
        })
    }
}

/// Parses and validates a JSON array of entity records.
pub fn parse_entities(json: &str) -> Result<Vec<EntityRecord>, FetchError> {
    let records: Vec<EntityRecord> = serde_json::from_str(json)?;
    for (index, record) in records.iter().enumerate() {
        record.validate(index)?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_market_payload_aliases() {
        let json = r#"[
            {"id": "bitcoin", "name": "Bitcoin", "symbol": "btc",
             "current_price": 64000.5, "image": "https://img/btc.png", "market_cap": 1},
            {"name": "Tether", "symbol": "usdt", "price": 1.0}
        ]"#;

        let records = parse_entities(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, 64000.5);
        assert_eq!(records[0].icon(), Some("https://img/btc.png"));
        assert_eq!(records[1].icon(), None);
    }

    #[test]
    fn empty_array_is_not_an_error() {
        assert!(parse_entities("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_negative_price() {
        let err = parse_entities(r#"[{"name": "A", "symbol": "a", "price": -1}]"#).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = parse_entities(r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn blank_icon_is_treated_as_missing() {
        let record = EntityRecord::new("Bit", "BIT", 1.0).with_icon("  ");
        assert_eq!(record.icon(), None);
    }

    #[test]
    fn label_lines_format_identity_and_price() {
        let record = EntityRecord::new("Bitcoin", "btc", 1234.5);
        let [title, price] = record.label_lines();
        assert_eq!(title, "Bitcoin (BTC)");
        assert_eq!(price, "$1,234.50");
    }
}
