use serde::{Deserialize, Serialize, Serializer};

/// How the figure stored in `extra_costs` has to be read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtraCostsKind {
    /// An add-on on top of the cold rent (Nebenkosten).
    Kalt,
    /// Actually a warm-rent total; the add-on has to be inferred.
    Warm,
}

/// Snapshot of one listing page. Built fresh on every extraction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(serialize_with = "zero_if_unknown")]
    pub price_cold: Option<f64>,
    #[serde(serialize_with = "zero_if_unknown")]
    pub price_warm: Option<f64>,
    pub extra_costs: Option<f64>,
    pub extra_costs_kind: Option<ExtraCostsKind>,
    pub heating_costs: Option<f64>,
    pub sqm: Option<f64>,
    pub rooms: Option<f64>,
    pub features: Vec<String>,
}

// Consumers of the serialized record read a falsy price as "unknown".
fn zero_if_unknown<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.unwrap_or(0.0))
}

impl ListingRecord {
    /// Check if the record carries enough to be worth evaluating
    pub fn has_sufficient_info(&self) -> bool {
        !self.title.trim().is_empty()
            && (self.price_cold.is_some() || self.price_warm.is_some() || self.sqm.is_some())
    }
}

/// Output language for messages, prompts and labels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "de" => Some(Language::De),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

/// Canonical cold/warm/add-on triple produced by the price deriver.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct PriceDetails {
    pub cold_price: Option<f64>,
    pub warm_price: Option<f64>,
    pub extra_costs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_prices_serialize_as_zero() {
        let record = ListingRecord {
            title: "Altbau".to_string(),
            sqm: None,
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["price_cold"], 0.0);
        assert_eq!(json["price_warm"], 0.0);
        assert!(json["sqm"].is_null());
        assert!(json["extra_costs_kind"].is_null());
    }

    #[test]
    fn test_extra_costs_kind_serializes_lowercase() {
        let record = ListingRecord {
            extra_costs: Some(800.0),
            extra_costs_kind: Some(ExtraCostsKind::Warm),
            price_cold: Some(650.0),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["extra_costs_kind"], "warm");
        assert_eq!(json["price_cold"], 650.0);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code(" de "), Some(Language::De));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default().code(), "de");
    }

    #[test]
    fn test_has_sufficient_info() {
        let mut record = ListingRecord::default();
        assert!(!record.has_sufficient_info());

        record.title = "Schöne Wohnung".to_string();
        assert!(!record.has_sufficient_info());

        record.sqm = Some(40.0);
        assert!(record.has_sufficient_info());
    }
}
