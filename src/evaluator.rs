use crate::models::{Language, ListingRecord, PriceDetails};
use crate::pricing::derive_price_details;
use serde::{Deserialize, Serialize};

/// Tunable cut-offs for the listing rating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluationThresholds {
    /// Highest €/m² still rated "good"
    pub good_max_price_per_sqm: f64,
    /// Highest €/m² still rated "ok"
    pub ok_max_price_per_sqm: f64,
    /// Lower bounds (m² per room) of the compact, ok, good and very spacious bands
    pub room_size_bounds: [f64; 4],
}

impl Default for EvaluationThresholds {
    fn default() -> Self {
        Self {
            good_max_price_per_sqm: 15.0,
            ok_max_price_per_sqm: 20.0,
            room_size_bounds: [10.0, 15.0, 20.0, 30.0],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RoomSizeBand {
    Cramped,
    Compact,
    Ok,
    Good,
    VerySpacious,
}

impl RoomSizeBand {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (RoomSizeBand::Cramped, Language::De) => "Sehr beengt",
            (RoomSizeBand::Compact, Language::De) => "Kompakt",
            (RoomSizeBand::Ok, Language::De) => "Ok",
            (RoomSizeBand::Good, Language::De) => "Großzügig",
            (RoomSizeBand::VerySpacious, Language::De) => "Sehr großzügig",
            (RoomSizeBand::Cramped, Language::En) => "Cramped",
            (RoomSizeBand::Compact, Language::En) => "Compact",
            (RoomSizeBand::Ok, Language::En) => "Ok",
            (RoomSizeBand::Good, Language::En) => "Good",
            (RoomSizeBand::VerySpacious, Language::En) => "Very spacious",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    Incomplete,
    Good,
    Ok,
    Expensive,
}

impl QualityLabel {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (QualityLabel::Incomplete, Language::De) => "Unvollständig",
            (QualityLabel::Good, Language::De) => "Sehr gut",
            (QualityLabel::Ok, Language::De) => "Ok",
            (QualityLabel::Expensive, Language::De) => "Teuer",
            (QualityLabel::Incomplete, Language::En) => "Incomplete",
            (QualityLabel::Good, Language::En) => "Very good",
            (QualityLabel::Ok, Language::En) => "Ok",
            (QualityLabel::Expensive, Language::En) => "Expensive",
        }
    }

    pub fn comment(&self, language: Language) -> &'static str {
        match (self, language) {
            (QualityLabel::Incomplete, Language::De) => "Konnte Preis oder Fläche nicht sicher erkennen.",
            (QualityLabel::Good, Language::De) => "Preis pro m² sieht stark aus.",
            (QualityLabel::Ok, Language::De) => "Preis pro m² ist im Rahmen.",
            (QualityLabel::Expensive, Language::De) => "Preis pro m² ist eher hoch.",
            (QualityLabel::Incomplete, Language::En) => "Could not reliably detect price or area.",
            (QualityLabel::Good, Language::En) => "Price per m² looks strong.",
            (QualityLabel::Ok, Language::En) => "Price per m² is reasonable.",
            (QualityLabel::Expensive, Language::En) => "Price per m² is on the high side.",
        }
    }
}

/// Display-ready metrics for one listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluation {
    pub prices: PriceDetails,
    pub price_per_sqm_cold: Option<f64>,
    pub price_per_sqm_warm: Option<f64>,
    pub price_per_room: Option<f64>,
    pub avg_room_size: Option<f64>,
    pub room_size_band: Option<RoomSizeBand>,
    pub label: QualityLabel,
}

pub struct Evaluator {
    thresholds: EvaluationThresholds,
}

impl Evaluator {
    pub fn new(thresholds: EvaluationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn evaluate(&self, record: &ListingRecord) -> Evaluation {
        let prices = derive_price_details(record);
        let sqm = record.sqm.filter(|sqm| *sqm > 0.0);
        let rooms = record.rooms.filter(|rooms| *rooms > 0.0);

        let price_per_sqm_cold = ratio(prices.cold_price, sqm);
        let price_per_sqm_warm = ratio(prices.warm_price, sqm);
        let price_per_room = ratio(prices.warm_price, rooms);
        let avg_room_size = ratio(sqm, rooms);
        let room_size_band = avg_room_size.map(|size| self.room_size_band(size));

        let label = match price_per_sqm_warm.or(price_per_sqm_cold) {
            Some(pps) => self.quality_label(pps),
            None => QualityLabel::Incomplete,
        };

        Evaluation {
            prices,
            price_per_sqm_cold,
            price_per_sqm_warm,
            price_per_room,
            avg_room_size,
            room_size_band,
            label,
        }
    }

    /// Bands are inclusive-lower, exclusive-upper; the last is open-ended.
    pub fn room_size_band(&self, avg_room_size: f64) -> RoomSizeBand {
        let [compact, ok, good, very_spacious] = self.thresholds.room_size_bounds;

        if avg_room_size >= very_spacious {
            RoomSizeBand::VerySpacious
        } else if avg_room_size >= good {
            RoomSizeBand::Good
        } else if avg_room_size >= ok {
            RoomSizeBand::Ok
        } else if avg_room_size >= compact {
            RoomSizeBand::Compact
        } else {
            RoomSizeBand::Cramped
        }
    }

    pub fn quality_label(&self, price_per_sqm: f64) -> QualityLabel {
        if price_per_sqm <= self.thresholds.good_max_price_per_sqm {
            QualityLabel::Good
        } else if price_per_sqm <= self.thresholds.ok_max_price_per_sqm {
            QualityLabel::Ok
        } else {
            QualityLabel::Expensive
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluationThresholds::default())
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtraCostsKind;

    #[test]
    fn test_cold_price_and_area_without_warm() {
        let record = ListingRecord {
            price_cold: Some(650.0),
            sqm: Some(62.0),
            ..Default::default()
        };
        let evaluation = Evaluator::default().evaluate(&record);

        assert_eq!(evaluation.prices.warm_price, None);
        assert_eq!(evaluation.price_per_sqm_warm, None);
        assert!((evaluation.price_per_sqm_cold.unwrap() - 10.4839).abs() < 0.001);
        assert_eq!(evaluation.label, QualityLabel::Good);
        assert_eq!(evaluation.price_per_room, None);
    }

    #[test]
    fn test_warm_price_preferred_for_label() {
        let record = ListingRecord {
            price_cold: Some(600.0),
            extra_costs: Some(300.0),
            extra_costs_kind: Some(ExtraCostsKind::Kalt),
            sqm: Some(50.0),
            rooms: Some(2.0),
            ..Default::default()
        };
        let evaluation = Evaluator::default().evaluate(&record);

        assert_eq!(evaluation.price_per_sqm_cold, Some(12.0));
        assert_eq!(evaluation.price_per_sqm_warm, Some(18.0));
        assert_eq!(evaluation.label, QualityLabel::Ok);
        assert_eq!(evaluation.price_per_room, Some(450.0));
    }

    #[test]
    fn test_expensive_label() {
        let record = ListingRecord {
            extra_costs: Some(1050.0),
            extra_costs_kind: Some(ExtraCostsKind::Warm),
            sqm: Some(50.0),
            ..Default::default()
        };
        let evaluation = Evaluator::default().evaluate(&record);
        assert_eq!(evaluation.price_per_sqm_warm, Some(21.0));
        assert_eq!(evaluation.label, QualityLabel::Expensive);
    }

    #[test]
    fn test_incomplete_without_area_or_price() {
        let no_area = ListingRecord {
            price_cold: Some(500.0),
            ..Default::default()
        };
        assert_eq!(Evaluator::default().evaluate(&no_area).label, QualityLabel::Incomplete);

        let no_price = ListingRecord {
            sqm: Some(40.0),
            ..Default::default()
        };
        assert_eq!(Evaluator::default().evaluate(&no_price).label, QualityLabel::Incomplete);
    }

    #[test]
    fn test_label_boundaries_inclusive() {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.quality_label(15.0), QualityLabel::Good);
        assert_eq!(evaluator.quality_label(15.01), QualityLabel::Ok);
        assert_eq!(evaluator.quality_label(20.0), QualityLabel::Ok);
        assert_eq!(evaluator.quality_label(20.01), QualityLabel::Expensive);
    }

    #[test]
    fn test_room_size_bands() {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.room_size_band(9.99), RoomSizeBand::Cramped);
        assert_eq!(evaluator.room_size_band(10.0), RoomSizeBand::Compact);
        assert_eq!(evaluator.room_size_band(15.0), RoomSizeBand::Ok);
        assert_eq!(evaluator.room_size_band(20.0), RoomSizeBand::Good);
        assert_eq!(evaluator.room_size_band(29.9), RoomSizeBand::Good);
        assert_eq!(evaluator.room_size_band(30.0), RoomSizeBand::VerySpacious);
        assert_eq!(evaluator.room_size_band(120.0), RoomSizeBand::VerySpacious);
    }

    #[test]
    fn test_average_room_size_from_record() {
        let record = ListingRecord {
            sqm: Some(75.0),
            rooms: Some(3.0),
            ..Default::default()
        };
        let evaluation = Evaluator::default().evaluate(&record);
        assert_eq!(evaluation.avg_room_size, Some(25.0));
        assert_eq!(evaluation.room_size_band, Some(RoomSizeBand::Good));
    }

    #[test]
    fn test_zero_rooms_gives_no_per_room_metrics() {
        let record = ListingRecord {
            price_cold: Some(500.0),
            extra_costs: Some(100.0),
            extra_costs_kind: Some(ExtraCostsKind::Kalt),
            sqm: Some(40.0),
            rooms: Some(0.0),
            ..Default::default()
        };
        let evaluation = Evaluator::default().evaluate(&record);
        assert_eq!(evaluation.price_per_room, None);
        assert_eq!(evaluation.avg_room_size, None);
        assert_eq!(evaluation.room_size_band, None);
    }

    #[test]
    fn test_custom_thresholds() {
        let evaluator = Evaluator::new(EvaluationThresholds {
            good_max_price_per_sqm: 10.0,
            ok_max_price_per_sqm: 12.0,
            ..Default::default()
        });
        assert_eq!(evaluator.quality_label(11.0), QualityLabel::Ok);
        assert_eq!(evaluator.quality_label(13.0), QualityLabel::Expensive);
    }
}
