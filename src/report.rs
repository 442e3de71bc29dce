use crate::evaluator::Evaluation;
use crate::models::{ExtraCostsKind, Language, ListingRecord};

const UNKNOWN: &str = "–";

fn format_euros(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("{} €", v),
        _ => UNKNOWN.to_string(),
    }
}

fn format_rate(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.2} {}", v, unit))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Plain-text overview of a listing and its evaluation.
pub fn render_overview(listing: &ListingRecord, evaluation: &Evaluation, language: Language) -> String {
    let en = language == Language::En;
    let prices = &evaluation.prices;

    let extra_costs = match (prices.extra_costs, listing.extra_costs_kind) {
        (Some(nk), _) => format!("{} €", nk),
        (None, Some(ExtraCostsKind::Warm)) => {
            if en { "warm rent listed".to_string() } else { "Warmmiete angegeben".to_string() }
        }
        _ => UNKNOWN.to_string(),
    };

    let room_size = match (evaluation.avg_room_size, evaluation.room_size_band) {
        (Some(size), Some(band)) => format!("{:.1} m² ({})", size, band.label(language)),
        _ => UNKNOWN.to_string(),
    };

    let mut out = String::new();
    let title = if listing.title.is_empty() {
        if en { "No title found" } else { "Kein Titel gefunden" }
    } else {
        listing.title.as_str()
    };
    out.push_str(&format!("{}\n", title));
    if !listing.location.is_empty() {
        out.push_str(&format!("{}\n", listing.location));
    }
    out.push('\n');

    let rows = [
        (if en { "Cold rent" } else { "Kaltmiete" }, format_euros(prices.cold_price)),
        (if en { "Extra costs" } else { "Nebenkosten" }, extra_costs),
        (if en { "Heating" } else { "Heizkosten" }, format_euros(listing.heating_costs)),
        (if en { "Warm rent" } else { "Warmmiete" }, format_euros(prices.warm_price)),
        (if en { "Area" } else { "Fläche" }, listing.sqm.map(|v| format!("{} m²", v)).unwrap_or_else(|| UNKNOWN.to_string())),
        (if en { "Rooms" } else { "Zimmer" }, listing.rooms.map(|v| v.to_string()).unwrap_or_else(|| UNKNOWN.to_string())),
        (if en { "€/m² cold" } else { "€/m² kalt" }, format_rate(evaluation.price_per_sqm_cold, "€/m²")),
        (if en { "€/m² warm" } else { "€/m² warm" }, format_rate(evaluation.price_per_sqm_warm, "€/m²")),
        (if en { "€/room warm" } else { "€/Zimmer warm" }, format_rate(evaluation.price_per_room, "€")),
        (if en { "Room size" } else { "Zimmergröße" }, room_size),
    ];

    for (label, value) in rows {
        out.push_str(&format!("{:<14} {}\n", format!("{}:", label), value));
    }

    out.push('\n');
    out.push_str(&format!(
        "{}: {}\n{}\n",
        if en { "Rating" } else { "Bewertung" },
        evaluation.label.label(language),
        evaluation.label.comment(language)
    ));

    if !listing.features.is_empty() {
        out.push_str(&format!("\n{}: {}\n", if en { "Features" } else { "Merkmale" }, listing.features.join(", ")));
    }

    out
}
