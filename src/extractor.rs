use crate::locator::FieldLocator;
use crate::models::{ExtraCostsKind, ListingRecord};
use crate::numbers::{parse_area_sqm, parse_currency_amount, parse_room_count, parse_room_count_with_unit};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

/// Field a detail-row label refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    ColdRent,
    WarmRent,
    ExtraCosts,
    HeatingCosts,
    LivingArea,
    RoomCount,
    Unrecognized,
}

// Checked in this order; warm rent sits before extra costs because
// "inkl. Nebenkosten" labels name both.
static LABEL_PATTERNS: LazyLock<Vec<(DetailField, Regex)>> = LazyLock::new(|| {
    [
        (DetailField::ColdRent, r"kaltmiete|cold\s*rent|grundmiete|base\s*rent"),
        (
            DetailField::WarmRent,
            r"warmmiete|gesamtmiete|rent\s*including\s*utilities|total\s*rent|inkl\.?\s*nk|inkl\.?\s*nebenkosten|inklusive\s*nebenkosten",
        ),
        (
            DetailField::ExtraCosts,
            r"nebenkosten|betriebskosten|extra\s*costs|additional\s*costs|utilities",
        ),
        (DetailField::HeatingCosts, r"heizkosten|heating\s*costs"),
        (DetailField::LivingArea, r"wohnfl|living\s*space|fläche|\barea\b"),
        (DetailField::RoomCount, r"zimmer|räume|rooms?"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(&format!("(?i){}", pattern)).unwrap()))
    .collect()
});

static ROOM_QUALIFIERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)schlaf|bed|bade|bath").unwrap());

/// Classify a detail-row label. The first matching field wins; room labels
/// naming bedrooms or bathrooms are not a total room count.
pub fn classify_label(label: &str) -> DetailField {
    let field = LABEL_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(label))
        .map(|(field, _)| *field)
        .unwrap_or(DetailField::Unrecognized);

    if field == DetailField::RoomCount && ROOM_QUALIFIERS.is_match(label) {
        return DetailField::Unrecognized;
    }

    field
}

/// Extract a listing from raw HTML.
pub fn extract_listing_from_html(html: &str) -> ListingRecord {
    let document = Html::parse_document(html);
    extract_listing(&document)
}

/// Build a fresh record from the current document state.
pub fn extract_listing(document: &Html) -> ListingRecord {
    let locator = FieldLocator::new(document);

    let mut record = ListingRecord {
        title: locator.locate_title(),
        description: locator.locate_description(),
        location: locator.locate_location(),
        features: locator.locate_feature_tags(),
        ..Default::default()
    };

    apply_detail_rows(&mut record, &locator.locate_detail_rows());

    // Only the dedicated price element; body text would pick up warm-rent rows
    if record.price_cold.is_none() {
        if let Some(price_text) = locator.locate_price_element_text() {
            record.price_cold = parse_currency_amount(&price_text);
            tracing::trace!("Cold price from main price element: {:?}", record.price_cold);
        }
    }

    if record.price_cold.is_none() && record.price_warm.is_none() {
        let price_text: String = locator.locate_main_price_text().chars().take(120).collect();
        tracing::debug!("No rent found; price area reads: {}", price_text);
    }

    if record.sqm.is_none() || record.rooms.is_none() {
        let page_text = locator.visible_text();
        if record.sqm.is_none() {
            record.sqm = parse_area_sqm(&page_text);
            tracing::trace!("Living area from page text: {:?}", record.sqm);
        }
        if record.rooms.is_none() {
            record.rooms = parse_room_count_with_unit(&page_text);
            tracing::trace!("Room count from page text: {:?}", record.rooms);
        }
    }

    reconcile_warm_price(&mut record);

    tracing::debug!(
        "Extracted '{}' (cold: {:?}, warm: {:?}, extra: {:?} {:?}, sqm: {:?}, rooms: {:?})",
        record.title, record.price_cold, record.price_warm, record.extra_costs,
        record.extra_costs_kind, record.sqm, record.rooms
    );

    record
}

/// Single pass over the detail rows. Each field keeps its first parsed value,
/// except that an explicit Nebenkosten row replaces an extra-costs figure taken
/// from a warm-rent label.
fn apply_detail_rows(record: &mut ListingRecord, rows: &[(String, String)]) {
    for (label, value) in rows {
        let field = classify_label(label);

        match field {
            DetailField::ColdRent if record.price_cold.is_none() => {
                record.price_cold = parse_currency_amount(value);
            }
            DetailField::WarmRent => {
                let Some(amount) = parse_currency_amount(value) else {
                    continue;
                };
                if record.price_warm.is_none() {
                    record.price_warm = Some(amount);
                }
                if record.extra_costs.is_none() {
                    record.extra_costs = Some(amount);
                    record.extra_costs_kind = Some(ExtraCostsKind::Warm);
                }
            }
            DetailField::ExtraCosts if record.extra_costs_kind != Some(ExtraCostsKind::Kalt) => {
                if let Some(amount) = parse_currency_amount(value) {
                    record.extra_costs = Some(amount);
                    record.extra_costs_kind = Some(ExtraCostsKind::Kalt);
                }
            }
            DetailField::HeatingCosts if record.heating_costs.is_none() => {
                record.heating_costs = parse_currency_amount(value);
            }
            DetailField::LivingArea if record.sqm.is_none() => {
                record.sqm = parse_area_sqm(value);
            }
            DetailField::RoomCount if record.rooms.is_none() => {
                record.rooms = parse_room_count_with_unit(value)
                    .or_else(|| parse_room_count_with_unit(&format!("{} {}", label, value)))
                    .or_else(|| parse_room_count(value));
            }
            _ => continue,
        }

        tracing::debug!("Detail row '{}' = '{}' classified as {:?}", label, value, field);
    }
}

/// Derive the warm price from its components when it was not listed, and drop
/// a listed warm price that undercuts the cold price.
fn reconcile_warm_price(record: &mut ListingRecord) {
    let is_warm_figure = record.extra_costs_kind == Some(ExtraCostsKind::Warm);

    if let (Some(cold), Some(warm)) = (record.price_cold, record.price_warm) {
        if warm < cold && !is_warm_figure {
            tracing::debug!("Discarding warm price {} below cold price {}", warm, cold);
            record.price_warm = None;
        }
    }

    if record.price_warm.is_some() {
        return;
    }

    let Some(cold) = record.price_cold else {
        return;
    };

    let add_on = if is_warm_figure { None } else { record.extra_costs };
    if add_on.is_none() && record.heating_costs.is_none() {
        return;
    }

    record.price_warm = Some(cold + add_on.unwrap_or(0.0) + record.heating_costs.unwrap_or(0.0));
}
