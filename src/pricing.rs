use crate::models::{ExtraCostsKind, ListingRecord, PriceDetails};

/// Resolve cold price, warm price and the Nebenkosten add-on from a record
/// whose extra-costs figure may be either an add-on or a warm-rent total.
///
/// An add-on that cannot be determined stays `None` rather than zero, so
/// "no utilities fee" and "unknown" remain distinguishable.
pub fn derive_price_details(record: &ListingRecord) -> PriceDetails {
    let cold_price = record.price_cold;
    let is_warm_figure = record.extra_costs_kind == Some(ExtraCostsKind::Warm);

    let extra_costs = match (record.extra_costs, is_warm_figure, cold_price) {
        (Some(figure), false, _) => Some(figure),
        (Some(figure), true, Some(cold)) if figure > cold => Some(figure - cold),
        _ => None,
    };

    let warm_price = if is_warm_figure {
        record.extra_costs
    } else {
        match (cold_price, extra_costs) {
            (Some(cold), Some(add_on)) => Some(cold + add_on),
            _ => None,
        }
    };

    PriceDetails {
        cold_price,
        warm_price,
        extra_costs,
    }
}
