use regex::Regex;
use std::sync::LazyLock;

static CURRENCY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:€|\beur\b)\s*([\d.,]+)|([\d.,]+)\s*(?:€|eur\b)").unwrap()
});

// A range sharing one unit ("45 - 60 m²", "45 und 60 m²") reports its lower bound.
static AREA_SQM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:[.,]\d+)?)(?:\s*(?:-|–|bis|und|to|and)\s*\d+(?:[.,]\d+)?)?\s*(?:m²|qm\b)",
    )
    .unwrap()
});

static ROOM_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*-?\s*(?:zimmer|räume|rooms?\b)").unwrap()
});

static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").unwrap());

/// Parse a currency-marked amount (e.g., "1.234,56 €", "€ 950", "1,234.56 EUR").
///
/// Separator policy, tuned for German rent figures:
/// - both `,` and `.` present: the one closer to the end is the decimal separator
/// - only `,`: decimal separator ("12,50" -> 12.5)
/// - only `.`: thousands separator ("1.200" -> 1200)
pub fn parse_currency_amount(text: &str) -> Option<f64> {
    let caps = CURRENCY_AMOUNT.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    normalize_amount(raw)
}

fn normalize_amount(raw: &str) -> Option<f64> {
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let cleaned = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => raw.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => raw.replace(',', ""),
        (Some(_), None) => raw.replacen(',', ".", 1),
        (None, Some(_)) => raw.replace('.', ""),
        (None, None) => raw.to_string(),
    };

    parse_leading_float(&cleaned)
}

/// Parse the longest numeric prefix ("1.234,5" -> 1.234), the way a lenient
/// float parser reads leftover separators.
fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let mut end = 0;
    let mut seen_dot = false;

    for (idx, c) in trimmed.char_indices() {
        match c {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }

    if end == 0 {
        return None;
    }

    trimmed[..end].parse::<f64>().ok()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replacen(',', ".", 1).parse::<f64>().ok()
}

/// Parse the first number followed by a square-meter marker (e.g., "62 m²", "45,5 qm").
pub fn parse_area_sqm(text: &str) -> Option<f64> {
    let caps = AREA_SQM.captures(text)?;
    parse_decimal(caps.get(1)?.as_str()).filter(|sqm| *sqm > 0.0)
}

/// Parse a number followed by a room word (e.g., "3,5 Zimmer", "2 rooms", "3-Zimmer").
/// Safe to run over full page text.
pub fn parse_room_count_with_unit(text: &str) -> Option<f64> {
    let caps = ROOM_COUNT.captures(text)?;
    parse_decimal(caps.get(1)?.as_str()).filter(|rooms| *rooms > 0.0)
}

/// Parse a room count, falling back to the first bare number when no room
/// word is present. Only meant for fragments already known to hold a room count.
pub fn parse_room_count(text: &str) -> Option<f64> {
    parse_room_count_with_unit(text).or_else(|| {
        let caps = BARE_NUMBER.captures(text)?;
        parse_decimal(caps.get(1)?.as_str()).filter(|rooms| *rooms > 0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_german_format() {
        assert_eq!(parse_currency_amount("1.234,56 €"), Some(1234.56));
    }

    #[test]
    fn test_parse_currency_marker_before_digits() {
        assert_eq!(parse_currency_amount("€ 950"), Some(950.0));
        assert_eq!(parse_currency_amount("€950 VB"), Some(950.0));
    }

    #[test]
    fn test_parse_currency_english_format() {
        assert_eq!(parse_currency_amount("1,234.56 €"), Some(1234.56));
    }

    #[test]
    fn test_parse_currency_comma_only_is_decimal() {
        assert_eq!(parse_currency_amount("12,50 €"), Some(12.5));
    }

    #[test]
    fn test_parse_currency_dot_only_is_thousands() {
        assert_eq!(parse_currency_amount("1.200 €"), Some(1200.0));
        assert_eq!(parse_currency_amount("Miete: 1.200.000 €"), Some(1_200_000.0));
    }

    #[test]
    fn test_parse_currency_eur_marker() {
        assert_eq!(parse_currency_amount("650 EUR"), Some(650.0));
        assert_eq!(parse_currency_amount("EUR 720"), Some(720.0));
    }

    #[test]
    fn test_parse_currency_no_numbers() {
        assert_eq!(parse_currency_amount("no numbers"), None);
        assert_eq!(parse_currency_amount("Preis auf Anfrage €"), None);
        assert_eq!(parse_currency_amount(""), None);
    }

    #[test]
    fn test_parse_currency_without_marker() {
        assert_eq!(parse_currency_amount("1250"), None);
    }

    #[test]
    fn test_parse_currency_separators_without_digits() {
        assert_eq!(parse_currency_amount("., €"), None);
    }

    #[test]
    fn test_parse_currency_repeated_commas_reads_prefix() {
        assert_eq!(parse_currency_amount("1,234,567 €"), Some(1.234));
    }

    #[test]
    fn test_parse_currency_first_match_in_text() {
        let text = "Kaltmiete 650 € zzgl. 150 € Nebenkosten";
        assert_eq!(parse_currency_amount(text), Some(650.0));
    }

    #[test]
    fn test_parse_area_simple() {
        assert_eq!(parse_area_sqm("62 m²"), Some(62.0));
        assert_eq!(parse_area_sqm("Wohnfläche: 45,5 m²"), Some(45.5));
        assert_eq!(parse_area_sqm("ca. 80 qm"), Some(80.0));
    }

    #[test]
    fn test_parse_area_range_takes_first() {
        assert_eq!(parse_area_sqm("zwischen 45 und 60 m²"), Some(45.0));
        assert_eq!(parse_area_sqm("45 - 60 m²"), Some(45.0));
    }

    #[test]
    fn test_parse_area_no_unit() {
        assert_eq!(parse_area_sqm("62 Quadratfuß"), None);
        assert_eq!(parse_area_sqm("keine Angabe"), None);
    }

    #[test]
    fn test_parse_area_zero_is_rejected() {
        assert_eq!(parse_area_sqm("0 m²"), None);
    }

    #[test]
    fn test_parse_room_count_german_decimal() {
        assert_eq!(parse_room_count("3,5 Zimmer"), Some(3.5));
        assert_eq!(parse_room_count("2.5 Zimmer"), Some(2.5));
    }

    #[test]
    fn test_parse_room_count_hyphenated() {
        assert_eq!(parse_room_count_with_unit("Schöne 3-Zimmer-Wohnung"), Some(3.0));
        assert_eq!(parse_room_count_with_unit("3,5-room flat"), Some(3.5));
    }

    #[test]
    fn test_parse_room_count_english_and_raeume() {
        assert_eq!(parse_room_count("3 rooms"), Some(3.0));
        assert_eq!(parse_room_count("4 Räume"), Some(4.0));
    }

    #[test]
    fn test_parse_room_count_bedrooms_in_isolation() {
        assert_eq!(parse_room_count("2 bedrooms"), Some(2.0));
        assert_eq!(parse_room_count_with_unit("2 bedrooms"), None);
    }

    #[test]
    fn test_parse_room_count_bare_number_fallback() {
        assert_eq!(parse_room_count("3"), Some(3.0));
        assert_eq!(parse_room_count("2,5"), Some(2.5));
        assert_eq!(parse_room_count_with_unit("3"), None);
    }

    #[test]
    fn test_parse_room_count_schlafzimmer_needs_fallback() {
        assert_eq!(parse_room_count_with_unit("2 Schlafzimmer"), None);
    }

    #[test]
    fn test_parse_room_count_no_numbers() {
        assert_eq!(parse_room_count("Zimmer"), None);
        assert_eq!(parse_room_count(""), None);
    }
}
