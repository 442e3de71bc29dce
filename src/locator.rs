use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const TITLE_SELECTORS: &[&str] = &["#viewad-title", "h1", "[data-testid='ad-title']"];
const DESCRIPTION_SELECTORS: &[&str] = &["[data-testid='ad-description']", "#viewad-description-text"];
const LOCATION_SELECTORS: &[&str] = &["[data-testid='location']", "#viewad-locality", ".location"];
const PRICE_SELECTORS: &[&str] = &["#viewad-price", "[data-testid='ad-price']"];
const DETAIL_ROW_SELECTOR: &str = ".addetailslist--detail";
const DETAIL_VALUE_SELECTOR: &str = ".addetailslist--detail--value";
const FEATURE_SELECTOR: &str = "[data-testid='feature-tag'], .addetailslist--detail--value .tag, \
     .addetailslist--detail--value .badge, .adtag, .checktag";

/// Classes Kleinanzeigen puts on the hidden status prefix inside the title
const STATUS_CLASSES: &[&str] = &["pvap-reserved-title", "is-hidden"];

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

static STATUS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:reserviert|reserved|gelöscht|deleted|nicht\s+mehr\s+verfügbar|no\s+longer\s+available)\s*•?\s*",
    )
    .unwrap()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run into one space and trim.
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Remove status markers from a title line; returns None when nothing title-like survives.
pub fn clean_title_line(line: &str) -> Option<String> {
    let stripped = STATUS_MARKER.replace_all(line, "");
    let stripped = stripped.trim_matches(|c: char| c == '•' || c.is_whitespace());
    let cleaned = clean_text(&stripped.replace('•', " "));

    if cleaned.chars().any(char::is_alphabetic) {
        Some(cleaned)
    } else {
        None
    }
}

/// Best-effort text fragments for each listing field. Every lookup degrades to
/// an empty value when the page lacks the expected markup.
pub struct FieldLocator<'a> {
    document: &'a Html,
}

impl<'a> FieldLocator<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self { document }
    }

    fn select_first(&self, selectors: &[&str]) -> Option<ElementRef<'a>> {
        selectors.iter().find_map(|sel_str| {
            Selector::parse(sel_str)
                .ok()
                .and_then(|sel| self.document.select(&sel).next())
        })
    }

    /// Visible text of the body, with line breaks around block elements.
    pub fn visible_text(&self) -> String {
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| self.document.select(&sel).next())
            .unwrap_or_else(|| self.document.root_element());

        let mut out = String::new();
        collect_text(body, &mut out, &|_| false);
        out
    }

    pub fn locate_title(&self) -> String {
        let Some(heading) = self.select_first(TITLE_SELECTORS) else {
            tracing::trace!("No title element found");
            return String::new();
        };

        let mut raw = String::new();
        collect_text(heading, &mut raw, &|el| {
            el.value().classes().any(|class| STATUS_CLASSES.contains(&class))
        });

        // Keep the longest surviving line; the first one wins on ties
        raw.lines()
            .filter_map(clean_title_line)
            .fold(String::new(), |best, line| {
                if line.chars().count() > best.chars().count() {
                    line
                } else {
                    best
                }
            })
    }

    pub fn locate_description(&self) -> String {
        match self.select_first(DESCRIPTION_SELECTORS) {
            Some(el) => clean_text(&element_text(el)),
            None => clean_text(&self.visible_text()),
        }
    }

    pub fn locate_location(&self) -> String {
        self.select_first(LOCATION_SELECTORS)
            .map(|el| clean_text(&element_text(el)))
            .unwrap_or_default()
    }

    /// Label/value pairs of the structured details list, in document order.
    /// The label is the row text without whatever the value element contributes.
    pub fn locate_detail_rows(&self) -> Vec<(String, String)> {
        let (Ok(row_sel), Ok(value_sel)) = (
            Selector::parse(DETAIL_ROW_SELECTOR),
            Selector::parse(DETAIL_VALUE_SELECTOR),
        ) else {
            return Vec::new();
        };

        self.document
            .select(&row_sel)
            .map(|row| match row.select(&value_sel).next() {
                Some(value_el) => {
                    let mut label = String::new();
                    collect_text(row, &mut label, &|el| el.id() == value_el.id());
                    (clean_text(&label), clean_text(&element_text(value_el)))
                }
                None => {
                    let text = clean_text(&element_text(row));
                    (text.clone(), text)
                }
            })
            .collect()
    }

    /// Text of the dedicated price element, if the page has one.
    pub fn locate_price_element_text(&self) -> Option<String> {
        self.select_first(PRICE_SELECTORS)
            .map(|el| clean_text(&element_text(el)))
    }

    pub fn locate_main_price_text(&self) -> String {
        self.locate_price_element_text()
            .unwrap_or_else(|| clean_text(&self.visible_text()))
    }

    pub fn locate_feature_tags(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse(FEATURE_SELECTOR) else {
            return Vec::new();
        };

        self.document
            .select(&selector)
            .map(|el| clean_text(&element_text(el)))
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out, &|_| false);
    out
}

/// Append the text under `element`, skipping non-rendered tags and any
/// subtree for which `skip` returns true.
fn collect_text(element: ElementRef<'_>, out: &mut String, skip: &dyn Fn(ElementRef<'_>) -> bool) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) || skip(element) {
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            collect_text(child_el, out, skip);
        }
    }

    if block {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Schöne\n\t Wohnung  "), "Schöne Wohnung");
    }

    #[test]
    fn test_clean_title_line_strips_status_chain() {
        assert_eq!(
            clean_title_line("Reserviert • Gelöscht • Schöne 2-Zimmer-Wohnung").as_deref(),
            Some("Schöne 2-Zimmer-Wohnung")
        );
        assert_eq!(
            clean_title_line("RESERVED • DELETED • Bright flat").as_deref(),
            Some("Bright flat")
        );
        assert_eq!(clean_title_line("Reserviert •"), None);
        assert_eq!(clean_title_line(" • "), None);
    }

    #[test]
    fn test_clean_title_line_not_available() {
        assert_eq!(
            clean_title_line("Nicht mehr verfügbar Altbauwohnung").as_deref(),
            Some("Altbauwohnung")
        );
    }

    #[test]
    fn test_locate_title_with_status_prefix() {
        let html = r#"
            <html><body>
                <h1 id="viewad-title">Reserviert • Gelöscht • Schöne 2-Zimmer-Wohnung</h1>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_title(), "Schöne 2-Zimmer-Wohnung");
    }

    #[test]
    fn test_locate_title_skips_hidden_status_spans() {
        let html = r#"
            <html><body>
                <h1 id="viewad-title">
                    <span class="pvap-reserved-title">Reserviert • </span>
                    <span class="is-hidden">Gelöscht • </span>
                    Helle Wohnung am Park
                </h1>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_title(), "Helle Wohnung am Park");
    }

    #[test]
    fn test_locate_title_prefers_longest_line() {
        let html = "<html><body><h1>Top\nGemütliche Dachgeschosswohnung\nDeleted</h1></body></html>";
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_title(), "Gemütliche Dachgeschosswohnung");
    }

    #[test]
    fn test_locate_title_missing() {
        let document = Html::parse_document("<html><body><p>nothing</p></body></html>");
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_title(), "");
    }

    #[test]
    fn test_locate_description_falls_back_to_body() {
        let html = r#"
            <html><head><title>ignored</title></head><body>
                <p>Ruhige   Lage</p>
                <script>var x = 1;</script>
                <p>Balkon</p>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_description(), "Ruhige Lage Balkon");
    }

    #[test]
    fn test_locate_description_structured() {
        let html = r#"
            <html><body>
                <p id="viewad-description-text">Helle   Wohnung<br>mit Balkon</p>
                <p>Footer</p>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_description(), "Helle Wohnung mit Balkon");
    }

    #[test]
    fn test_locate_location_fallbacks() {
        let html = r#"<html><body><div class="location"> 74072 Heilbronn </div></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(FieldLocator::new(&document).locate_location(), "74072 Heilbronn");

        let empty = Html::parse_document("<html><body></body></html>");
        assert_eq!(FieldLocator::new(&empty).locate_location(), "");
    }

    #[test]
    fn test_locate_detail_rows_isolates_label() {
        let html = r#"
            <html><body>
                <ul class="addetailslist">
                    <li class="addetailslist--detail">
                        Kaltmiete<span class="addetailslist--detail--value">650 €</span>
                    </li>
                    <li class="addetailslist--detail">
                        Wohnfläche<span class="addetailslist--detail--value"><b>62</b> m²</span>
                    </li>
                    <li class="addetailslist--detail">Haustiere erlaubt</li>
                </ul>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let rows = FieldLocator::new(&document).locate_detail_rows();

        assert_eq!(
            rows,
            vec![
                ("Kaltmiete".to_string(), "650 €".to_string()),
                ("Wohnfläche".to_string(), "62 m²".to_string()),
                ("Haustiere erlaubt".to_string(), "Haustiere erlaubt".to_string()),
            ]
        );
    }

    #[test]
    fn test_locate_detail_rows_leaves_document_untouched() {
        let html = r#"
            <html><body>
                <li class="addetailslist--detail">Zimmer<span class="addetailslist--detail--value">3</span></li>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        let first = locator.locate_detail_rows();
        let second = locator.locate_detail_rows();
        assert_eq!(first, second);
        assert!(locator.visible_text().contains("Zimmer3"));
    }

    #[test]
    fn test_locate_main_price_text() {
        let html = r#"<html><body><h2 id="viewad-price"> 950 €  VB </h2></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(FieldLocator::new(&document).locate_main_price_text(), "950 € VB");
    }

    #[test]
    fn test_locate_main_price_text_falls_back_to_body() {
        let html = r#"<html><body><p>Miete</p><p>720 €</p></body></html>"#;
        let document = Html::parse_document(html);
        let locator = FieldLocator::new(&document);
        assert_eq!(locator.locate_price_element_text(), None);
        assert_eq!(locator.locate_main_price_text(), "Miete 720 €");
    }

    #[test]
    fn test_locate_feature_tags_document_order() {
        let html = r#"
            <html><body>
                <li class="checktag">Balkon</li>
                <span data-testid="feature-tag">Einbauküche</span>
                <span class="adtag">  </span>
                <li class="checktag">Balkon</li>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        let tags = FieldLocator::new(&document).locate_feature_tags();
        assert_eq!(tags, vec!["Balkon", "Einbauküche", "Balkon"]);
    }
}
