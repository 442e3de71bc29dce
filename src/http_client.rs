use anyhow::Result;
use reqwest::{header, Client};

/// Creates an HTTP client that sends the headers a German desktop browser would,
/// so listing pages are served the same markup the extractor expects.
pub fn create_http_client(user_agent: &str) -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7")
    );
    headers.insert(
        header::DNT,
        header::HeaderValue::from_static("1")
    );
    headers.insert(
        "Upgrade-Insecure-Requests",
        header::HeaderValue::from_static("1")
    );
    headers.insert(
        "Sec-Fetch-Dest",
        header::HeaderValue::from_static("document")
    );
    headers.insert(
        "Sec-Fetch-Mode",
        header::HeaderValue::from_static("navigate")
    );

    let client = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    Ok(client)
}

/// Whether the HTML looks like a bot-check interstitial rather than a listing
pub fn is_captcha_page(html: &str) -> bool {
    let html_lower = html.to_lowercase();

    html_lower.contains("captcha") ||
    html_lower.contains("cf-browser-verification") ||
    html_lower.contains("cf_chl_opt") ||
    html_lower.contains("bot detection") ||
    html_lower.contains("access denied")
}
