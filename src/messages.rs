use crate::llm::CompletionClient;
use crate::models::{Language, ListingRecord};
use crate::prompts::{build_analysis_prompt, build_prompt, GoalType};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DepositAssessment {
    pub status: String,
    pub months_cold_rent: Option<f64>,
    pub has_upfront_payment: bool,
    pub upfront_payment_notes: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandlordDifficulty {
    pub score: Option<u8>,
    pub label: String,
    pub signals: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditDimensions {
    pub photos: String,
    pub price_fairness: String,
    pub contract_type: String,
    pub registration_status: String,
    pub description_quality: String,
    pub landlord_transparency: String,
    pub deposit_assessment: DepositAssessment,
    pub landlord_difficulty: LandlordDifficulty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClarificationQuestion {
    pub question: String,
    pub reason: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditSummary {
    pub risk_level: String,
    pub explanation: String,
}

/// Risk audit as returned by the analyst model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskAudit {
    pub dimensions: AuditDimensions,
    pub red_flags: Vec<Flag>,
    pub yellow_flags: Vec<Flag>,
    pub green_flags: Vec<Flag>,
    pub clarification_questions: Vec<ClarificationQuestion>,
    pub summary: AuditSummary,
}

/// Deterministic outreach message used when the model is unavailable.
pub fn build_template_message(listing: &ListingRecord, profile: &str, language: Language) -> String {
    let pick = |de: &'static str, en: &'static str| match language {
        Language::De => de,
        Language::En => en,
    };

    let size = listing
        .sqm
        .map(|sqm| format!("{} m²", sqm))
        .unwrap_or_else(|| "-".to_string());
    let rent = listing
        .price_cold
        .filter(|price| *price > 0.0)
        .map(|price| format!("{} € kalt", price))
        .unwrap_or_else(|| "-".to_string());
    let title = if listing.title.is_empty() { "-" } else { listing.title.as_str() };

    let lines = [
        pick("Hallo,", "Hello,").to_string(),
        String::new(),
        pick("ich interessiere mich für Ihr Inserat.", "I am interested in your listing.").to_string(),
        format!("{}: {}", pick("Titel", "Title"), title),
        format!("{}: {}", pick("Größe", "Size"), size),
        format!("{}: {}", pick("Miete", "Rent"), rent),
        String::new(),
        profile.trim().to_string(),
        String::new(),
        pick("Ich freue mich auf Ihre Rückmeldung.", "I look forward to your response.").to_string(),
        pick("Viele Grüße", "Best regards").to_string(),
    ];

    lines.join("\n").trim().to_string()
}

/// Generate an outreach message, falling back to the template on any model failure.
pub async fn generate_message(
    client: &dyn CompletionClient,
    model: &str,
    listing: &ListingRecord,
    profile: &str,
    goal: GoalType,
    language: Language,
) -> String {
    let prompt = build_prompt(listing, profile, goal, language);

    match client.complete(model, &prompt).await {
        Ok(message) => message.trim().to_string(),
        Err(e) => {
            tracing::warn!("Message generation failed, using template fallback: {}", e);
            build_template_message(listing, profile, language)
        }
    }
}

/// Pull the outermost JSON object out of a model response (which may be wrapped in markdown).
pub fn parse_risk_audit(response: &str) -> Result<RiskAudit> {
    let json = JSON_OBJECT
        .find(response)
        .map(|m| m.as_str())
        .unwrap_or(response);

    serde_json::from_str(json).context("Failed to parse risk audit JSON")
}

pub async fn analyze_listing(
    client: &dyn CompletionClient,
    model: &str,
    listing: &ListingRecord,
    language: Language,
) -> Result<RiskAudit> {
    let prompt = build_analysis_prompt(listing, language);
    let response = client.complete(model, &prompt).await?;
    parse_risk_audit(&response)
}
