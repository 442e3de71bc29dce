use crate::llm::Prompt;
use crate::models::{Language, ListingRecord};
use serde::{Deserialize, Serialize};

/// What kind of tenancy the outreach message applies for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    #[default]
    Single,
    Wg,
    Commercial,
}

const GOAL_SINGLE: &str = "\
The tenant applies alone for the whole apartment as their long-term home.
Stress reliability, a calm lifestyle and the wish to stay for years.";

const GOAL_WG: &str = "\
The tenant applies together with a friend as a shared flat (WG).
Mention that both have stable incomes and are quiet, tidy flatmates;
ask politely whether a WG is acceptable to the landlord.";

const GOAL_COMMERCIAL: &str = "\
The tenant wants to use the space partly for quiet desk work (home office, no customer traffic).
Make clear the use is non-disruptive and ask whether this mixed use is acceptable.";

const SYSTEM_DE: &str = "\
Du schreibst kurze Erstkontakt-Nachrichten an private Vermieter auf Kleinanzeigen.
Ziel: eine natürliche, freundliche Nachricht, auf die der Vermieter antwortet und einen Besichtigungstermin anbietet.

REGELN:
- Kurz (6–10 Sätze), Sie-Form.
- Zuverlässigkeit dezent zeigen (fester Job, ruhiger Alltag).
- Keine SCHUFA, keine Unterlagen, keine Einkommensdetails erwähnen.
- Nicht bürokratisch, nicht nach Vorlage oder KI klingen.
- Auf den Inhalt des Inserats eingehen.

AUSGABE: Nur der Nachrichtentext, ohne Erklärungen.";

const SYSTEM_EN: &str = "\
You write short first-contact messages to private landlords on Kleinanzeigen.
Goal: a natural, friendly message that gets the landlord to reply and offer a viewing.

RULES:
- Short (6–10 sentences), polite.
- Show reliability subtly (steady job, calm lifestyle).
- Never mention SCHUFA, documents or income details.
- Never sound bureaucratic, templated or AI-generated.
- Refer to the content of the listing.

OUTPUT: Only the message text, no explanations.";

pub const ANALYST_SYSTEM_PROMPT: &str = r#"You are an assistant that evaluates rental listings in Germany from the perspective of a highly cautious tenant.

Silently build a risk checklist (legal & formal status, pricing structure, building condition, livability, landlord behavior & contract risks), scan the listing against it, and treat important missing information as a risk. When in doubt, choose more caution.

Return ONLY a JSON object, no markdown, using only the allowed values:

{
  "dimensions": {
    "photos": "present" | "missing" | "suspicious",
    "price_fairness": "fair" | "high" | "low" | "unclear",
    "contract_type": "long_term" | "short_term" | "limited" | "unclear" | "weird",
    "registration_status": "ok" | "no_registration" | "unclear",
    "description_quality": "detailed" | "average" | "vague",
    "landlord_transparency": "clear" | "average" | "unclear" | "suspicious",
    "deposit_assessment": {
      "status": "ok" | "borderline" | "red_flag" | "unknown",
      "months_cold_rent": number | null,
      "has_upfront_payment": boolean,
      "upfront_payment_notes": "",
      "reason": ""
    },
    "landlord_difficulty": {
      "score": 1-5,
      "label": "easy" | "rather_easy" | "neutral" | "high_maintenance" | "nightmare",
      "signals": [],
      "summary": ""
    }
  },
  "red_flags": [{"type": "", "reason": "", "evidence": ""}],
  "yellow_flags": [{"type": "", "reason": "", "evidence": ""}],
  "green_flags": [{"type": "", "reason": "", "evidence": ""}],
  "clarification_questions": [{"question": "", "reason": "", "evidence": ""}],
  "summary": {"risk_level": "low" | "medium" | "high", "explanation": ""}
}

Produce flags only with clear evidence. Ask 1 to 3 concrete clarification questions."#;

pub fn goal_text(goal: GoalType) -> &'static str {
    match goal {
        GoalType::Single => GOAL_SINGLE,
        GoalType::Wg => GOAL_WG,
        GoalType::Commercial => GOAL_COMMERCIAL,
    }
}

pub fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::De => SYSTEM_DE,
        Language::En => SYSTEM_EN,
    }
}

fn listing_json(listing: &ListingRecord) -> String {
    serde_json::to_string_pretty(listing).unwrap_or_else(|e| {
        tracing::warn!("Failed to serialize listing for prompt: {}", e);
        String::from("{}")
    })
}

/// Outreach prompt: tenant profile, goal and listing as the user turn.
pub fn build_prompt(listing: &ListingRecord, profile: &str, goal: GoalType, language: Language) -> Prompt {
    let lang_instruction = match language {
        Language::En => "Write the final message in clear, polite English.",
        Language::De => "Schreibe die finale Nachricht klar und höflich auf Deutsch.",
    };

    let user = format!(
        "TENANT PROFILE:\n{}\n\nGOAL:\n{}\n\nLISTING:\n{}\n\nTASK:\n{}\n\
         Write a concise message (6–10 lines). No meta commentary. Respond with the message only.",
        profile.trim(),
        goal_text(goal),
        listing_json(listing),
        lang_instruction
    );

    Prompt {
        system: Some(system_prompt(language).to_string()),
        user,
    }
}

/// Risk-audit prompt for the analyst role.
pub fn build_analysis_prompt(listing: &ListingRecord, language: Language) -> Prompt {
    let lang_instruction = match language {
        Language::En => "IMPORTANT: All text values (reasons, evidence, questions, explanation) MUST be in English.",
        Language::De => "WICHTIG: Alle Textwerte (Begründungen, Beweise, Fragen, Erklärung) MÜSSEN auf Deutsch sein.",
    };

    let user = format!(
        "Analyze the following rental listing and classify it according to the rules above.\n\
         Fill every dimension, even if the listing does not mention the information.\n\n\
         {}\n\nListing:\n\n{}\n\nBegin your JSON response now.",
        lang_instruction,
        listing_json(listing)
    );

    Prompt {
        system: Some(ANALYST_SYSTEM_PROMPT.to_string()),
        user,
    }
}
