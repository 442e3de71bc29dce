mod config;
mod evaluator;
mod extractor;
mod http_client;
mod llm;
mod locator;
mod messages;
mod models;
mod numbers;
mod pricing;
mod prompts;
mod report;
mod settings;
mod source;

use anyhow::Result;
use clap::Parser;
use config::Config;
use evaluator::{Evaluation, Evaluator};
use llm::OpenRouterClient;
use messages::RiskAudit;
use models::{Language, ListingRecord};
use prompts::GoalType;
use serde::Serialize;
use settings::{Settings, SettingsStore, SettingsUpdate};
use source::{FileSource, HttpSource, PageSource};

#[derive(Parser, Debug)]
#[command(name = "mietcopilot")]
#[command(about = "Extract, evaluate and answer Kleinanzeigen rental listings", long_about = None)]
struct Args {
    /// Read the listing from a saved HTML page
    #[arg(long, conflicts_with = "url")]
    file: Option<String>,

    /// Fetch the listing from a live URL
    #[arg(long)]
    url: Option<String>,

    /// Save the fetched HTML to this path
    #[arg(long)]
    save_html: Option<String>,

    /// Print listing and evaluation as JSON
    #[arg(long)]
    json: bool,

    /// Draft an outreach message to the landlord
    #[arg(long)]
    message: bool,

    /// Run the risk audit on the listing
    #[arg(long)]
    analyze: bool,

    /// Tenancy goal used for the outreach message
    #[arg(long, value_enum, default_value_t = GoalType::Single)]
    goal: GoalType,

    /// Output language (defaults to the stored setting)
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// Store the tenant profile text (use @path to read it from a file)
    #[arg(long)]
    set_profile: Option<String>,

    /// Store the OpenRouter model id
    #[arg(long)]
    set_model: Option<String>,

    /// Store the default output language
    #[arg(long, value_enum)]
    set_language: Option<Language>,

    /// Store the OpenRouter API key
    #[arg(long)]
    set_api_key: Option<String>,

    /// Print the effective settings
    #[arg(long)]
    show_settings: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    listing: &'a ListingRecord,
    evaluation: &'a Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_audit: Option<&'a RiskAudit>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !std::path::Path::new(config::CONFIG_PATH).exists() {
        eprintln!("No config file found, creating default {}", config::CONFIG_PATH);
        Config::create_default()?;
    }
    let config = Config::load()?;

    // Initialize logging - use RUST_LOG env var if set, otherwise use config
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    } else {
        let level = match config.tracing_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            other => {
                eprintln!("Invalid tracing level '{}', using 'info'", other);
                tracing::Level::INFO
            }
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }

    let store = SettingsStore::new(&config.settings_db)?;
    let env_api_key = std::env::var("OPENROUTER_API_KEY").ok();

    if update_settings(&store, &args)? {
        tracing::info!("Settings saved to {}", config.settings_db);
    }

    let settings = store.get_settings(env_api_key.as_deref())?;

    if args.show_settings {
        print_settings(&store, &settings)?;
    }

    let source: Box<dyn PageSource> = match (&args.file, &args.url) {
        (Some(path), _) => Box::new(FileSource::new(path)),
        (None, Some(url)) => Box::new(HttpSource::new(url, &config.user_agent)?),
        (None, None) => {
            if !args.show_settings && !has_settings_update(&args) {
                eprintln!("Nothing to do: pass --file or --url (see --help)");
            }
            return Ok(());
        }
    };

    tracing::info!("Reading listing from {}", source.name());
    let html = source.fetch_html().await?;

    if let Some(path) = &args.save_html {
        tokio::fs::write(path, &html).await?;
        tracing::info!("HTML saved to {}", path);
    }

    let listing = extractor::extract_listing_from_html(&html);
    if !listing.has_sufficient_info() {
        tracing::warn!("Listing '{}' has too little information for a reliable evaluation", listing.title);
    }

    let evaluation = Evaluator::new(config.thresholds).evaluate(&listing);
    let language = args.language.unwrap_or(settings.language);

    let llm_client = if args.message || args.analyze {
        Some(OpenRouterClient::new(&config.openrouter_base_url, &settings.openrouter_api_key)?)
    } else {
        None
    };

    let message = match (&llm_client, args.message) {
        (Some(client), true) => Some(
            messages::generate_message(
                client,
                &settings.model,
                &listing,
                &settings.profile_text,
                args.goal,
                language,
            )
            .await,
        ),
        _ => None,
    };

    let risk_audit = match (&llm_client, args.analyze) {
        (Some(client), true) => {
            match messages::analyze_listing(client, &settings.model, &listing, language).await {
                Ok(audit) => Some(audit),
                Err(e) => {
                    tracing::error!("Risk audit failed: {:#}", e);
                    None
                }
            }
        }
        _ => None,
    };

    if args.json {
        let output = JsonOutput {
            listing: &listing,
            evaluation: &evaluation,
            message: message.as_deref(),
            risk_audit: risk_audit.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", report::render_overview(&listing, &evaluation, language));

    if let Some(message) = &message {
        println!("\n{}\n{}", "=".repeat(60), message);
    }

    if let Some(audit) = &risk_audit {
        println!("\n{}", "=".repeat(60));
        print_risk_audit(audit);
    }

    Ok(())
}

fn has_settings_update(args: &Args) -> bool {
    args.set_profile.is_some()
        || args.set_model.is_some()
        || args.set_language.is_some()
        || args.set_api_key.is_some()
}

/// Apply the --set-* flags. Returns whether anything was written.
fn update_settings(store: &SettingsStore, args: &Args) -> Result<bool> {
    if !has_settings_update(args) {
        return Ok(false);
    }

    if let Some(profile) = &args.set_profile {
        let text = match profile.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)?,
            None => profile.clone(),
        };
        store.set_profile_text(&text)?;
    }

    store.set_settings(&SettingsUpdate {
        model: args.set_model.clone(),
        language: args.set_language,
        openrouter_api_key: args.set_api_key.clone(),
    })?;

    Ok(true)
}

fn print_settings(store: &SettingsStore, settings: &Settings) -> Result<()> {
    let api_key = if settings.openrouter_api_key.is_empty() {
        "(not set)".to_string()
    } else {
        format!("set ({} chars)", settings.openrouter_api_key.len())
    };

    println!("Model:    {}", settings.model);
    println!("Language: {}", settings.language.code());
    println!("API key:  {}", api_key);
    if let Some(updated_at) = store.updated_at("profile_text")? {
        println!("Profile (updated {}):", updated_at.format("%Y-%m-%d %H:%M"));
    } else {
        println!("Profile (default):");
    }
    println!("{}", settings.profile_text);
    Ok(())
}

fn print_risk_audit(audit: &RiskAudit) {
    println!("Risk level: {}", audit.summary.risk_level);
    if !audit.summary.explanation.is_empty() {
        println!("{}", audit.summary.explanation);
    }

    let groups = [
        ("Red flags", &audit.red_flags),
        ("Yellow flags", &audit.yellow_flags),
        ("Green flags", &audit.green_flags),
    ];
    for (heading, flags) in groups {
        if flags.is_empty() {
            continue;
        }
        println!("\n{}:", heading);
        for flag in flags {
            println!("  - [{}] {}", flag.kind, flag.reason);
        }
    }

    if !audit.clarification_questions.is_empty() {
        println!("\nQuestions for the landlord:");
        for question in &audit.clarification_questions {
            println!("  - {}", question.question);
        }
    }
}
