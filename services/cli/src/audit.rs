use clap::Args;
use i9_audit::config::AppConfig;
use i9_audit::error::AuditError;
use i9_audit::telemetry;
use i9_audit::workflows::eligibility::{EligibilityAuditor, PageClassifier, PageRecord};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// JSON array of extracted page records; reads stdin when omitted
    pub(crate) input: Option<PathBuf>,
    /// Pretty-print the audit JSON
    #[arg(long)]
    pub(crate) pretty: bool,
    /// Override the configured log filter (for example `i9_audit=debug`)
    #[arg(long)]
    pub(crate) log_level: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// JSON array of extracted page records; reads stdin when omitted
    pub(crate) input: Option<PathBuf>,
    /// Override the configured log filter
    #[arg(long)]
    pub(crate) log_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClassifiedPage<'a> {
    page_number: u32,
    title: &'a str,
    section: &'static str,
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AuditError> {
    let config = load_config(args.log_level)?;
    let records = read_records(args.input.as_ref())?;
    info!(pages = records.len(), environment = ?config.environment, "auditing document");

    let audit = EligibilityAuditor::new(config.audit).audit(&records)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&audit)?
    } else {
        serde_json::to_string(&audit)?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AuditError> {
    load_config(args.log_level)?;
    let records = read_records(args.input.as_ref())?;

    let catalog = PageClassifier::new().classify_records(&records)?;
    let pages: Vec<ClassifiedPage<'_>> = catalog
        .pages()
        .iter()
        .map(|page| ClassifiedPage {
            page_number: page.number(),
            title: &page.title,
            section: page.section_type.label(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(())
}

fn load_config(log_level: Option<String>) -> Result<AppConfig, AuditError> {
    let mut config = AppConfig::load()?;
    if let Some(level) = log_level {
        config.telemetry.log_level = level;
    }
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn read_records(input: Option<&PathBuf>) -> Result<Vec<PageRecord>, AuditError> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&raw)?)
}
