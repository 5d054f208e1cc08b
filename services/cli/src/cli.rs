use crate::audit::{run_audit, run_classify, AuditArgs, ClassifyArgs};
use clap::{Parser, Subcommand};
use i9_audit::error::AuditError;

#[derive(Parser, Debug)]
#[command(
    name = "I-9 Audit",
    about = "Audit extracted I-9 employment eligibility packets from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble, select, match and score one document's pages
    Audit(AuditArgs),
    /// Print the section assigned to every page without auditing
    Classify(ClassifyArgs),
}

pub(crate) fn run() -> Result<(), AuditError> {
    match Cli::parse().command {
        Command::Audit(args) => run_audit(args),
        Command::Classify(args) => run_classify(args),
    }
}
