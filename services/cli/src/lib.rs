mod audit;
mod cli;

use i9_audit::error::AuditError;

pub fn run() -> Result<(), AuditError> {
    cli::run()
}
