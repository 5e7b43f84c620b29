use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the ledger home directory, an initial `config.json` and an empty database.
///
/// # Errors
/// - Returns an error if a ledger already exists at `ledger_home`.
/// - Returns an error if any file or database operation fails.
pub async fn init(ledger_home: &Path) -> Result<Out<String>> {
    let config = Config::create(ledger_home).await?;
    let db = config.sqlite_path().display().to_string();
    Ok(Out::new(
        format!("Created a new ledger at {}", config.root().display()),
        db,
    ))
}
