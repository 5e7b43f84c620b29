//! Insert command handler.

use crate::args::InsertArgs;
use crate::commands::{session, Out};
use crate::ledger::Outcome;
use crate::{Config, Result};

/// Records a new expense dated today.
///
/// Input that fails validation is not an error. The returned `Out` carries
/// `Outcome::Rejected` with the reason and nothing is written.
///
/// # Errors
///
/// - Returns an error if a database operation fails.
pub async fn insert(config: Config, args: InsertArgs) -> Result<Out<Outcome>> {
    let mut ledger = session(&config).await?;
    let outcome = ledger
        .submit_new(args.amount(), args.category(), args.note())
        .await?;

    let message = match &outcome {
        Outcome::Created(id) => match ledger.working_set().iter().find(|r| r.id() == *id) {
            Some(record) => format!(
                "Recorded expense {id}: {} for {} on {}",
                record.amount(),
                record.category(),
                record.date()
            ),
            None => format!("Recorded expense {id}"),
        },
        Outcome::Rejected(reason) => format!("Expense not recorded: {reason}"),
        other => format!("Unexpected outcome {other:?}"),
    };
    Ok(Out::new(message, outcome))
}
