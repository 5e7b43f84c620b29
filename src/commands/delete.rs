//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{session, Out};
use crate::ledger::Outcome;
use crate::{Config, Result};

/// Deletes an expense by id. Deleting an id that does not exist succeeds and changes nothing.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Outcome>> {
    let mut ledger = session(&config).await?;
    let existed = ledger.working_set().iter().any(|r| r.id() == args.id());
    let outcome = ledger.request_delete(args.id()).await?;

    let message = if existed {
        format!("Deleted expense {}", args.id())
    } else {
        format!("No expense with id {}, nothing deleted", args.id())
    };
    Ok(Out::new(message, outcome))
}
