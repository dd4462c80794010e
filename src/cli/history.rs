use clap::Subcommand;
use std::io::{BufRead, Write};

use crate::cli::{confirm, render};
use crate::error::Result;
use crate::AppState;

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// List past attempts with summary statistics (the default).
    List,
    /// Remove every saved attempt. This cannot be undone.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run<R: BufRead, W: Write>(
    state: &AppState,
    action: Option<HistoryAction>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match action.unwrap_or(HistoryAction::List) {
        HistoryAction::List => list(state, out).await,
        HistoryAction::Clear { yes } => {
            if !yes
                && !confirm(
                    input,
                    out,
                    "This will permanently delete all of your quiz history. Continue? [y/N] ",
                )?
            {
                writeln!(out, "History kept.")?;
                return Ok(());
            }
            state.history_service.clear().await?;
            writeln!(out, "History Cleared: All quiz history has been removed.")?;
            Ok(())
        }
    }
}

async fn list<W: Write>(state: &AppState, out: &mut W) -> Result<()> {
    let entries = state.history_service.read_all().await?;
    if entries.is_empty() {
        writeln!(out, "No quiz history yet. Take a quiz to see your results here.")?;
        return Ok(());
    }

    render::stats(out, &state.history_service.stats().await?)?;
    writeln!(out)?;
    for entry in &entries {
        render::history_entry(out, entry)?;
    }
    Ok(())
}
