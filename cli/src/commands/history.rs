//! History command implementation.

use clap::Subcommand;
use qrforge_core::store::User;
use qrforge_core::Store;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List past generations, newest first
    List,
    /// Show one entry in full
    Show { id: i64 },
    /// Delete an entry
    Delete { id: i64 },
}

pub fn history(store: &Store, user: &User, action: HistoryAction) -> anyhow::Result<()> {
    match action {
        HistoryAction::List => {
            let entries = store.history(user.id)?;
            if entries.is_empty() {
                println!("No history found");
                return Ok(());
            }
            for entry in entries {
                println!(
                    "\x1b[2m{:>4}\x1b[0m  {}  \x1b[1m{:<7}\x1b[0m  {}",
                    entry.id,
                    entry.created_at,
                    entry.kind.as_str().to_uppercase(),
                    format_preview(&entry.content),
                );
            }
        }
        HistoryAction::Show { id } => {
            let entry = store.history_entry(user.id, id)?;
            println!("\x1b[1mType:\x1b[0m    {}", entry.kind);
            println!("\x1b[1mCreated:\x1b[0m {}", entry.created_at);
            println!("\x1b[1mContent:\x1b[0m");
            println!("{}", entry.content);
        }
        HistoryAction::Delete { id } => {
            if store.delete_history(user.id, id)? {
                println!("\x1b[1;32m✓\x1b[0m Deleted history entry {}", id);
            } else {
                println!("No history entry with id {}", id);
            }
        }
    }
    Ok(())
}

/// Format stored content for a one-line preview.
fn format_preview(content: &str) -> String {
    const MAX_PREVIEW_LEN: usize = 40;

    let line = content.lines().next().unwrap_or("");
    if line.chars().count() > MAX_PREVIEW_LEN {
        format!("{}...", line.chars().take(MAX_PREVIEW_LEN).collect::<String>())
    } else if content.lines().count() > 1 {
        format!("{}...", line)
    } else {
        line.to_string()
    }
}
