//! Favorites command implementation.

use clap::Subcommand;
use qrforge_core::store::User;
use qrforge_core::{style, Store, StyleOptions};

use super::generate::StyleFlags;

#[derive(Subcommand)]
pub enum FavoritesAction {
    /// Save a style preset under a name
    Save {
        name: String,

        /// Start from a built-in template
        #[arg(long)]
        template: Option<String>,

        #[command(flatten)]
        style: StyleFlags,
    },
    /// List saved presets
    List,
    /// Delete a preset
    Delete { name: String },
}

pub fn favorites(store: &Store, user: &User, action: FavoritesAction) -> anyhow::Result<()> {
    match action {
        FavoritesAction::Save {
            name,
            template,
            style: flags,
        } => {
            let base = match &template {
                Some(t) => style::template(t)?,
                None => StyleOptions::default(),
            };
            let resolved = flags.apply(base)?;
            store.save_favorite(user.id, &name, &resolved)?;
            println!("\x1b[1;32m✓\x1b[0m Saved '{}' to your favorites", name);
        }
        FavoritesAction::List => {
            let favorites = store.favorites(user.id)?;
            if favorites.is_empty() {
                println!("No favorites saved");
                return Ok(());
            }
            for favorite in favorites {
                let s = &favorite.style;
                println!(
                    "\x1b[1m{:<16}\x1b[0m fg {} on bg {}, module {} px, border {}, ECC {}",
                    favorite.name,
                    s.fg,
                    s.bg,
                    s.module_size,
                    s.border,
                    s.ecc.label(),
                );
            }
        }
        FavoritesAction::Delete { name } => {
            if store.delete_favorite(user.id, &name)? {
                println!("\x1b[1;32m✓\x1b[0m Deleted favorite '{}'", name);
            } else {
                println!("No favorite named '{}'", name);
            }
        }
    }
    Ok(())
}
