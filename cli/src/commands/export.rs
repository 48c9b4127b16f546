//! Export command implementation.

use std::path::Path;

use qrforge_core::store::User;
use qrforge_core::Store;

/// Dump every database table to CSV files in `dir`.
pub fn export(store: &Store, user: &User, dir: &Path) -> anyhow::Result<()> {
    let files = store.export_csv(user, dir)?;

    println!("\x1b[1;32m✓\x1b[0m Exported to {}:", dir.display());
    for file in files {
        println!("  • {}", file);
    }

    Ok(())
}
