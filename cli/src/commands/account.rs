//! Account command implementation.

use qrforge_core::Store;

/// Create a new regular account.
pub fn register(store: &Store, username: &str, password: &str) -> anyhow::Result<()> {
    store.create_user(username, password)?;
    println!("\x1b[1;32m✓\x1b[0m Account '{}' created! You can now log in.", username);
    Ok(())
}
