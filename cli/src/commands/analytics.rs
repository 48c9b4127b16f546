//! Analytics command implementation.

use qrforge_core::store::User;
use qrforge_core::Store;

const BAR_WIDTH: usize = 30;

/// Print generation counts by payload type and recent daily activity.
pub fn analytics(store: &Store, user: &User) -> anyhow::Result<()> {
    let types = store.type_counts(user.id)?;
    let days = store.daily_counts(user.id)?;

    if types.is_empty() {
        println!("No analytics data available yet");
        return Ok(());
    }

    println!("\n\x1b[1mMost generated QR code types\x1b[0m");
    let max = types.iter().map(|t| t.count).max().unwrap_or(1).max(1);
    for t in &types {
        let bar = (t.count as usize * BAR_WIDTH / max as usize).max(1);
        println!(
            "  {:<8} {:<width$} {}",
            t.kind,
            "█".repeat(bar),
            t.count,
            width = BAR_WIDTH
        );
    }

    println!("\n\x1b[1mGeneration activity (last 7 active days)\x1b[0m");
    // The store returns newest first; show chronological order.
    for day in days.iter().rev() {
        println!("  {}  {}", day.date, day.count);
    }
    println!();

    Ok(())
}
