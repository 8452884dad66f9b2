//! Formatting for durations and deployment summaries.

use owo_colors::OwoColorize;
use solhmr::BuiltContract;
use std::time::Duration;

/// Format a duration in the most readable unit.
///
/// ```
/// use std::time::Duration;
/// use solhmr_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the deployed contracts and their local addresses to stderr.
pub fn print_contract_summary(contracts: &[BuiltContract], network_id: &str) {
    if contracts.is_empty() {
        eprintln!("  {}", "no contracts deployed".dimmed());
        return;
    }

    let width = contracts
        .iter()
        .map(|c| c.contract_name.len())
        .max()
        .unwrap_or(0);

    for contract in contracts {
        let address = contract.address_on(network_id).unwrap_or("-");
        eprintln!(
            "  {:<width$}  {}",
            contract.contract_name.bold(),
            address.cyan(),
            width = width
        );
    }
}
