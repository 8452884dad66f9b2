/// Parse a chain network id.
///
/// Network ids are decimal integers; they are kept as strings because the
/// ledger and the build artifacts key networks by their decimal text.
pub fn parse_network_id(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Network id cannot be empty".to_string());
    }

    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Network id must be a decimal number: '{}'", s));
    }

    Ok(trimmed.to_string())
}
