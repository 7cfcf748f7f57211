//! Counterparty keys for revenue diversification.
//!
//! Bank narrations embed reference numbers and channel words around the
//! payer's name ("NIP TRF FROM ADEBAYO STORES REF 0091"), so income is grouped
//! by a fingerprint of the stable tokens rather than the raw description.

const MAX_TOKENS: usize = 3;

/// Key used when a description has no usable text at all
pub const UNKNOWN_COUNTERPARTY: &str = "UNKNOWN";

/// Stable grouping key for the counterparty named in `description`
pub fn counterparty_key(description: &str) -> String {
    if let Some(fingerprint) = description_fingerprint(description) {
        return fingerprint;
    }
    let collapsed = description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    if collapsed.is_empty() {
        UNKNOWN_COUNTERPARTY.to_string()
    } else {
        collapsed
    }
}

/// Up to three uppercase tokens with noise words and reference numbers removed.
/// `None` when nothing survives.
pub fn description_fingerprint(description: &str) -> Option<String> {
    let normalized = normalize_text(description);
    let tokens: Vec<&str> = normalized
        .split_whitespace()
        .filter(|token| !is_noise_token(token) && !has_digit(token))
        .take(MAX_TOKENS)
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

fn normalize_text(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous_space = false;
    for character in value.trim().chars() {
        if character.is_alphanumeric() {
            output.extend(character.to_uppercase());
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }
    output.trim().to_string()
}

fn has_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

fn is_noise_token(token: &str) -> bool {
    matches!(
        token,
        "TRANSFER"
            | "TRF"
            | "FROM"
            | "TO"
            | "NIP"
            | "REF"
            | "INWARD"
            | "OUTWARD"
            | "CREDIT"
            | "DEBIT"
            | "ALERT"
            | "FT"
            | "MOB"
            | "WEB"
            | "USSD"
            | "VIA"
            | "BY"
            | "FOR"
            | "PAYMENT"
            | "POS"
            | "ONLINE"
            | "THE"
            | "AND"
            | "OF"
    )
}
