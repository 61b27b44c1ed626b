//! Phone-number normalization.

/// International prefix substituted for the local trunk prefix (Uganda).
pub const DEFAULT_COUNTRY_PREFIX: &str = "+256";

/// Local trunk prefix dialled before national numbers.
pub const TRUNK_PREFIX: char = '0';

/// Trim the input and rewrite a leading trunk `0` to [`DEFAULT_COUNTRY_PREFIX`].
///
/// Anything else is returned trimmed but otherwise untouched; this is a
/// heuristic, not full E.164 parsing.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(TRUNK_PREFIX) {
        Some(rest) => format!("{DEFAULT_COUNTRY_PREFIX}{rest}"),
        None => trimmed.to_owned(),
    }
}
