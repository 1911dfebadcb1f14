use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Longest channel name the platform accepts.
pub const MAX_CHANNEL_NAME_LEN: usize = 32;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\-_]").unwrap());

/// Normalize a requested channel name.
///
/// Lower-cases, turns whitespace runs into hyphens, drops anything outside
/// `[a-z0-9-_]` and truncates. The result may be empty.
pub fn normalize_channel_name(requested: &str) -> String {
    let lowered = requested.trim().to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let mut cleaned = DISALLOWED.replace_all(&hyphenated, "").into_owned();
    // Only ASCII survives, so byte truncation is safe.
    cleaned.truncate(MAX_CHANNEL_NAME_LEN);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(name: &str) -> bool {
        name.len() <= MAX_CHANNEL_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    }

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_channel_name("My Cool Trade!!"), "my-cool-trade");
        assert_eq!(normalize_channel_name("already-fine_1"), "already-fine_1");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_channel_name("a   b\tc"), "a-b-c");
        assert_eq!(normalize_channel_name("  padded  "), "padded");
    }

    #[test]
    fn test_normalize_strips_non_ascii() {
        assert_eq!(normalize_channel_name("Café Déal"), "caf-dal");
        assert_eq!(normalize_channel_name("💰💰"), "");
    }

    #[test]
    fn test_normalize_truncates() {
        let name = normalize_channel_name(&"x".repeat(100));
        assert_eq!(name.len(), MAX_CHANNEL_NAME_LEN);
    }

    #[test]
    fn test_normalized_names_are_always_valid() {
        for input in [
            "My Cool Trade!!",
            "UPPER lower 123",
            "<@12345> ping",
            "a/b\\c..d",
            "tab\tand\nnewline",
            &"long name ".repeat(10),
        ] {
            let name = normalize_channel_name(input);
            assert!(is_valid(&name), "{:?} -> {:?}", input, name);
        }
    }
}
