//! Byte-size units as they appear in MySQL option files.
//!
//! Values such as `8M` or `1G` are 1024-based. A bare integer, or one with
//! an unrecognised unit letter, is a raw byte count. Fractions (`1.5G`) and
//! other text (`12abc`) are not byte sizes.

/// Unit suffixes from largest to smallest, with their multiplier.
const UNITS: [(char, u64); 4] = [
    ('T', 1024 * 1024 * 1024 * 1024),
    ('G', 1024 * 1024 * 1024),
    ('M', 1024 * 1024),
    ('K', 1024),
];

/// Parses an on-disk byte size (`"8M"`, `"512k"`, `"4096"`, `"16B"`, `"64MB"`)
/// into bytes.
///
/// The value is an integer with at most one trailing unit letter, optionally
/// followed by `B`. A letter that is not a unit counts as bytes. Returns
/// `None` when the part before the unit is not an integer.
///
/// ```
/// use mycnf::units::convert_to_bytes;
/// assert_eq!(convert_to_bytes("8M"), Some(8 * 1024 * 1024));
/// assert_eq!(convert_to_bytes("1g"), Some(1024 * 1024 * 1024));
/// assert_eq!(convert_to_bytes("131072"), Some(131072));
/// assert_eq!(convert_to_bytes("1.5G"), None);
/// assert_eq!(convert_to_bytes("lots"), None);
/// ```
pub fn convert_to_bytes(value: &str) -> Option<u64> {
    let trimmed = value.trim().trim_matches('"').trim();
    let (mut number, mut unit) = split_unit(trimmed);
    if unit == Some('B') {
        if let (body, Some(letter)) = split_unit(number) {
            if multiplier_of(letter).is_some() {
                number = body;
                unit = Some(letter);
            }
        }
    }

    let number: u64 = number.trim().parse().ok()?;
    let multiplier = unit.and_then(multiplier_of).unwrap_or(1);
    number.checked_mul(multiplier)
}

/// Splits off a trailing ASCII letter, upper-cased.
fn split_unit(text: &str) -> (&str, Option<char>) {
    match text.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            (&text[..text.len() - 1], Some(c.to_ascii_uppercase()))
        }
        _ => (text, None),
    }
}

fn multiplier_of(unit: char) -> Option<u64> {
    UNITS
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, multiplier)| *multiplier)
}

/// Formats a byte count with the largest unit that represents it exactly.
///
/// ```
/// use mycnf::units::convert_to_ini;
/// assert_eq!(convert_to_ini(8388608), "8M");
/// assert_eq!(convert_to_ini(1073741824), "1G");
/// assert_eq!(convert_to_ini(1536), "1536B");
/// ```
pub fn convert_to_ini(bytes: u64) -> String {
    if bytes > 0 {
        for (unit, multiplier) in UNITS {
            if bytes >= multiplier && bytes % multiplier == 0 {
                return format!("{}{}", bytes / multiplier, unit);
            }
        }
    }
    format!("{}B", bytes)
}

/// Formats a byte count for display, two decimals in the largest fitting unit.
pub fn human_readable(bytes: u64) -> String {
    let value = bytes as f64;
    const LABELS: [&str; 4] = ["TB", "GB", "MB", "KB"];
    for ((_, multiplier), label) in UNITS.iter().zip(LABELS) {
        if bytes >= *multiplier {
            return format!("{:.2} {}", value / *multiplier as f64, label);
        }
    }
    format!("{} B", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_boundaries_survive_formatting() {
        for bytes in [
            1024,
            8 * 1024 * 1024,
            128 * 1024 * 1024,
            1024 * 1024 * 1024,
            2 * 1024 * 1024 * 1024 * 1024,
        ] {
            assert_eq!(convert_to_bytes(&convert_to_ini(bytes)), Some(bytes));
        }
    }

    #[test]
    fn test_non_multiple_keeps_exact_value() {
        // 2047M is not a whole number of gigabytes
        assert_eq!(convert_to_ini(2146435072), "2047M");
        assert_eq!(convert_to_bytes("2047M"), Some(2146435072));
    }

    #[test]
    fn test_suffix_is_case_insensitive() {
        assert_eq!(convert_to_bytes("64k"), convert_to_bytes("64K"));
        assert_eq!(convert_to_bytes("2t"), Some(2 * 1024_u64.pow(4)));
    }

    #[test]
    fn test_byte_suffix_is_optional() {
        assert_eq!(convert_to_bytes("100B"), Some(100));
        assert_eq!(convert_to_bytes("100X"), Some(100));
        assert_eq!(convert_to_bytes(" 100 "), Some(100));
        assert_eq!(convert_to_bytes("64MB"), Some(64 * 1024 * 1024));
        assert_eq!(convert_to_bytes("8 kb"), Some(8 * 1024));
    }

    #[test]
    fn test_malformed_sizes_are_rejected() {
        for value in ["1.5G", "12abc", ".5G", "XYZ", "8MM", "G", "-1M", "", "1 2M"] {
            assert_eq!(convert_to_bytes(value), None, "{value}");
        }
    }

    #[test]
    fn test_small_and_zero_values() {
        assert_eq!(convert_to_ini(0), "0B");
        assert_eq!(convert_to_ini(256), "256B");
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(convert_to_bytes("99999999999T"), None);
    }

    #[test]
    fn test_human_readable() {
        assert_eq!(human_readable(1073741824), "1.00 GB");
        assert_eq!(human_readable(131072), "128.00 KB");
        assert_eq!(human_readable(1536), "1.50 KB");
        assert_eq!(human_readable(512), "512 B");
    }
}
