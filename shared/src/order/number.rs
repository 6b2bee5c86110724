//! Derived order values

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 4;

pub const MIN_ESTIMATED_MINUTES: i32 = 10;
pub const MAX_ESTIMATED_MINUTES: i32 = 45;

/// `ORD-<yymmddHHMMSS>-<4 chars [0-9A-Z]>`
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("ORD-{}-{}", now.format("%y%m%d%H%M%S"), suffix)
}

/// Kitchen estimate in minutes: 10 + 2 per order line, capped at 45
pub fn estimated_time_minutes(line_count: usize) -> i32 {
    let lines = i32::try_from(line_count).unwrap_or(i32::MAX);
    MIN_ESTIMATED_MINUTES
        .saturating_add(lines.saturating_mul(2))
        .clamp(MIN_ESTIMATED_MINUTES, MAX_ESTIMATED_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let number = generate_order_number(now);

        assert!(number.starts_with("ORD-240309140507-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_estimated_time_bounds() {
        assert_eq!(estimated_time_minutes(0), 10);
        assert_eq!(estimated_time_minutes(1), 12);
        assert_eq!(estimated_time_minutes(5), 20);
        assert_eq!(estimated_time_minutes(17), 44);
        assert_eq!(estimated_time_minutes(18), 45);
        assert_eq!(estimated_time_minutes(500), 45);
        assert_eq!(estimated_time_minutes(usize::MAX), 45);
    }
}
