use std::time::Duration;

use crate::error::{BotError, Result};

/// `"1 alt"`, `"3 alts"`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Render whole seconds in humantime form (`"1h 2m 3s"`, `"2days 4h"`).
/// Sub-second precision is dropped; anything under a second renders as `"0s"`.
pub fn format_duration(d: Duration) -> String {
    humantime::format_duration(Duration::from_secs(d.as_secs())).to_string()
}

/// Parse `"90s"`, `"15min"`, `"1h30m"`, `"2days 4h"`. Every number needs a
/// unit; surrounding whitespace is ignored.
pub fn parse_duration(input: &str) -> Result<Duration> {
    humantime::parse_duration(input.trim())
        .map_err(|_| BotError::InvalidDuration(input.to_string()))
}

/// Cut `text` to at most `max_chars` characters, ending with `…` when
/// anything was removed.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralize_singular_and_plural() {
        assert_eq!(pluralize(0, "alt"), "0 alts");
        assert_eq!(pluralize(1, "alt"), "1 alt");
        assert_eq!(pluralize(12, "command"), "12 commands");
    }

    #[test]
    fn format_duration_skips_zero_parts() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(999)), "0s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(format_duration(Duration::from_secs(86_460)), "1day 1m");
        assert_eq!(format_duration(Duration::from_secs(2 * 86_400)), "2days");
    }

    #[test]
    fn parse_duration_accepts_compound_forms() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(2 * 86_400));
        assert_eq!(parse_duration(" 1h 5s ").unwrap(), Duration::from_secs(3605));
    }

    #[test]
    fn parse_duration_accepts_spelled_out_units() {
        assert_eq!(parse_duration("1h 30min").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("2days").unwrap(), Duration::from_secs(2 * 86_400));
        assert_eq!(parse_duration("90sec").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1hour").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn parse_duration_rejects_malformed_input() {
        for bad in ["", "   ", "15", "m", "1h30", "5x", "1.5h", "-3s", "99999999999999999999d"] {
            assert!(
                matches!(parse_duration(bad), Err(BotError::InvalidDuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_then_format_is_stable() {
        let d = parse_duration("1h2m3s").unwrap();
        assert_eq!(format_duration(d), "1h 2m 3s");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("héllo wörld", 3), "hé…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn mention_wraps_user_id() {
        assert_eq!(mention("42"), "<@42>");
    }
}
