//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// How long a handoff record stays actionable (30 seconds)
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 30_000;

/// How long an unconsumed handoff record may stay on disk (5 minutes)
pub const DEFAULT_RETENTION_WINDOW_MS: u64 = 300_000;

/// How long a non-persistent invocation waits for a click (2 seconds)
pub const DEFAULT_INTERACTION_TIMEOUT_MS: u64 = 2_000;

/// Delay between a dispatched click action and process exit (500 milliseconds)
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 500;

/// Wall-clock limit for click commands (30 seconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 30_000;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    pub const fn default_freshness_window() -> Self {
        Self::from_millis(DEFAULT_FRESHNESS_WINDOW_MS)
    }

    pub const fn default_retention_window() -> Self {
        Self::from_millis(DEFAULT_RETENTION_WINDOW_MS)
    }

    pub const fn default_interaction_timeout() -> Self {
        Self::from_millis(DEFAULT_INTERACTION_TIMEOUT_MS)
    }

    pub const fn default_grace_period() -> Self {
        Self::from_millis(DEFAULT_GRACE_PERIOD_MS)
    }

    pub const fn default_command_timeout() -> Self {
        Self::from_millis(DEFAULT_COMMAND_TIMEOUT_MS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string into a Duration value object.
    /// Supported formats: "500ms", "30s", "1m", "2m30s", "90s"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut total_ms: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch.is_ascii_digit() {
                current_num.push(ch);
                continue;
            }
            if current_num.is_empty() {
                return Err(invalid());
            }
            let value: u64 = current_num.parse().map_err(|_| invalid())?;
            let unit_ms = match ch {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    1
                }
                'm' => 60_000,
                's' => 1_000,
                _ => return Err(invalid()),
            };
            total_ms = value
                .checked_mul(unit_ms)
                .and_then(|ms| total_ms.checked_add(ms))
                .ok_or_else(invalid)?;
            current_num.clear();
            found_any = true;
        }

        // Leftover digits without a unit
        if !current_num.is_empty() || !found_any {
            return Err(invalid());
        }

        if total_ms == 0 {
            return Err(invalid());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_only() {
        let d: Duration = "5m".parse().unwrap();
        assert_eq!(d.as_secs(), 300);
    }

    #[test]
    fn parse_milliseconds() {
        let d: Duration = "500ms".parse().unwrap();
        assert_eq!(d.as_millis(), 500);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "2m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 150);
    }

    #[test]
    fn parse_mixed_with_milliseconds() {
        let d: Duration = "1s250ms".parse().unwrap();
        assert_eq!(d.as_millis(), 1250);
    }

    #[test]
    fn parse_case_insensitive() {
        let d: Duration = "1M30S".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_with_whitespace() {
        let d: Duration = "  2s  ".parse().unwrap();
        assert_eq!(d.as_secs(), 2);
    }

    #[test]
    fn parse_invalid_empty() {
        assert!("".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_zero() {
        assert!("0s".parse::<Duration>().is_err());
        assert!("0ms".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_format() {
        assert!("30".parse::<Duration>().is_err());
        assert!("abc".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
        assert!("s30".parse::<Duration>().is_err());
    }

    #[test]
    fn display_round_values() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(300).to_string(), "5m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
    }

    #[test]
    fn display_sub_second_values() {
        assert_eq!(Duration::from_millis(500).to_string(), "500ms");
        assert_eq!(Duration::from_millis(1500).to_string(), "1500ms");
    }

    #[test]
    fn default_windows() {
        assert_eq!(Duration::default_freshness_window().as_secs(), 30);
        assert_eq!(Duration::default_retention_window().as_secs(), 300);
        assert_eq!(Duration::default_interaction_timeout().as_secs(), 2);
        assert_eq!(Duration::default_grace_period().as_millis(), 500);
        assert_eq!(Duration::default_command_timeout().as_std(), StdDuration::from_secs(30));
    }
}
