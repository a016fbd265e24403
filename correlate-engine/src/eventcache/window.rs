//! Window sizing descriptor parsed from route configuration strings.

use crate::eventcache::CacheError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MAX_LEN: usize = 1_000;
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

/// Shape of one route's message window.
///
/// A window is bounded by entry count, by entry age, or by both. The textual
/// form accepted by [`FromStr`] is the one routes are configured with:
///
/// - `"1000"` — at most 1000 entries
/// - `"30s"` — entries no older than 30 seconds (`ms`, `s`, `m`, `h`)
/// - `"30s,1000"` — both bounds
/// - `""` — the defaults (30 seconds, 1000 entries)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    max_len: Option<usize>,
    max_age: Option<Duration>,
}

impl WindowSpec {
    /// Window bounded by entry count only.
    pub fn count(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            max_age: None,
        }
    }

    /// Window bounded by entry age only.
    pub fn age(max_age: Duration) -> Self {
        Self {
            max_len: None,
            max_age: Some(max_age),
        }
    }

    /// Window bounded by both entry age and entry count.
    pub fn bounded(max_age: Duration, max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            max_age: Some(max_age),
        }
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_AGE, DEFAULT_MAX_LEN)
    }
}

impl Display for WindowSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.max_age, self.max_len) {
            (Some(age), Some(len)) => write!(f, "{}ms,{len}", age.as_millis()),
            (Some(age), None) => write!(f, "{}ms", age.as_millis()),
            (None, Some(len)) => write!(f, "{len}"),
            (None, None) => Ok(()),
        }
    }
}

impl FromStr for WindowSpec {
    type Err = CacheError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut max_len = None;
        let mut max_age = None;
        for segment in raw.split(',') {
            let segment = segment.trim();
            if segment.chars().all(|c| c.is_ascii_digit()) {
                if max_len.is_some() {
                    return Err(CacheError::Window(format!(
                        "more than one count bound in {raw:?}"
                    )));
                }
                max_len = Some(parse_count(segment, raw)?);
            } else {
                if max_age.is_some() {
                    return Err(CacheError::Window(format!(
                        "more than one age bound in {raw:?}"
                    )));
                }
                max_age = Some(parse_age(segment, raw)?);
            }
        }

        Ok(Self { max_len, max_age })
    }
}

fn parse_count(segment: &str, raw: &str) -> Result<usize, CacheError> {
    let count: usize = segment
        .parse()
        .map_err(|_| CacheError::Window(format!("unreadable count bound {segment:?} in {raw:?}")))?;
    if count == 0 {
        return Err(CacheError::Window(format!("zero count bound in {raw:?}")));
    }
    Ok(count)
}

fn parse_age(segment: &str, raw: &str) -> Result<Duration, CacheError> {
    // "ms" must be peeled off before the single-letter suffixes.
    let (digits, unit): (&str, fn(u64) -> Duration) = if let Some(d) = segment.strip_suffix("ms") {
        (d, Duration::from_millis)
    } else if let Some(d) = segment.strip_suffix('s') {
        (d, Duration::from_secs)
    } else if let Some(d) = segment.strip_suffix('m') {
        (d, |minutes| Duration::from_secs(minutes * 60))
    } else if let Some(d) = segment.strip_suffix('h') {
        (d, |hours| Duration::from_secs(hours * 3_600))
    } else {
        return Err(CacheError::Window(format!(
            "age bound {segment:?} in {raw:?} has no ms/s/m/h suffix"
        )));
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| CacheError::Window(format!("unreadable age bound {segment:?} in {raw:?}")))?;
    if value == 0 {
        return Err(CacheError::Window(format!("zero age bound in {raw:?}")));
    }
    Ok(unit(value))
}
