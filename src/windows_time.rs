//! FILETIME (100ns ticks since 1601-01-01 UTC) to UNIX time conversion.

use chrono::{DateTime, TimeZone, Utc};

const WINDOWS_TICK: i64 = 10_000_000;
const SEC_TO_UNIX_EPOCH: i64 = 11_644_473_600;

/// A decoded Windows FILETIME, normalized to UNIX epoch seconds.
///
/// A zero `ticks` value is the NTFS "no timestamp" sentinel and renders as
/// an empty date, never a parse failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileTime {
    pub ticks: u64,
    pub unix_seconds: f64,
}

impl FileTime {
    /// Combine the on-disk little-endian halves of a FILETIME field.
    pub fn from_halves(low: u32, high: u32) -> Self {
        let ticks = ((high as u64) << 32) | low as u64;
        Self::from_ticks(ticks)
    }

    pub fn from_ticks(ticks: u64) -> Self {
        if ticks == 0 {
            return Self {
                ticks: 0,
                unix_seconds: 0.0,
            };
        }
        let unix_seconds = ticks as f64 / WINDOWS_TICK as f64 - SEC_TO_UNIX_EPOCH as f64;
        Self {
            ticks,
            unix_seconds,
        }
    }

    /// Recover the on-disk (low, high) halves for a non-sentinel value.
    pub fn to_halves(&self) -> (u32, u32) {
        (self.ticks as u32, (self.ticks >> 32) as u32)
    }

    pub fn is_zero(&self) -> bool {
        self.ticks == 0
    }

    /// UNIX seconds truncated toward zero, for bodyfile/CSV integer fields.
    pub fn unix_seconds_int(&self) -> i64 {
        self.unix_seconds.trunc() as i64
    }

    /// `YYYY-MM-DD HH:MM:SS.ffffff` in UTC, or empty for the zero sentinel.
    ///
    /// Out-of-range ticks (before 1601 is impossible given u64, but far
    /// future ticks can overflow `chrono`'s range) clamp to the nearest
    /// displayable bound rather than panicking.
    pub fn iso_string(&self) -> String {
        if self.is_zero() {
            return String::new();
        }
        match self.to_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            None => String::new(),
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if self.is_zero() {
            return None;
        }
        let whole_secs = self.unix_seconds.floor();
        let frac = self.unix_seconds - whole_secs;
        let nanos = (frac * 1_000_000_000.0).round() as u32;
        Utc.timestamp_opt(whole_secs as i64, nanos).single()
    }
}

impl Default for FileTime {
    fn default() -> Self {
        Self::from_ticks(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ticks_is_sentinel() {
        let ft = FileTime::from_halves(0, 0);
        assert_eq!(ft.unix_seconds, 0.0);
        assert_eq!(ft.iso_string(), "");
    }

    #[test]
    fn scenario_f_known_timestamp() {
        // 2020-01-01 00:00:00 UTC
        let ticks: u64 = 132223104000000000;
        let low = ticks as u32;
        let high = (ticks >> 32) as u32;
        let ft = FileTime::from_halves(low, high);
        assert_eq!(ft.unix_seconds, 1577836800.0);
        assert_eq!(ft.iso_string(), "2020-01-01 00:00:00.000000");
    }

    #[test]
    fn halves_round_trip() {
        let low = 0xDEAD_BEEFu32;
        let high = 0x0001_2345u32;
        let ft = FileTime::from_halves(low, high);
        assert_eq!(ft.to_halves(), (low, high));
    }
}
