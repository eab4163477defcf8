//! MS-DOS date/time fields used by ZIP headers.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Packed DOS time and date.
///
/// `date = (year - 1980) << 9 | month << 5 | day`,
/// `time = hour << 11 | minute << 5 | second / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const EPOCH: DosDateTime = DosDateTime {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// Packs a wall-clock time. Years outside 1980..=2107 are clamped.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        let year = dt.year();
        if year < 1980 {
            return Self::EPOCH;
        }
        if year > 2107 {
            return Self {
                time: (23 << 11) | (59 << 5) | 29,
                date: (127 << 9) | (12 << 5) | 31,
            };
        }
        let date = (((year - 1980) as u16) << 9) | ((dt.month() as u16) << 5) | dt.day() as u16;
        let time =
            ((dt.hour() as u16) << 11) | ((dt.minute() as u16) << 5) | (dt.second() as u16 / 2);
        Self { time, date }
    }

    /// Current local wall-clock time.
    pub fn now() -> Self {
        Self::from_naive(chrono::Local::now().naive_local())
    }

    /// Unpacks back to a calendar value (seconds rounded down to even).
    #[cfg(test)]
    pub(crate) fn to_naive(self) -> Option<NaiveDateTime> {
        let year = 1980 + i32::from(self.date >> 9);
        let month = u32::from((self.date >> 5) & 0x0f);
        let day = u32::from(self.date & 0x1f);
        let hour = u32::from(self.time >> 11);
        let minute = u32::from((self.time >> 5) & 0x3f);
        let second = u32::from(self.time & 0x1f) * 2;
        chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}
