//! Weekly program schedule and the on-air resolver.
//!
//! The schedule document has three buckets (`semana`, `viernes`, `sabado`),
//! each a list of `{ "titulo", "hora" }` entries sorted by start time. The
//! program on air is the last entry that has already started; the one after
//! it (wrapping to the first) is announced as next.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::error::{Error, Result};

/// A start time in `HH:MM` 24-hour form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ShowTime(NaiveTime);

impl ShowTime {
    /// Build from hour and minute.
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Truncate a time of day to its minute.
    #[must_use]
    pub fn of<T: Timelike>(time: &T) -> Self {
        // hour() < 24 and minute() < 60 always hold
        Self::from_hm(time.hour(), time.minute()).unwrap_or_default()
    }
}

impl FromStr for ShowTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| Error::InvalidTime {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ShowTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShowTime> for String {
    fn from(time: ShowTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ShowTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// One scheduled program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    /// Program title.
    pub titulo: String,
    /// Start time.
    pub hora: ShowTime,
}

impl ProgramEntry {
    /// Label used for the "next" slot: `Title (HH:MM)`.
    #[must_use]
    pub fn next_label(&self) -> String {
        format!("{} ({})", self.titulo, self.hora)
    }
}

/// Which weekly grouping applies on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Sunday through Thursday.
    Semana,
    /// Friday.
    Viernes,
    /// Saturday.
    Sabado,
}

impl Bucket {
    /// Pick the bucket for a day of the week.
    #[must_use]
    pub fn for_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Fri => Self::Viernes,
            Weekday::Sat => Self::Sabado,
            _ => Self::Semana,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semana => write!(f, "semana"),
            Self::Viernes => write!(f, "viernes"),
            Self::Sabado => write!(f, "sabado"),
        }
    }
}

/// The full weekly schedule. Missing buckets are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Sunday through Thursday.
    pub semana: Vec<ProgramEntry>,
    /// Friday.
    pub viernes: Vec<ProgramEntry>,
    /// Saturday.
    pub sabado: Vec<ProgramEntry>,
}

impl Schedule {
    /// Entries of one bucket.
    #[must_use]
    pub fn bucket(&self, bucket: Bucket) -> &[ProgramEntry] {
        match bucket {
            Bucket::Semana => &self.semana,
            Bucket::Viernes => &self.viernes,
            Bucket::Sabado => &self.sabado,
        }
    }

    /// What is on air at `now`, with the configured placeholders when no
    /// slot of today's bucket has started yet.
    #[must_use]
    pub fn on_air(&self, now: &DateTime<FixedOffset>, config: &ScheduleConfig) -> OnAir {
        self.on_air_at(now.weekday(), ShowTime::of(now), config)
    }

    /// What is on air on `day` at `at`.
    #[must_use]
    pub fn on_air_at(&self, day: Weekday, at: ShowTime, config: &ScheduleConfig) -> OnAir {
        resolve(self.bucket(Bucket::for_weekday(day)), at)
            .unwrap_or_else(|| OnAir::placeholder(config))
    }
}

/// Current and next program labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnAir {
    /// Title of the program on air.
    pub current: String,
    /// `Title (HH:MM)` of the following program.
    pub next: String,
}

impl OnAir {
    /// The labels shown when nothing in the schedule applies.
    #[must_use]
    pub fn placeholder(config: &ScheduleConfig) -> Self {
        Self {
            current: config.placeholder_current.clone(),
            next: config.placeholder_next.clone(),
        }
    }
}

/// Find the program on air at `now` within one bucket.
///
/// Entry `i` is on air when it has started and either it is the last entry
/// or entry `i + 1` has not started. Before the first slot of the day nothing
/// matches and `None` is returned; the previous day's last program is not
/// carried over.
#[must_use]
pub fn resolve(entries: &[ProgramEntry], now: ShowTime) -> Option<OnAir> {
    let last = entries.len().checked_sub(1)?;
    entries.iter().enumerate().find_map(|(i, entry)| {
        let next = entries.get(i + 1).unwrap_or(&entries[0]);
        let started = now >= entry.hora;
        (started && (i == last || now < next.hora)).then(|| OnAir {
            current: entry.titulo.clone(),
            next: next.next_label(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(titulo: &str, hora: &str) -> ProgramEntry {
        ProgramEntry {
            titulo: titulo.to_string(),
            hora: hora.parse().unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> ShowTime {
        ShowTime::from_hm(h, m).unwrap()
    }

    fn managua(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_show_time_parse_and_display() {
        let t: ShowTime = "08:00".parse().unwrap();
        assert_eq!(t.to_string(), "08:00");
        assert_eq!("7:05".parse::<ShowTime>().unwrap().to_string(), "07:05");
        assert!(matches!(
            "25:00".parse::<ShowTime>(),
            Err(Error::InvalidTime { .. })
        ));
        assert!("mediodía".parse::<ShowTime>().is_err());
    }

    #[test]
    fn test_show_time_truncates_seconds() {
        let t = chrono::NaiveTime::from_hms_opt(12, 0, 59).unwrap();
        assert_eq!(ShowTime::of(&t), at(12, 0));
    }

    #[test]
    fn test_bucket_for_weekday() {
        assert_eq!(Bucket::for_weekday(Weekday::Fri), Bucket::Viernes);
        assert_eq!(Bucket::for_weekday(Weekday::Sat), Bucket::Sabado);
        for day in [Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            assert_eq!(Bucket::for_weekday(day), Bucket::Semana);
        }
    }

    #[test]
    fn test_resolve_tuesday_afternoon() {
        let semana = vec![entry("A", "08:00"), entry("B", "12:00")];
        let on_air = resolve(&semana, at(13, 0)).unwrap();
        assert_eq!(on_air.current, "B");
        assert_eq!(on_air.next, "A (08:00)");
    }

    #[test]
    fn test_resolve_between_slots() {
        let bucket = vec![
            entry("Devocional", "06:00"),
            entry("Noticias", "12:00"),
            entry("Culto", "19:00"),
        ];
        let on_air = resolve(&bucket, at(12, 30)).unwrap();
        assert_eq!(on_air.current, "Noticias");
        assert_eq!(on_air.next, "Culto (19:00)");
    }

    #[test]
    fn test_resolve_exact_start_time() {
        let bucket = vec![entry("A", "08:00"), entry("B", "12:00")];
        assert_eq!(resolve(&bucket, at(12, 0)).unwrap().current, "B");
        assert_eq!(resolve(&bucket, at(11, 59)).unwrap().current, "A");
    }

    #[test]
    fn test_resolve_before_first_slot_is_none() {
        let bucket = vec![entry("A", "08:00"), entry("B", "12:00")];
        assert!(resolve(&bucket, at(7, 59)).is_none());
    }

    #[test]
    fn test_resolve_empty_bucket() {
        assert!(resolve(&[], at(10, 0)).is_none());
    }

    #[test]
    fn test_resolve_single_entry_wraps_to_itself() {
        let bucket = vec![entry("Solo", "05:00")];
        let on_air = resolve(&bucket, at(23, 0)).unwrap();
        assert_eq!(on_air.current, "Solo");
        assert_eq!(on_air.next, "Solo (05:00)");
    }

    #[test]
    fn test_resolve_is_greatest_started_entry() {
        let bucket: Vec<ProgramEntry> = (0..24)
            .step_by(3)
            .map(|h| entry(&format!("P{h}"), &format!("{h:02}:00")))
            .collect();
        for hour in 0..24 {
            for minute in [0, 1, 59] {
                let now = at(hour, minute);
                let expected = bucket.iter().rev().find(|e| e.hora <= now).unwrap();
                assert_eq!(resolve(&bucket, now).unwrap().current, expected.titulo);
            }
        }
    }

    #[test]
    fn test_schedule_deserialize() {
        let json = r#"{
            "semana": [{"titulo": "A", "hora": "08:00"}, {"titulo": "B", "hora": "12:00"}],
            "viernes": [{"titulo": "Vigilia", "hora": "20:00"}]
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.semana.len(), 2);
        assert_eq!(schedule.bucket(Bucket::Viernes)[0].titulo, "Vigilia");
        assert!(schedule.sabado.is_empty());
    }

    #[test]
    fn test_schedule_rejects_bad_time() {
        let json = r#"{"semana": [{"titulo": "A", "hora": "8am"}]}"#;
        assert!(serde_json::from_str::<Schedule>(json).is_err());
    }

    #[test]
    fn test_on_air_uses_weekday_bucket() {
        let schedule = Schedule {
            semana: vec![entry("A", "08:00"), entry("B", "12:00")],
            viernes: vec![entry("Viernes", "00:00")],
            sabado: vec![entry("Sabado", "00:00")],
        };
        let config = ScheduleConfig::default();

        // 2024-03-05 was a Tuesday.
        let tuesday = schedule.on_air(&managua(2024, 3, 5, 13, 0), &config);
        assert_eq!(tuesday.current, "B");
        assert_eq!(tuesday.next, "A (08:00)");

        let friday = schedule.on_air(&managua(2024, 3, 8, 13, 0), &config);
        assert_eq!(friday.current, "Viernes");

        let saturday = schedule.on_air(&managua(2024, 3, 9, 13, 0), &config);
        assert_eq!(saturday.current, "Sabado");
    }

    #[test]
    fn test_on_air_placeholder_before_first_slot() {
        let schedule = Schedule {
            semana: vec![entry("A", "08:00")],
            ..Schedule::default()
        };
        let on_air = schedule.on_air(&managua(2024, 3, 5, 6, 0), &ScheduleConfig::default());
        assert_eq!(on_air.current, "TV45 Nicaragua");
        assert_eq!(on_air.next, "Programación Regular");
    }

    #[test]
    fn test_on_air_at_explicit_day() {
        let schedule = Schedule {
            semana: vec![entry("A", "08:00")],
            viernes: vec![entry("Vigilia", "20:00")],
            ..Schedule::default()
        };
        let config = ScheduleConfig::default();
        assert_eq!(
            schedule.on_air_at(Weekday::Fri, at(21, 0), &config).current,
            "Vigilia"
        );
        assert_eq!(
            schedule.on_air_at(Weekday::Sat, at(21, 0), &config),
            OnAir::placeholder(&config)
        );
    }
}
