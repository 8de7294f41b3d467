use crate::errors::{AppError, AppResult};
use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Days on which a schedule is meant to run.
/// Stored as "mon,tue,..." in the database and in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySet(u8);

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::all()
    }
}

impl WeekdaySet {
    pub fn all() -> Self {
        Self(0b111_1111)
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ORDER.into_iter().filter(|d| self.contains(*d))
    }

    pub fn code(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }

    /// Parse "mon,tue,fri" (case-insensitive). Empty input means every day.
    pub fn parse(s: &str) -> AppResult<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let mut set = Self::none();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = part
                .parse::<Weekday>()
                .map_err(|_| AppError::InvalidInput(format!("unknown weekday '{part}'")))?;
            set.insert(day);
        }
        Ok(set)
    }

    pub fn to_db_str(&self) -> String {
        self.iter().map(Self::code).collect::<Vec<_>>().join(",")
    }

    pub fn describe(&self) -> String {
        match self.len() {
            7 => "every day".to_string(),
            0 => "never".to_string(),
            _ => self.to_db_str(),
        }
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_db_str())
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        // Stored "" means an explicitly emptied mask, not "all".
        if raw.is_empty() {
            return Ok(Self::none());
        }
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
