use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Wire format for `fechaIngreso`: a plain calendar day.
const FORMATO_DIA: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Admission date of a record, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FechaIngreso(pub Date);

impl FechaIngreso {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn inner(&self) -> &Date {
        &self.0
    }

    pub fn into_inner(self) -> Date {
        self.0
    }
}

impl fmt::Display for FechaIngreso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(FORMATO_DIA).map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for FechaIngreso {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let date = Date::parse(s, FORMATO_DIA).map_err(|e| {
            CoreError::invalid_date(format!("La fecha '{s}' no tiene formato AAAA-MM-DD: {e}"))
        })?;
        Ok(FechaIngreso(date))
    }
}

impl Serialize for FechaIngreso {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self.0.format(FORMATO_DIA).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for FechaIngreso {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FechaIngreso::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Current UTC calendar day, used as the default admission date.
pub fn hoy_utc() -> FechaIngreso {
    FechaIngreso(time::OffsetDateTime::now_utc().date())
}

/// Parses a `YYYY-MM-DD` value coming from a form field or query parameter.
pub fn parse_fecha(s: &str) -> Result<FechaIngreso> {
    s.parse()
}
