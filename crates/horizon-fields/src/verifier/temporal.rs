//! Calendar and clock field verifiers.
//!
//! A [`TemporalFieldVerifier`] governs one field of a date or time, such as
//! the month of a `NaiveDate`, and is bound to a date-time pattern token like
//! `"MM"` or `"yyyy"`. Its range can follow the live value: the last valid
//! day depends on the month and year currently held by the field.

use std::marker::PhantomData;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::{Adjustment, Capability, GroupValue, GroupVerifier, parse_decimal, step_in_range};
use crate::error::VerifyError;
use crate::grammar::LengthHint;

/// A calendar or clock field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalField {
    /// Four-digit year.
    Year,
    /// Last two digits of the year.
    YearOfCentury,
    /// Month of year, 1-12.
    Month,
    /// Day of month, 1-31.
    Day,
    /// Hour of day, 0-23.
    Hour,
    /// Minute of hour, 0-59.
    Minute,
    /// Second of minute, 0-59.
    Second,
}

impl TemporalField {
    /// The field a date-time pattern token refers to.
    ///
    /// Accepts `yyyy`, `yy`, `M`, `MM`, `d`, `dd`, `H`, `HH`, `m`, `mm`, `s`
    /// and `ss`.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "yyyy" => TemporalField::Year,
            "yy" => TemporalField::YearOfCentury,
            "M" | "MM" => TemporalField::Month,
            "d" | "dd" => TemporalField::Day,
            "H" | "HH" => TemporalField::Hour,
            "m" | "mm" => TemporalField::Minute,
            "s" | "ss" => TemporalField::Second,
            _ => return None,
        })
    }

    /// The canonical token for this field.
    pub fn default_token(self) -> &'static str {
        match self {
            TemporalField::Year => "yyyy",
            TemporalField::YearOfCentury => "yy",
            TemporalField::Month => "MM",
            TemporalField::Day => "dd",
            TemporalField::Hour => "HH",
            TemporalField::Minute => "mm",
            TemporalField::Second => "ss",
        }
    }

    fn digits(self) -> usize {
        match self {
            TemporalField::Year => 4,
            _ => 2,
        }
    }

    /// Bounds of the field, taking the month and year of `value` into account
    /// for the day of month.
    pub fn range_in<V: TemporalValue>(self, value: Option<&V>) -> (i64, i64) {
        match self {
            TemporalField::Year => (1, 9999),
            TemporalField::YearOfCentury => (0, 99),
            TemporalField::Month => (1, 12),
            TemporalField::Day => {
                let max = value.and_then(TemporalValue::days_in_month).unwrap_or(31);
                (1, max)
            }
            TemporalField::Hour => (0, 23),
            TemporalField::Minute | TemporalField::Second => (0, 59),
        }
    }
}

/// Values whose calendar or clock fields can be read and replaced.
pub trait TemporalValue: Clone + Send + Sync + 'static {
    /// Current value of `field`, or `None` if this type has no such field.
    fn get_field(&self, field: TemporalField) -> Option<i64>;

    /// A copy with `field` set to `value`.
    ///
    /// Changing the year or month clamps the day to the new month's length.
    /// Returns `None` if the field does not exist or the value is invalid.
    fn with_field(&self, field: TemporalField, value: i64) -> Option<Self>;

    /// Number of days in the month held by this value, if it has a date.
    fn days_in_month(&self) -> Option<i64> {
        let year = self.get_field(TemporalField::Year)?;
        let month = self.get_field(TemporalField::Month)?;
        days_in_month(i32::try_from(year).ok()?, u32::try_from(month).ok()?).map(i64::from)
    }
}

impl TemporalValue for NaiveDate {
    fn get_field(&self, field: TemporalField) -> Option<i64> {
        Some(match field {
            TemporalField::Year => self.year() as i64,
            TemporalField::YearOfCentury => self.year().rem_euclid(100) as i64,
            TemporalField::Month => self.month() as i64,
            TemporalField::Day => self.day() as i64,
            _ => return None,
        })
    }

    fn with_field(&self, field: TemporalField, value: i64) -> Option<Self> {
        let value = i32::try_from(value).ok()?;
        let (year, month) = match field {
            TemporalField::Year => (value, self.month()),
            TemporalField::YearOfCentury => {
                if !(0..100).contains(&value) {
                    return None;
                }
                (self.year() - self.year().rem_euclid(100) + value, self.month())
            }
            TemporalField::Month => (self.year(), u32::try_from(value).ok()?),
            TemporalField::Day => {
                return NaiveDate::from_ymd_opt(self.year(), self.month(), u32::try_from(value).ok()?);
            }
            _ => return None,
        };
        if !(1..=12).contains(&month) {
            return None;
        }
        // Clamp day to valid range for new month
        let day = self.day().min(days_in_month(year, month)?);
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl TemporalValue for NaiveTime {
    fn get_field(&self, field: TemporalField) -> Option<i64> {
        Some(match field {
            TemporalField::Hour => self.hour() as i64,
            TemporalField::Minute => self.minute() as i64,
            TemporalField::Second => self.second() as i64,
            _ => return None,
        })
    }

    fn with_field(&self, field: TemporalField, value: i64) -> Option<Self> {
        let value = u32::try_from(value).ok()?;
        match field {
            TemporalField::Hour => self.with_hour(value),
            TemporalField::Minute => self.with_minute(value),
            TemporalField::Second => self.with_second(value),
            _ => None,
        }
    }
}

impl TemporalValue for NaiveDateTime {
    fn get_field(&self, field: TemporalField) -> Option<i64> {
        self.date()
            .get_field(field)
            .or_else(|| self.time().get_field(field))
    }

    fn with_field(&self, field: TemporalField, value: i64) -> Option<Self> {
        match field {
            TemporalField::Hour | TemporalField::Minute | TemporalField::Second => {
                Some(self.date().and_time(self.time().with_field(field, value)?))
            }
            _ => Some(self.date().with_field(field, value)?.and_time(self.time())),
        }
    }
}

/// Number of days in a month, or `None` outside chrono's calendar.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    next.pred_opt().map(|last| last.day())
}

/// Verifier for one calendar or clock field of a `V`.
///
/// Tokens of two or more letters zero-pad to the token length (`"MM"` renders
/// March as `"03"`); single-letter tokens do not pad.
#[derive(Debug, Clone)]
pub struct TemporalFieldVerifier<V> {
    field: TemporalField,
    token: String,
    fixed_range: Option<(i64, i64)>,
    _value: PhantomData<fn() -> V>,
}

impl<V: TemporalValue> TemporalFieldVerifier<V> {
    /// Create a verifier for `field` using its canonical token.
    pub fn new(field: TemporalField) -> Self {
        Self {
            field,
            token: field.default_token().to_string(),
            fixed_range: None,
            _value: PhantomData,
        }
    }

    /// Create a verifier from a pattern token such as `"dd"`.
    pub fn for_token(token: &str) -> Option<Self> {
        let field = TemporalField::from_token(token)?;
        Some(Self {
            token: token.to_string(),
            ..Self::new(field)
        })
    }

    /// Restrict the field to a caller-supplied range instead of the natural one.
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.fixed_range = Some((min.min(max), min.max(max)));
        self
    }

    /// The governed field.
    pub fn field(&self) -> TemporalField {
        self.field
    }

    /// The pattern token this verifier formats with.
    pub fn token(&self) -> &str {
        &self.token
    }

    fn pad_width(&self) -> usize {
        let len = self.token.chars().count();
        if len >= 2 { len } else { 0 }
    }

    fn max_length(&self) -> usize {
        self.pad_width().max(self.field.digits())
    }

    fn bounds(&self, field: Option<&V>) -> (i64, i64) {
        self.fixed_range
            .unwrap_or_else(|| self.field.range_in(field))
    }
}

impl<V: TemporalValue> GroupVerifier<V> for TemporalFieldVerifier<V> {
    fn accepts(&self, candidate: &str, field: Option<&V>) -> bool {
        if candidate.starts_with('-') || candidate.chars().count() > self.max_length() {
            return false;
        }
        let (min, max) = self.bounds(field);
        let Ok(value) = parse_decimal(candidate) else {
            return false;
        };
        if (min..=max).contains(&value) {
            return true;
        }
        // A short entry in a zero-padded field may still be a prefix.
        let len = candidate.chars().count();
        let width = self.pad_width();
        if len >= width {
            return false;
        }
        let scale = 10_i64.pow((width - len) as u32);
        let lowest = value * scale;
        lowest <= max && min < lowest + scale
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn range(&self, field: Option<&V>) -> Option<(i64, i64)> {
        Some(self.bounds(field))
    }

    fn length(&self) -> Option<LengthHint> {
        Some(match self.pad_width() {
            0 => LengthHint::new(1, self.max_length()),
            w => LengthHint::exact(w),
        })
    }

    fn format(&self, value: &GroupValue) -> Result<String, VerifyError> {
        let value = value
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        if value < 0 {
            return Err(VerifyError::format("negative calendar field"));
        }
        Ok(format!("{:0width$}", value, width = self.pad_width()))
    }

    fn parse(&self, text: &str) -> Result<GroupValue, VerifyError> {
        parse_decimal(text).map(GroupValue::Integer)
    }

    fn adjust(
        &self,
        current: &GroupValue,
        adjustment: Adjustment,
        restart: bool,
        field: Option<&V>,
    ) -> Result<GroupValue, VerifyError> {
        let current = current
            .as_integer()
            .ok_or_else(|| VerifyError::format("expected an integer"))?;
        let (min, max) = self.bounds(field);
        Ok(GroupValue::Integer(step_in_range(current, adjustment, restart, min, max)))
    }

    fn project(&self, field: &V) -> Option<GroupValue> {
        field.get_field(self.field).map(GroupValue::Integer)
    }

    fn inject(&self, field: &V, value: &GroupValue) -> Option<V> {
        field.with_field(self.field, value.as_integer()?)
    }
}
