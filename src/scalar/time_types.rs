//! Entries for the `time` crate's date and time types.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use super::{DocPropertyType, ScalarTypeFn, ScalarTypeRef};
use crate::config::{JsonDateTime, LocalTimeMode};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

fn to_naive_date(d: time::Date) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(d.year(), u8::from(d.month()) as u32, d.day() as u32)
}

fn from_naive_date(d: NaiveDate) -> Option<time::Date> {
    let month = time::Month::try_from(d.month() as u8).ok()?;
    time::Date::from_calendar_date(d.year(), month, d.day() as u8).ok()
}

fn to_naive_time(t: time::Time) -> Option<NaiveTime> {
    NaiveTime::from_hms_nano_opt(t.hour() as u32, t.minute() as u32, t.second() as u32, t.nanosecond())
}

fn from_naive_time(t: NaiveTime) -> Option<time::Time> {
    time::Time::from_hms_nano(t.hour() as u8, t.minute() as u8, t.second() as u8, t.nanosecond()).ok()
}

fn to_naive(t: time::PrimitiveDateTime) -> Option<NaiveDateTime> {
    Some(NaiveDateTime::new(to_naive_date(t.date())?, to_naive_time(t.time())?))
}

fn from_naive(t: NaiveDateTime) -> Option<time::PrimitiveDateTime> {
    Some(time::PrimitiveDateTime::new(from_naive_date(t.date())?, from_naive_time(t.time())?))
}

fn to_fixed(t: time::OffsetDateTime) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(t.offset().whole_seconds())?;
    Some(DateTime::<Utc>::from_timestamp(t.unix_timestamp(), t.nanosecond())?.with_timezone(&offset))
}

fn from_fixed(t: DateTime<FixedOffset>) -> Option<time::OffsetDateTime> {
    let offset = time::UtcOffset::from_whole_seconds(t.offset().local_minus_utc()).ok()?;
    Some(from_naive(t.naive_local())?.assume_offset(offset))
}

pub fn date() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<time::Date>(), WireCode::DATE, DocPropertyType::Date, "ScalarTypeTimeDate",
        |v| match v { Value::TimeDate(d) => to_naive_date(d).map(Value::Date).ok_or(v), o => Err(o) },
        |v| match v { Value::Date(d) => from_naive_date(d).map(Value::TimeDate).ok_or(v), o => Err(o) }).into_ref()
}

pub fn primitive_date_time(mode: JsonDateTime) -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<time::PrimitiveDateTime>(), WireCode::TIMESTAMP, DocPropertyType::DateTime, "ScalarTypeTimePrimitive",
        |v| match v { Value::TimePrimitive(t) => to_naive(t).map(Value::Timestamp).ok_or(v), o => Err(o) },
        |v| match v { Value::Timestamp(t) => from_naive(t).map(Value::TimePrimitive).ok_or(v), o => Err(o) })
        .with_json_mode(mode).into_ref()
}

pub fn offset_date_time(mode: JsonDateTime) -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<time::OffsetDateTime>(), WireCode::TIMESTAMP_WITH_TIMEZONE, DocPropertyType::DateTime, "ScalarTypeTimeOffset",
        |v| match v { Value::TimeOffset(t) => to_fixed(t).map(Value::TimestampTz).ok_or(v), o => Err(o) },
        |v| match v { Value::TimestampTz(t) => from_fixed(t).map(Value::TimeOffset).ok_or(v), o => Err(o) })
        .with_json_mode(mode).into_ref()
}

/// `time::Time` in the configured mode: TIME as-is, or a TIMESTAMP on 1970-01-01.
pub fn time_of_day(mode: LocalTimeMode) -> ScalarTypeRef {
    let key = TypeKey::of::<time::Time>();
    let e = match mode {
        LocalTimeMode::Normal => ScalarTypeFn::new(key, WireCode::TIME, DocPropertyType::Keyword, "ScalarTypeTimeLocalTime",
            |v| match v { Value::TimeOfDay(t) => to_naive_time(t).map(Value::Time).ok_or(v), o => Err(o) },
            |v| match v { Value::Time(t) => from_naive_time(t).map(Value::TimeOfDay).ok_or(v), o => Err(o) }),
        LocalTimeMode::Utc => ScalarTypeFn::new(key, WireCode::TIMESTAMP, DocPropertyType::Keyword, "ScalarTypeTimeLocalTimeUtc",
            |v| match v {
                Value::TimeOfDay(t) => to_naive_time(t).map(|nt| Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH.date_naive().and_time(nt))).ok_or(v),
                o => Err(o),
            },
            |v| match v { Value::Timestamp(ts) => from_naive_time(ts.time()).map(Value::TimeOfDay).ok_or(v), o => Err(o) }),
    };
    e.into_ref()
}
