//! Date, time and duration entries, including the two legacy moment types that
//! can be projected onto DATE, TIME or TIMESTAMP.

use std::time::SystemTime;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde_json::Value as JsonValue;

use super::{mismatch, DocPropertyType, ScalarType, ScalarTypeFn, ScalarTypeRef};
use crate::config::JsonDateTime;
use crate::error::{TypeError, TypeResult};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// UTC instant behind any instant-like value. Naive timestamps are read as UTC.
pub fn instant_of(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::TimestampUtc(t) => Some(*t),
        Value::TimestampTz(t) => Some(t.with_timezone(&Utc)),
        Value::TimestampLocal(t) => Some(t.with_timezone(&Utc)),
        Value::SystemTime(st) => Some(DateTime::<Utc>::from(*st)),
        Value::Timestamp(ts) => Some(ts.and_utc()),
        #[cfg(feature = "time-types")]
        Value::TimeOffset(t) => DateTime::<Utc>::from_timestamp(t.unix_timestamp(), t.nanosecond()),
        #[cfg(feature = "time-types")]
        Value::TimePrimitive(t) => {
            let t = t.assume_utc();
            DateTime::<Utc>::from_timestamp(t.unix_timestamp(), t.nanosecond())
        }
        _ => None,
    }
}

/// JSON form of an instant under the given mode; `None` for values that are not instants.
pub fn instant_json(mode: JsonDateTime, value: &Value) -> Option<JsonValue> {
    let at = instant_of(value)?;
    Some(match mode {
        JsonDateTime::Millis => JsonValue::from(at.timestamp_millis()),
        JsonDateTime::Nanos => JsonValue::String(format!("{}.{:09}", at.timestamp(), at.timestamp_subsec_nanos())),
        JsonDateTime::Iso8601 => JsonValue::String(at.to_rfc3339()),
    })
}

pub fn date() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<NaiveDate>(), WireCode::DATE, DocPropertyType::Date, "ScalarTypeLocalDate",
        |v| match v { Value::Date(_) => Ok(v), o => Err(o) },
        |v| match v {
            Value::Date(_) => Ok(v),
            Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
            Value::Text(ref s) => s.parse::<NaiveDate>().map(Value::Date).map_err(|_| v),
            o => Err(o),
        }).into_ref()
}

/// `NaiveTime` as second-precision TIME (sub-second part dropped), or BIGINT nanos-of-day.
pub fn time(with_nanos: bool) -> ScalarTypeRef {
    let key = TypeKey::of::<NaiveTime>();
    if with_nanos {
        return ScalarTypeFn::new(key, WireCode::BIGINT, DocPropertyType::Long, "ScalarTypeLocalTimeNanos",
            |v| match v {
                Value::Time(t) => Ok(Value::I64(t.num_seconds_from_midnight() as i64 * 1_000_000_000 + t.nanosecond() as i64)),
                o => Err(o),
            },
            |v| match v.as_i64() {
                Some(n) if n >= 0 => {
                    let secs = (n / 1_000_000_000) as u32;
                    let nanos = (n % 1_000_000_000) as u32;
                    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).map(Value::Time).ok_or(v)
                }
                _ => Err(v),
            }).into_ref();
    }
    ScalarTypeFn::new(key, WireCode::TIME, DocPropertyType::Keyword, "ScalarTypeLocalTime",
        |v| match v {
            Value::Time(t) => t.with_nanosecond(0).map(Value::Time).ok_or(v),
            o => Err(o),
        },
        |v| match v {
            Value::Time(_) => Ok(v),
            Value::Timestamp(ts) => Ok(Value::Time(ts.time())),
            o => Err(o),
        }).into_ref()
}

pub fn timestamp(mode: JsonDateTime) -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<NaiveDateTime>(), WireCode::TIMESTAMP, DocPropertyType::DateTime, "ScalarTypeLocalDateTime",
        |v| match v { Value::Timestamp(_) => Ok(v), o => Err(o) },
        |v| match v {
            Value::Timestamp(_) => Ok(v),
            Value::TimestampUtc(t) => Ok(Value::Timestamp(t.naive_utc())),
            Value::Date(d) => Ok(Value::Timestamp(d.and_time(NaiveTime::MIN))),
            o => Err(o),
        }).with_json_mode(mode).into_ref()
}

pub fn timestamp_utc(mode: JsonDateTime) -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<DateTime<Utc>>(), WireCode::TIMESTAMP, DocPropertyType::DateTime, "ScalarTypeInstant",
        |v| match v { Value::TimestampUtc(t) => Ok(Value::Timestamp(t.naive_utc())), o => Err(o) },
        |v| match v {
            Value::TimestampUtc(_) => Ok(v),
            Value::Timestamp(ts) => Ok(Value::TimestampUtc(ts.and_utc())),
            Value::TimestampTz(t) => Ok(Value::TimestampUtc(t.with_timezone(&Utc))),
            o => Err(o),
        }).with_json_mode(mode).into_ref()
}

pub fn timestamp_tz(mode: JsonDateTime) -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<DateTime<FixedOffset>>(), WireCode::TIMESTAMP_WITH_TIMEZONE, DocPropertyType::DateTime, "ScalarTypeOffsetDateTime",
        |v| match v { Value::TimestampTz(_) => Ok(v), o => Err(o) },
        |v| match v {
            Value::TimestampTz(_) => Ok(v),
            Value::TimestampUtc(t) => Ok(Value::TimestampTz(t.fixed_offset())),
            Value::Timestamp(ts) => Ok(Value::TimestampTz(ts.and_utc().fixed_offset())),
            o => Err(o),
        }).with_json_mode(mode).into_ref()
}

/// `chrono::Duration` as BIGINT whole seconds, or DECIMAL seconds with nine fractional digits.
pub fn duration(with_nanos: bool) -> ScalarTypeRef {
    let key = TypeKey::of::<chrono::Duration>();
    if with_nanos {
        return ScalarTypeFn::new(key, WireCode::DECIMAL, DocPropertyType::Double, "ScalarTypeDurationWithNanos",
            |v| match v {
                Value::Duration(d) => d.num_nanoseconds().map(|n| Value::Decimal(BigDecimal::new(BigInt::from(n), 9))).ok_or(v),
                o => Err(o),
            },
            |v| match v {
                Value::Decimal(ref d) => {
                    let (nanos, _) = d.with_scale(9).into_bigint_and_exponent();
                    nanos.to_i64().map(|n| Value::Duration(chrono::Duration::nanoseconds(n))).ok_or(v)
                }
                o => Err(o),
            }).into_ref();
    }
    ScalarTypeFn::new(key, WireCode::BIGINT, DocPropertyType::Long, "ScalarTypeDuration",
        |v| match v { Value::Duration(d) => Ok(Value::I64(d.num_seconds())), o => Err(o) },
        |v| match v.as_i64() {
            Some(n) => chrono::Duration::try_seconds(n).map(Value::Duration).ok_or(v),
            None => Err(v),
        }).into_ref()
}

/// The two legacy "moment" application types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentKind {
    /// `std::time::SystemTime`, projected in UTC.
    SystemTime,
    /// `chrono::DateTime<Local>`, projected in the local zone.
    Local,
}

impl MomentKind {
    pub fn key(&self) -> TypeKey {
        match self {
            MomentKind::SystemTime => TypeKey::of::<SystemTime>(),
            MomentKind::Local => TypeKey::of::<DateTime<Local>>(),
        }
    }

    pub fn of_key(key: TypeKey) -> Option<MomentKind> {
        [MomentKind::SystemTime, MomentKind::Local].into_iter().find(|k| k.key() == key)
    }
}

/// Legacy moment projected onto DATE, TIME or TIMESTAMP. The DATE and TIME
/// projections lose the other half of the value.
#[derive(Debug, Clone)]
pub struct ScalarTypeMoment {
    kind: MomentKind,
    code: WireCode,
    mode: JsonDateTime,
}

impl ScalarTypeMoment {
    pub fn new(kind: MomentKind, code: WireCode, mode: JsonDateTime) -> TypeResult<Self> {
        match code {
            WireCode::DATE | WireCode::TIME | WireCode::TIMESTAMP => Ok(Self { kind, code, mode }),
            other => Err(TypeError::unmatched(kind.key().name(), other)),
        }
    }

    fn naive(&self, v: &Value) -> Option<NaiveDateTime> {
        match (self.kind, v) {
            (MomentKind::SystemTime, Value::SystemTime(st)) => Some(DateTime::<Utc>::from(*st).naive_utc()),
            (MomentKind::Local, Value::TimestampLocal(t)) => Some(t.naive_local()),
            _ => None,
        }
    }

    fn moment(&self, naive: NaiveDateTime) -> Option<Value> {
        match self.kind {
            MomentKind::SystemTime => Some(Value::SystemTime(SystemTime::from(naive.and_utc()))),
            MomentKind::Local => Local.from_local_datetime(&naive).earliest().map(Value::TimestampLocal),
        }
    }
}

impl ScalarType for ScalarTypeMoment {
    fn app_type(&self) -> TypeKey { self.kind.key() }
    fn wire_code(&self) -> WireCode { self.code }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::DateTime }

    fn describe(&self) -> &'static str {
        match (self.kind, self.code) {
            (MomentKind::SystemTime, WireCode::DATE) => "ScalarTypeSystemTimeDate",
            (MomentKind::SystemTime, WireCode::TIME) => "ScalarTypeSystemTimeTime",
            (MomentKind::SystemTime, _) => "ScalarTypeSystemTimeTimestamp",
            (MomentKind::Local, WireCode::DATE) => "ScalarTypeLocalMomentDate",
            (MomentKind::Local, WireCode::TIME) => "ScalarTypeLocalMomentTime",
            (MomentKind::Local, _) => "ScalarTypeLocalMomentTimestamp",
        }
    }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let naive = self.naive(&value).ok_or_else(|| mismatch(self.app_type(), "to_wire", &value))?;
        Ok(match self.code {
            WireCode::DATE => Value::Date(naive.date()),
            WireCode::TIME => Value::Time(naive.time().with_nanosecond(0).unwrap_or(naive.time())),
            _ => Value::Timestamp(naive),
        })
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let naive = match (&value, self.code) {
            (Value::Date(d), WireCode::DATE) => Some(d.and_time(NaiveTime::MIN)),
            (Value::Time(t), WireCode::TIME) => Some(DateTime::<Utc>::UNIX_EPOCH.date_naive().and_time(*t)),
            (Value::Timestamp(ts), WireCode::TIMESTAMP) => Some(*ts),
            _ => None,
        };
        naive.and_then(|n| self.moment(n)).ok_or_else(|| mismatch(self.app_type(), "from_wire", &value))
    }

    fn to_json(&self, value: &Value) -> TypeResult<JsonValue> {
        Ok(instant_json(self.mode, value).unwrap_or_else(|| value.to_json()))
    }
}
