//! Numeric, boolean, string, char and binary entries.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};

use super::{narrow, same, Conv, DocPropertyType, ScalarTypeFn, ScalarTypeRef};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// How a platform stores booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolFlavour {
    Native,
    Bit,
    /// 1 / 0
    Integer,
    /// "T" / "F"
    Varchar,
}

impl BoolFlavour {
    pub fn for_code(code: WireCode) -> Option<BoolFlavour> {
        match code {
            WireCode::BOOLEAN => Some(BoolFlavour::Native),
            WireCode::BIT => Some(BoolFlavour::Bit),
            WireCode::INTEGER => Some(BoolFlavour::Integer),
            WireCode::VARCHAR => Some(BoolFlavour::Varchar),
            _ => None,
        }
    }

    pub fn wire_code(&self) -> WireCode {
        match self {
            BoolFlavour::Native => WireCode::BOOLEAN,
            BoolFlavour::Bit => WireCode::BIT,
            BoolFlavour::Integer => WireCode::INTEGER,
            BoolFlavour::Varchar => WireCode::VARCHAR,
        }
    }

    /// DDL literals for true and false.
    pub fn literals(&self) -> (&'static str, &'static str) {
        match self {
            BoolFlavour::Native => ("true", "false"),
            BoolFlavour::Bit => ("1", "0"),
            BoolFlavour::Integer => ("1", "0"),
            BoolFlavour::Varchar => ("'T'", "'F'"),
        }
    }
}

pub fn boolean(flavour: BoolFlavour) -> ScalarTypeRef {
    let key = TypeKey::of::<bool>();
    let e = match flavour {
        BoolFlavour::Native => ScalarTypeFn::new(key, WireCode::BOOLEAN, DocPropertyType::Boolean, "ScalarTypeBoolean", bool_same, bool_from_any),
        BoolFlavour::Bit => ScalarTypeFn::new(key, WireCode::BIT, DocPropertyType::Boolean, "ScalarTypeBooleanBit", bool_same, bool_from_any),
        BoolFlavour::Integer => ScalarTypeFn::new(key, WireCode::INTEGER, DocPropertyType::Boolean, "ScalarTypeBooleanInteger", bool_to_int, bool_from_any),
        BoolFlavour::Varchar => ScalarTypeFn::new(key, WireCode::VARCHAR, DocPropertyType::Boolean, "ScalarTypeBooleanString", bool_to_text, bool_from_text).with_length(1),
    };
    e.into_ref()
}

fn bool_same(v: Value) -> Conv { match v { Value::Bool(_) => Ok(v), o => Err(o) } }
fn bool_to_int(v: Value) -> Conv { match v { Value::Bool(b) => Ok(Value::I32(if b { 1 } else { 0 })), o => Err(o) } }
fn bool_to_text(v: Value) -> Conv { match v { Value::Bool(b) => Ok(Value::Text(if b { "T" } else { "F" }.into())), o => Err(o) } }

fn bool_from_any(v: Value) -> Conv {
    if let Value::Bool(_) = v { return Ok(v); }
    match v.as_i64() {
        Some(n) => Ok(Value::Bool(n != 0)),
        None => Err(v),
    }
}

fn bool_from_text(v: Value) -> Conv {
    match v.as_str() {
        Some("T") => Ok(Value::Bool(true)),
        Some("F") => Ok(Value::Bool(false)),
        _ => Err(v),
    }
}

pub fn tinyint() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<i8>(), WireCode::TINYINT, DocPropertyType::Short, "ScalarTypeByte",
        |v| match v { Value::I8(_) => Ok(v), o => Err(o) },
        |v| narrow(v, |n| i8::try_from(n).ok().map(Value::I8))).into_ref()
}

pub fn smallint() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<i16>(), WireCode::SMALLINT, DocPropertyType::Short, "ScalarTypeShort",
        |v| match v { Value::I16(_) => Ok(v), o => Err(o) },
        |v| narrow(v, |n| i16::try_from(n).ok().map(Value::I16))).into_ref()
}

pub fn integer() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<i32>(), WireCode::INTEGER, DocPropertyType::Integer, "ScalarTypeInteger",
        |v| match v { Value::I32(_) => Ok(v), o => Err(o) },
        |v| narrow(v, |n| i32::try_from(n).ok().map(Value::I32))).into_ref()
}

pub fn bigint() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<i64>(), WireCode::BIGINT, DocPropertyType::Long, "ScalarTypeLong",
        |v| match v { Value::I64(_) => Ok(v), o => Err(o) },
        |v| narrow(v, |n| Some(Value::I64(n)))).into_ref()
}

pub fn real() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<f32>(), WireCode::REAL, DocPropertyType::Float, "ScalarTypeFloat",
        |v| match v { Value::F32(_) => Ok(v), o => Err(o) },
        |v| match v {
            Value::F32(_) => Ok(v),
            Value::F64(f) => Ok(Value::F32(f as f32)),
            o => o.as_i64().map(|n| Value::F32(n as f32)).ok_or(o),
        }).into_ref()
}

/// f64 at DOUBLE; also registered as the FLOAT native.
pub fn double() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<f64>(), WireCode::DOUBLE, DocPropertyType::Double, "ScalarTypeDouble",
        |v| match v { Value::F64(_) => Ok(v), o => Err(o) },
        |v| match v {
            Value::F64(_) => Ok(v),
            Value::F32(f) => Ok(Value::F64(f as f64)),
            o => o.as_i64().map(|n| Value::F64(n as f64)).ok_or(o),
        }).into_ref()
}

pub fn decimal() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<BigDecimal>(), WireCode::DECIMAL, DocPropertyType::Double, "ScalarTypeBigDecimal",
        |v| match v { Value::Decimal(_) => Ok(v), o => Err(o) },
        decimal_from_wire).into_ref()
}

fn decimal_from_wire(v: Value) -> Conv {
    match v {
        Value::Decimal(_) => Ok(v),
        Value::BigInt(b) => Ok(Value::Decimal(BigDecimal::from(b))),
        Value::Text(ref s) => BigDecimal::from_str(s.trim()).map(Value::Decimal).map_err(|_| v),
        o => o.as_i64().map(|n| Value::Decimal(BigDecimal::from(n))).ok_or(o),
    }
}

/// `BigInt` stored as BIGINT; values outside the i64 range are rejected on write.
pub fn big_integer() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<BigInt>(), WireCode::BIGINT, DocPropertyType::Long, "ScalarTypeBigInteger",
        |v| match v {
            Value::BigInt(ref b) => b.to_i64().map(Value::I64).ok_or(v),
            o => Err(o),
        },
        |v| match v {
            Value::BigInt(_) => Ok(v),
            Value::Decimal(ref d) if d.is_integer() => d.to_i64().map(|n| Value::BigInt(BigInt::from(n))).ok_or(v),
            o => o.as_i64().map(|n| Value::BigInt(BigInt::from(n))).ok_or(o),
        }).into_ref()
}

fn text_same(v: Value) -> Conv { match v { Value::Text(_) => Ok(v), o => Err(o) } }

fn text_from_wire(v: Value) -> Conv {
    match v {
        Value::Text(_) => Ok(v),
        Value::Char(c) => Ok(Value::Text(c.to_string())),
        o => Err(o),
    }
}

/// `String` entry for one of the textual codes (VARCHAR, CHAR, LONGVARCHAR, CLOB).
pub fn string(code: WireCode) -> ScalarTypeRef {
    let (name, doc) = match code {
        WireCode::CLOB => ("ScalarTypeClob", DocPropertyType::Text),
        WireCode::LONGVARCHAR => ("ScalarTypeLongVarchar", DocPropertyType::Text),
        WireCode::CHAR => ("ScalarTypeChar", DocPropertyType::Keyword),
        _ => ("ScalarTypeString", DocPropertyType::Keyword),
    };
    ScalarTypeFn::new(TypeKey::of::<String>(), code, doc, name, text_same, text_from_wire).into_ref()
}

pub fn character() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<char>(), WireCode::CHAR, DocPropertyType::Keyword, "ScalarTypeCharacter",
        |v| match v { Value::Char(c) => Ok(Value::Text(c.to_string())), o => Err(o) },
        |v| match v {
            Value::Char(_) => Ok(v),
            Value::Text(ref s) => s.chars().next().map(Value::Char).ok_or(v),
            o => Err(o),
        }).with_length(1).into_ref()
}

/// `Vec<u8>` entry for one of the binary codes (BINARY, VARBINARY, LONGVARBINARY, BLOB).
pub fn bytes(code: WireCode) -> ScalarTypeRef {
    let name = match code {
        WireCode::BLOB => "ScalarTypeBytesBlob",
        WireCode::LONGVARBINARY => "ScalarTypeBytesLongVarbinary",
        WireCode::BINARY => "ScalarTypeBytesBinary",
        _ => "ScalarTypeBytesVarbinary",
    };
    ScalarTypeFn::new(TypeKey::of::<Vec<u8>>(), code, DocPropertyType::Binary, name,
        |v| match v { Value::Bytes(_) => Ok(v), o => Err(o) },
        same).into_ref()
}
