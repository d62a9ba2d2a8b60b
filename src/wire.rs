//! Wire-type codes: the standard database column type taxonomy (JDBC numbering)
//! plus platform extension codes, and their PostgreSQL OID equivalents.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Integer identifier of a database column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireCode(pub i32);

impl WireCode {
    /// "Unspecified": matches whatever the registered entry uses.
    pub const NULL: WireCode = WireCode(0);
    pub const BIT: WireCode = WireCode(-7);
    pub const TINYINT: WireCode = WireCode(-6);
    pub const SMALLINT: WireCode = WireCode(5);
    pub const INTEGER: WireCode = WireCode(4);
    pub const BIGINT: WireCode = WireCode(-5);
    pub const FLOAT: WireCode = WireCode(6);
    pub const REAL: WireCode = WireCode(7);
    pub const DOUBLE: WireCode = WireCode(8);
    pub const NUMERIC: WireCode = WireCode(2);
    pub const DECIMAL: WireCode = WireCode(3);
    pub const CHAR: WireCode = WireCode(1);
    pub const VARCHAR: WireCode = WireCode(12);
    pub const LONGVARCHAR: WireCode = WireCode(-1);
    pub const DATE: WireCode = WireCode(91);
    pub const TIME: WireCode = WireCode(92);
    pub const TIMESTAMP: WireCode = WireCode(93);
    pub const BINARY: WireCode = WireCode(-2);
    pub const VARBINARY: WireCode = WireCode(-3);
    pub const LONGVARBINARY: WireCode = WireCode(-4);
    pub const OTHER: WireCode = WireCode(1111);
    pub const ARRAY: WireCode = WireCode(2003);
    pub const BLOB: WireCode = WireCode(2004);
    pub const CLOB: WireCode = WireCode(2005);
    pub const BOOLEAN: WireCode = WireCode(16);
    pub const TIME_WITH_TIMEZONE: WireCode = WireCode(2013);
    pub const TIMESTAMP_WITH_TIMEZONE: WireCode = WireCode(2014);

    // Platform extension codes (outside the standard range)
    pub const HSTORE: WireCode = WireCode(5000);
    pub const JSON: WireCode = WireCode(5001);
    pub const JSONB: WireCode = WireCode(5002);
    pub const UUID: WireCode = WireCode(5010);
    pub const INET: WireCode = WireCode(5011);

    pub fn name(&self) -> &'static str {
        match *self {
            WireCode::NULL => "NULL",
            WireCode::BIT => "BIT",
            WireCode::TINYINT => "TINYINT",
            WireCode::SMALLINT => "SMALLINT",
            WireCode::INTEGER => "INTEGER",
            WireCode::BIGINT => "BIGINT",
            WireCode::FLOAT => "FLOAT",
            WireCode::REAL => "REAL",
            WireCode::DOUBLE => "DOUBLE",
            WireCode::NUMERIC => "NUMERIC",
            WireCode::DECIMAL => "DECIMAL",
            WireCode::CHAR => "CHAR",
            WireCode::VARCHAR => "VARCHAR",
            WireCode::LONGVARCHAR => "LONGVARCHAR",
            WireCode::DATE => "DATE",
            WireCode::TIME => "TIME",
            WireCode::TIMESTAMP => "TIMESTAMP",
            WireCode::BINARY => "BINARY",
            WireCode::VARBINARY => "VARBINARY",
            WireCode::LONGVARBINARY => "LONGVARBINARY",
            WireCode::OTHER => "OTHER",
            WireCode::ARRAY => "ARRAY",
            WireCode::BLOB => "BLOB",
            WireCode::CLOB => "CLOB",
            WireCode::BOOLEAN => "BOOLEAN",
            WireCode::TIME_WITH_TIMEZONE => "TIME_WITH_TIMEZONE",
            WireCode::TIMESTAMP_WITH_TIMEZONE => "TIMESTAMP_WITH_TIMEZONE",
            WireCode::HSTORE => "HSTORE",
            WireCode::JSON => "JSON",
            WireCode::JSONB => "JSONB",
            WireCode::UUID => "UUID",
            WireCode::INET => "INET",
            _ => "UNKNOWN",
        }
    }

    /// Parse a code from its name (case-insensitive) or its numeric form.
    pub fn parse(s: &str) -> Option<WireCode> {
        let t = s.trim();
        if let Ok(n) = t.parse::<i32>() { return Some(WireCode(n)); }
        ALL_NAMED.iter().copied().find(|c| c.name().eq_ignore_ascii_case(t))
    }

    /// Codes where one application type (String, bytes) has several storage forms.
    pub fn is_multi_representation(&self) -> bool {
        matches!(*self, WireCode::CHAR | WireCode::LONGVARCHAR | WireCode::CLOB | WireCode::LONGVARBINARY | WireCode::BLOB)
    }

    /// PostgreSQL type OID used when describing a column of this code over pgwire.
    pub fn pg_oid(&self) -> i32 {
        match *self {
            WireCode::BOOLEAN | WireCode::BIT => 16,
            WireCode::TINYINT | WireCode::SMALLINT => 21,
            WireCode::INTEGER => 23,
            WireCode::BIGINT => 20,
            WireCode::REAL => 700,
            WireCode::FLOAT | WireCode::DOUBLE => 701,
            WireCode::NUMERIC | WireCode::DECIMAL => 1700,
            WireCode::CHAR => 1042, // bpchar
            WireCode::VARCHAR => 1043,
            WireCode::LONGVARCHAR | WireCode::CLOB => 25,
            WireCode::BINARY | WireCode::VARBINARY | WireCode::LONGVARBINARY | WireCode::BLOB => 17, // bytea
            WireCode::DATE => 1082,
            WireCode::TIME => 1083,
            WireCode::TIME_WITH_TIMEZONE => 1266,
            WireCode::TIMESTAMP => 1114,
            WireCode::TIMESTAMP_WITH_TIMEZONE => 1184,
            WireCode::JSON => 114,
            WireCode::JSONB => 3802,
            WireCode::UUID => 2950,
            WireCode::INET => 869,
            WireCode::HSTORE => 16414, // extension type; OID is per-database, keep the synthesized one
            _ => PG_TYPE_TEXT,
        }
    }

    /// PostgreSQL array OID for arrays whose elements use this code.
    pub fn pg_array_oid(&self) -> i32 {
        match *self {
            WireCode::BOOLEAN | WireCode::BIT => 1000,
            WireCode::TINYINT | WireCode::SMALLINT => 1005,
            WireCode::INTEGER => 1007,
            WireCode::BIGINT => 1016,
            WireCode::REAL => 1021,
            WireCode::FLOAT | WireCode::DOUBLE => 1022,
            WireCode::NUMERIC | WireCode::DECIMAL => 1231,
            WireCode::BINARY | WireCode::VARBINARY | WireCode::LONGVARBINARY | WireCode::BLOB => 1001,
            WireCode::DATE => 1182,
            WireCode::TIME => 1183,
            WireCode::TIMESTAMP => 1115,
            WireCode::TIMESTAMP_WITH_TIMEZONE => 1185,
            WireCode::UUID => 2951,
            _ => 1009, // text[]
        }
    }
}

pub const PG_TYPE_TEXT: i32 = 25;

const ALL_NAMED: &[WireCode] = &[
    WireCode::NULL, WireCode::BIT, WireCode::TINYINT, WireCode::SMALLINT, WireCode::INTEGER,
    WireCode::BIGINT, WireCode::FLOAT, WireCode::REAL, WireCode::DOUBLE, WireCode::NUMERIC,
    WireCode::DECIMAL, WireCode::CHAR, WireCode::VARCHAR, WireCode::LONGVARCHAR, WireCode::DATE,
    WireCode::TIME, WireCode::TIMESTAMP, WireCode::BINARY, WireCode::VARBINARY, WireCode::LONGVARBINARY,
    WireCode::OTHER, WireCode::ARRAY, WireCode::BLOB, WireCode::CLOB, WireCode::BOOLEAN,
    WireCode::TIME_WITH_TIMEZONE, WireCode::TIMESTAMP_WITH_TIMEZONE, WireCode::HSTORE, WireCode::JSON,
    WireCode::JSONB, WireCode::UUID, WireCode::INET,
];

impl Display for WireCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

impl From<i32> for WireCode {
    fn from(v: i32) -> Self { WireCode(v) }
}
