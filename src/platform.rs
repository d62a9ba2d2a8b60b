//! Database platform descriptor.
//! Supplies the wire codes a target database uses for large objects and booleans, and
//! whether it stores UUID and ARRAY values natively. Several built-in registrations branch on it.

use serde::{Deserialize, Serialize};

use crate::wire::WireCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Postgres,
    H2,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
    Generic,
}

impl Platform {
    pub fn parse(s: &str) -> Option<Platform> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Platform::Postgres),
            "h2" => Some(Platform::H2),
            "mysql" | "mariadb" => Some(Platform::MySql),
            "sqlite" => Some(Platform::Sqlite),
            "sqlserver" | "mssql" => Some(Platform::SqlServer),
            "oracle" => Some(Platform::Oracle),
            "generic" => Some(Platform::Generic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePlatform {
    pub platform: Platform,
    /// Wire code used for CLOB columns; anything other than CLOB must already be a registered native code.
    pub clob_code: WireCode,
    /// Wire code used for BLOB columns; same rule as `clob_code`.
    pub blob_code: WireCode,
    /// BOOLEAN, BIT, INTEGER (1/0) or VARCHAR ("T"/"F").
    pub boolean_code: WireCode,
    pub native_uuid: bool,
    pub native_array: bool,
}

impl DatabasePlatform {
    pub fn postgres() -> Self {
        // Postgres clobs are text and blobs are bytea
        Self { platform: Platform::Postgres, clob_code: WireCode::VARCHAR, blob_code: WireCode::LONGVARBINARY, boolean_code: WireCode::BOOLEAN, native_uuid: true, native_array: true }
    }
    pub fn h2() -> Self {
        Self { platform: Platform::H2, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::BOOLEAN, native_uuid: true, native_array: true }
    }
    pub fn mysql() -> Self {
        Self { platform: Platform::MySql, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::BIT, native_uuid: false, native_array: false }
    }
    pub fn sqlite() -> Self {
        Self { platform: Platform::Sqlite, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::INTEGER, native_uuid: false, native_array: false }
    }
    pub fn sqlserver() -> Self {
        Self { platform: Platform::SqlServer, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::BIT, native_uuid: false, native_array: false }
    }
    pub fn oracle() -> Self {
        Self { platform: Platform::Oracle, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::INTEGER, native_uuid: false, native_array: false }
    }
    pub fn generic() -> Self {
        Self { platform: Platform::Generic, clob_code: WireCode::CLOB, blob_code: WireCode::BLOB, boolean_code: WireCode::BOOLEAN, native_uuid: false, native_array: false }
    }

    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Postgres => Self::postgres(),
            Platform::H2 => Self::h2(),
            Platform::MySql => Self::mysql(),
            Platform::Sqlite => Self::sqlite(),
            Platform::SqlServer => Self::sqlserver(),
            Platform::Oracle => Self::oracle(),
            Platform::Generic => Self::generic(),
        }
    }

    pub fn is_postgres(&self) -> bool { self.platform == Platform::Postgres }
    pub fn is_platform(&self, p: Platform) -> bool { self.platform == p }
}

impl Default for DatabasePlatform {
    fn default() -> Self { Self::generic() }
}
