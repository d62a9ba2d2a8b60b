use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::platform::{DatabasePlatform, Platform};

/// JSON export format for date-time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JsonDateTime {
    /// Epoch milliseconds as a JSON number.
    #[default]
    Millis,
    /// Epoch seconds with nanosecond fraction, e.g. `1700000000.000000123`.
    Nanos,
    /// ISO-8601 / RFC 3339 string.
    Iso8601,
}

/// How UUID values are stored when the platform has no native type (or it is not wanted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DbUuid {
    /// Native when supported, else VARCHAR(40).
    #[default]
    AutoVarchar,
    /// Native when supported, else BINARY(16).
    AutoBinary,
    Varchar,
    Binary,
}

impl DbUuid {
    pub fn use_native_type(&self) -> bool { matches!(self, DbUuid::AutoVarchar | DbUuid::AutoBinary) }
    pub fn use_binary(&self) -> bool { matches!(self, DbUuid::AutoBinary | DbUuid::Binary) }
}

/// Storage mode for `time::Time`. There is no safe default, so it must be configured
/// before that type can be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalTimeMode {
    /// Wall-clock TIME as-is.
    Normal,
    /// Legacy: TIMESTAMP on the epoch day, interpreted in UTC.
    Utc,
}

impl LocalTimeMode {
    pub fn parse(s: &str) -> Option<LocalTimeMode> {
        if s.eq_ignore_ascii_case("normal") { Some(LocalTimeMode::Normal) }
        else if s.eq_ignore_ascii_case("utc") { Some(LocalTimeMode::Utc) }
        else { None }
    }
}

/// Registry configuration. Unspecified JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConfig {
    pub platform: DatabasePlatform,
    pub json_date_time: JsonDateTime,
    pub db_uuid: DbUuid,
    /// Store `NaiveTime` as BIGINT nanos-of-day instead of second-precision TIME.
    pub local_time_with_nanos: bool,
    /// Store `chrono::Duration` as DECIMAL seconds with nanos instead of BIGINT seconds.
    pub duration_with_nanos: bool,
    pub time_local_time_mode: Option<LocalTimeMode>,
    /// Generating migrations without a live database: prefer native types everywhere.
    pub offline_migration: bool,
    /// Provide a shared JSON codec to JSON-backed entries and plugins.
    pub json_codec: bool,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            platform: DatabasePlatform::default(),
            json_date_time: JsonDateTime::default(),
            db_uuid: DbUuid::default(),
            local_time_with_nanos: false,
            duration_with_nanos: false,
            time_local_time_mode: None,
            offline_migration: false,
            json_codec: true,
        }
    }
}

pub const ENV_PLATFORM: &str = "SCALAR_PLATFORM";
pub const ENV_DB_UUID: &str = "SCALAR_DB_UUID";
pub const ENV_JSON_DATETIME: &str = "SCALAR_JSON_DATETIME";
pub const ENV_LOCAL_TIME_NANOS: &str = "SCALAR_LOCAL_TIME_NANOS";
pub const ENV_DURATION_NANOS: &str = "SCALAR_DURATION_NANOS";
pub const ENV_TIME_LOCAL_TIME_MODE: &str = "SCALAR_TIME_LOCAL_TIME_MODE";
pub const ENV_OFFLINE_MIGRATION: &str = "SCALAR_OFFLINE_MIGRATION";
pub const ENV_JSON_CODEC: &str = "SCALAR_JSON_CODEC";

impl TypeConfig {
    pub fn for_platform(platform: DatabasePlatform) -> Self {
        Self { platform, ..Self::default() }
    }

    pub fn from_json_str(s: &str) -> TypeResult<Self> {
        serde_json::from_str(s).map_err(|e| TypeError::config(format!("invalid type config json: {}", e)))
    }

    /// Defaults overlaid with `SCALAR_*` environment variables.
    pub fn from_env() -> TypeResult<Self> {
        Self::default().apply_vars(|k| std::env::var(k).ok())
    }

    /// Overlay settings from a variable lookup; unset variables keep the current value.
    pub fn apply_vars<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> TypeResult<Self> {
        if let Some(v) = lookup(ENV_PLATFORM) {
            let p = Platform::parse(&v).ok_or_else(|| TypeError::config(format!("{}: unknown platform '{}'", ENV_PLATFORM, v)))?;
            self.platform = DatabasePlatform::for_platform(p);
        }
        if let Some(v) = lookup(ENV_DB_UUID) {
            self.db_uuid = parse_enum(ENV_DB_UUID, &v)?;
        }
        if let Some(v) = lookup(ENV_JSON_DATETIME) {
            self.json_date_time = parse_enum(ENV_JSON_DATETIME, &v)?;
        }
        if let Some(v) = lookup(ENV_LOCAL_TIME_NANOS) { self.local_time_with_nanos = parse_flag(ENV_LOCAL_TIME_NANOS, &v)?; }
        if let Some(v) = lookup(ENV_DURATION_NANOS) { self.duration_with_nanos = parse_flag(ENV_DURATION_NANOS, &v)?; }
        if let Some(v) = lookup(ENV_OFFLINE_MIGRATION) { self.offline_migration = parse_flag(ENV_OFFLINE_MIGRATION, &v)?; }
        if let Some(v) = lookup(ENV_JSON_CODEC) { self.json_codec = parse_flag(ENV_JSON_CODEC, &v)?; }
        if let Some(v) = lookup(ENV_TIME_LOCAL_TIME_MODE) {
            // empty means "leave unset"
            if !v.trim().is_empty() {
                let mode = LocalTimeMode::parse(v.trim())
                    .ok_or_else(|| TypeError::config(format!("{}: expected 'normal' or 'utc', got '{}'", ENV_TIME_LOCAL_TIME_MODE, v)))?;
                self.time_local_time_mode = Some(mode);
            }
        }
        Ok(self)
    }
}

fn parse_flag(name: &str, v: &str) -> TypeResult<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TypeError::config(format!("{}: expected a boolean, got '{}'", name, v))),
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(name: &str, v: &str) -> TypeResult<T> {
    serde_json::from_value(serde_json::Value::String(v.trim().to_ascii_lowercase()))
        .map_err(|_| TypeError::config(format!("{}: unsupported value '{}'", name, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireCode;
    use std::collections::HashMap;

    #[test]
    fn json_defaults_fill_missing_fields() {
        let cfg = TypeConfig::from_json_str(r#"{"duration_with_nanos": true, "time_local_time_mode": "utc"}"#).unwrap();
        assert!(cfg.duration_with_nanos);
        assert_eq!(cfg.time_local_time_mode, Some(LocalTimeMode::Utc));
        assert_eq!(cfg.db_uuid, DbUuid::AutoVarchar);
        assert_eq!(cfg.platform, DatabasePlatform::generic());
        assert!(cfg.json_codec);
    }

    #[test]
    fn json_platform_block() {
        let cfg = TypeConfig::from_json_str(r#"{"platform": {"platform": "postgres", "clob_code": 12, "blob_code": -4, "boolean_code": 16, "native_uuid": true, "native_array": true}}"#).unwrap();
        assert!(cfg.platform.is_postgres());
        assert_eq!(cfg.platform.clob_code, WireCode::VARCHAR);
        assert!(TypeConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn env_overlay() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PLATFORM, "postgres"),
            (ENV_DB_UUID, "binary"),
            (ENV_JSON_DATETIME, "ISO8601"),
            (ENV_LOCAL_TIME_NANOS, "yes"),
            (ENV_TIME_LOCAL_TIME_MODE, "Normal"),
        ]);
        let cfg = TypeConfig::default().apply_vars(|k| vars.get(k).map(|s| s.to_string())).unwrap();
        assert!(cfg.platform.is_postgres());
        assert_eq!(cfg.db_uuid, DbUuid::Binary);
        assert_eq!(cfg.json_date_time, JsonDateTime::Iso8601);
        assert!(cfg.local_time_with_nanos);
        assert!(!cfg.duration_with_nanos);
        assert_eq!(cfg.time_local_time_mode, Some(LocalTimeMode::Normal));
    }

    #[test]
    fn env_rejects_bad_values() {
        let bad_platform = TypeConfig::default().apply_vars(|k| (k == ENV_PLATFORM).then(|| "db2".to_string()));
        assert_eq!(bad_platform.unwrap_err().code_str(), "config");
        let bad_flag = TypeConfig::default().apply_vars(|k| (k == ENV_DURATION_NANOS).then(|| "maybe".to_string()));
        assert!(bad_flag.is_err());
        let bad_mode = TypeConfig::default().apply_vars(|k| (k == ENV_TIME_LOCAL_TIME_MODE).then(|| "local".to_string()));
        assert!(bad_mode.is_err());
    }

    #[test]
    fn uuid_flags() {
        assert!(DbUuid::AutoBinary.use_native_type() && DbUuid::AutoBinary.use_binary());
        assert!(!DbUuid::Varchar.use_native_type() && !DbUuid::Varchar.use_binary());
    }
}
