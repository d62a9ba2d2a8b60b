//! Unified error model for type registration and resolution.
//! Every variant carries a stable code string so callers (SQL frontends, HTTP, pgwire)
//! can map failures without matching on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wire::WireCode;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeError {
    /// A type needs an explicit storage mode setting that was never supplied.
    #[error("missing_mode: {message}")]
    MissingMode { type_name: String, message: String },
    /// No registered or derivable entry for the (type, wire code) pair.
    #[error("unmatched_type: Unmatched ScalarType for {type_name} wire code:{code}")]
    Unmatched { type_name: String, code: i32 },
    #[error("unsupported_shape: {message}")]
    UnsupportedShape { shape: String, message: String },
    #[error("plugin_construction: {message}")]
    PluginConstruction { plugin: String, message: String },
    #[error("plugin_contract: {message}")]
    PluginContract { plugin: String, message: String },
    #[error("conversion: {message}")]
    Conversion { type_name: String, message: String },
    #[error("enum_mapping: {message}")]
    EnumMapping { enum_name: String, message: String },
    #[error("config: {message}")]
    Config { message: String },
}

impl TypeError {
    pub fn code_str(&self) -> &'static str {
        match self {
            TypeError::MissingMode { .. } => "missing_mode",
            TypeError::Unmatched { .. } => "unmatched_type",
            TypeError::UnsupportedShape { .. } => "unsupported_shape",
            TypeError::PluginConstruction { .. } => "plugin_construction",
            TypeError::PluginContract { .. } => "plugin_contract",
            TypeError::Conversion { .. } => "conversion",
            TypeError::EnumMapping { .. } => "enum_mapping",
            TypeError::Config { .. } => "config",
        }
    }

    pub fn message(&self) -> String {
        match self {
            TypeError::Unmatched { type_name, code } => {
                format!("Unmatched ScalarType for {} wire code:{}", type_name, code)
            }
            TypeError::MissingMode { message, .. }
            | TypeError::UnsupportedShape { message, .. }
            | TypeError::PluginConstruction { message, .. }
            | TypeError::PluginContract { message, .. }
            | TypeError::Conversion { message, .. }
            | TypeError::EnumMapping { message, .. }
            | TypeError::Config { message } => message.clone(),
        }
    }

    pub fn missing_mode<A: Into<String>, B: Into<String>>(type_name: A, msg: B) -> Self { TypeError::MissingMode { type_name: type_name.into(), message: msg.into() } }
    pub fn unmatched<S: Into<String>>(type_name: S, code: WireCode) -> Self { TypeError::Unmatched { type_name: type_name.into(), code: code.0 } }
    pub fn unsupported_shape<A: Into<String>, B: Into<String>>(shape: A, msg: B) -> Self { TypeError::UnsupportedShape { shape: shape.into(), message: msg.into() } }
    pub fn plugin_construction<A: Into<String>, B: Into<String>>(plugin: A, msg: B) -> Self { TypeError::PluginConstruction { plugin: plugin.into(), message: msg.into() } }
    pub fn plugin_contract<A: Into<String>, B: Into<String>>(plugin: A, msg: B) -> Self { TypeError::PluginContract { plugin: plugin.into(), message: msg.into() } }
    pub fn conversion<A: Into<String>, B: Into<String>>(type_name: A, msg: B) -> Self { TypeError::Conversion { type_name: type_name.into(), message: msg.into() } }
    pub fn enum_mapping<A: Into<String>, B: Into<String>>(enum_name: A, msg: B) -> Self { TypeError::EnumMapping { enum_name: enum_name.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { TypeError::Config { message: msg.into() } }

    /// Startup-time failures are isolated per plugin; everything else is fatal to the caller.
    pub fn is_skippable(&self) -> bool {
        matches!(self, TypeError::PluginConstruction { .. })
    }

    /// Pgwire mapping: SQLSTATE for frontends that surface resolution failures to clients.
    pub fn sqlstate(&self) -> &'static str {
        match self {
            TypeError::MissingMode { .. } | TypeError::Config { .. } => "F0000", // config_file_error
            TypeError::Unmatched { .. } => "42804",                             // datatype_mismatch
            TypeError::UnsupportedShape { .. } => "0A000",                      // feature_not_supported
            TypeError::Conversion { .. } => "22000",                            // data exception
            TypeError::EnumMapping { .. } => "22023",                           // invalid_parameter_value
            TypeError::PluginConstruction { .. } | TypeError::PluginContract { .. } => "XX000", // internal_error
        }
    }
}

pub type TypeResult<T> = Result<T, TypeError>;

impl From<anyhow::Error> for TypeError {
    fn from(err: anyhow::Error) -> Self {
        // Plugins report failures through anyhow; treat as construction failures unless mapped earlier
        TypeError::PluginConstruction { plugin: "unknown".into(), message: format!("{:#}", err) }
    }
}
