//! Plugin loading: factory providers, custom scalar types and converter plugins.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use scalar_registry::config::TypeConfig;
use scalar_registry::provider::{ConverterPlugin, CustomScalarType, ProviderSources, TypeProvider};
use scalar_registry::scalar::json::{JsonCodec, JsonStorage, ScalarTypeJsonObject};
use scalar_registry::scalar::wrapper::{AttributeConverter, ValueConverter};
use scalar_registry::scalar::{DocPropertyType, ScalarTypeFn, ScalarTypeRef};
use scalar_registry::{DatabasePlatform, TypeKey, TypeManager, TypeResult, Value, WireCode};

/// Cents held as BIGINT.
struct Money;
/// Upper-cased code held as VARCHAR.
struct Ticker;
struct Unused;
struct Preferences;

fn tm() -> TypeManager { TypeManager::new(TypeConfig::for_platform(DatabasePlatform::postgres())).unwrap() }

fn ticker_entry() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<Ticker>(), WireCode::VARCHAR, DocPropertyType::Keyword, "ScalarTypeTicker",
        |v| match v { Value::Text(s) => Ok(Value::Text(s.to_ascii_uppercase())), o => Err(o) },
        |v| match v { Value::Text(_) => Ok(v), o => Err(o) }).with_length(8).into_ref()
}

struct TickerFactory;

impl TypeProvider for TickerFactory {
    fn name(&self) -> &str { "ticker-factory" }
    fn supply_entries(&self, _config: &TypeConfig, _codec: Option<&Arc<JsonCodec>>) -> Result<Vec<ScalarTypeRef>> {
        Ok(vec![ticker_entry()])
    }
}

struct UnusedFactory;

impl TypeProvider for UnusedFactory {
    fn name(&self) -> &str { "unused-factory" }
    fn supply_entries(&self, _config: &TypeConfig, _codec: Option<&Arc<JsonCodec>>) -> Result<Vec<ScalarTypeRef>> {
        Ok(vec![ScalarTypeFn::new(TypeKey::of::<Unused>(), WireCode::INTEGER, DocPropertyType::Integer, "ScalarTypeUnused",
            Ok, Ok).into_ref()])
    }
}

struct Broken;

impl CustomScalarType for Broken {
    fn name(&self) -> &str { "broken" }
    fn construct(&self) -> Result<ScalarTypeRef> { Err(anyhow!("missing native library")) }
}

struct TickerType;

impl CustomScalarType for TickerType {
    fn name(&self) -> &str { "ticker" }
    fn construct(&self) -> Result<ScalarTypeRef> { Ok(ticker_entry()) }
}

/// Prefers the codec-aware constructor; falls back to VARCHAR JSON without one.
struct PreferencesType;

impl CustomScalarType for PreferencesType {
    fn name(&self) -> &str { "preferences" }
    fn construct_with_codec(&self, codec: &Arc<JsonCodec>) -> Option<Result<ScalarTypeRef>> {
        Some(Ok(Arc::new(ScalarTypeJsonObject::new(TypeKey::of::<Preferences>(), JsonStorage::Jsonb, codec.clone()))))
    }
    fn construct(&self) -> Result<ScalarTypeRef> {
        Ok(Arc::new(ScalarTypeJsonObject::new(TypeKey::of::<Preferences>(), JsonStorage::Varchar, Arc::new(JsonCodec::new()))))
    }
}

#[derive(Debug)]
struct MoneyConverter;

impl ValueConverter for MoneyConverter {
    fn wrap(&self, persisted: Value) -> TypeResult<Value> {
        let cents = persisted.as_i64().unwrap_or_default();
        Ok(Value::Text(format!("{}.{:02}", cents / 100, cents % 100)))
    }
    fn unwrap(&self, logical: Value) -> TypeResult<Value> {
        let s = logical.as_str().unwrap_or("0");
        let (whole, frac) = s.split_once('.').unwrap_or((s, "0"));
        Ok(Value::I64(whole.parse::<i64>().unwrap_or(0) * 100 + frac.parse::<i64>().unwrap_or(0)))
    }
}

#[derive(Debug)]
struct YesNo;

impl AttributeConverter for YesNo {
    fn to_column(&self, attribute: Value) -> Result<Value> {
        match attribute {
            Value::Bool(b) => Ok(Value::Text(if b { "Y" } else { "N" }.into())),
            other => Err(anyhow!("expected a bool, got {:?}", other)),
        }
    }
    fn to_attribute(&self, column: Value) -> Result<Value> {
        match column.as_str() {
            Some("Y") => Ok(Value::Bool(true)),
            Some("N") => Ok(Value::Bool(false)),
            _ => Err(anyhow!("expected Y or N")),
        }
    }
}

struct Flag;

#[test]
fn only_first_factory_is_used() {
    let tm = tm();
    let sources = ProviderSources::new().factory(Box::new(TickerFactory)).factory(Box::new(UnusedFactory));
    let report = tm.load_providers(sources).unwrap();
    assert_eq!(report.registered, vec!["ticker-factory".to_string()]);
    assert_eq!(report.skipped, vec!["unused-factory".to_string()]);

    let e = tm.resolve_by_type(TypeKey::of::<Ticker>()).unwrap().unwrap();
    assert_eq!(e.to_wire(Value::Text("abc".into())).unwrap(), Value::Text("ABC".into()));
    assert!(tm.resolve_by_type(TypeKey::of::<Unused>()).unwrap().is_none());
    // factory entries go through register, so they also claim their wire code
    assert_eq!(tm.resolve_by_wire_code(WireCode::VARCHAR).unwrap().describe(), "ScalarTypeTicker");
}

#[test]
fn failing_custom_type_is_skipped() {
    let tm = tm();
    let sources = ProviderSources::new().scalar_type(Box::new(Broken)).scalar_type(Box::new(TickerType));
    let report = tm.load_providers(sources).unwrap();
    assert_eq!(report.skipped, vec!["broken".to_string()]);
    assert_eq!(report.registered, vec!["ticker".to_string()]);
    assert_eq!(tm.resolve_by_type(TypeKey::of::<Ticker>()).unwrap().unwrap().length(), 8);
}

#[test]
fn codec_aware_constructor_preferred() {
    let with_codec = tm();
    with_codec.load_providers(ProviderSources::new().scalar_type(Box::new(PreferencesType))).unwrap();
    assert_eq!(with_codec.resolve_by_type(TypeKey::of::<Preferences>()).unwrap().unwrap().wire_code(), WireCode::JSONB);

    let cfg = TypeConfig { json_codec: false, ..TypeConfig::for_platform(DatabasePlatform::postgres()) };
    let without = TypeManager::new(cfg).unwrap();
    without.load_providers(ProviderSources::new().scalar_type(Box::new(PreferencesType))).unwrap();
    assert_eq!(without.resolve_by_type(TypeKey::of::<Preferences>()).unwrap().unwrap().wire_code(), WireCode::VARCHAR);
}

#[test]
fn converters_wrap_the_persisted_entry() {
    let tm = tm();
    let sources = ProviderSources::new()
        .scalar_converter(ConverterPlugin::new("money", vec![TypeKey::of::<Money>(), TypeKey::of::<i64>()], || {
            let c: Arc<dyn ValueConverter> = Arc::new(MoneyConverter);
            Ok(c)
        }))
        .attribute_converter(ConverterPlugin::attribute("yes-no", vec![TypeKey::of::<Flag>(), TypeKey::of::<String>()], || Ok(YesNo)));
    let report = tm.load_providers(sources).unwrap();
    assert_eq!(report.registered, vec!["money".to_string(), "yes-no".to_string()]);

    let money = tm.resolve_by_type(TypeKey::of::<Money>()).unwrap().unwrap();
    assert_eq!((money.wire_code(), money.describe()), (WireCode::BIGINT, "ScalarTypeWrapper"));
    let wire = money.to_wire(Value::Text("12.34".into())).unwrap();
    assert_eq!(wire, Value::I64(1234));
    assert_eq!(money.from_wire(wire).unwrap(), Value::Text("12.34".into()));
    // wrappers stay out of the wire index
    assert_eq!(tm.resolve_by_wire_code(WireCode::BIGINT).unwrap().app_type(), TypeKey::of::<i64>());

    let flag = tm.resolve_by_type(TypeKey::of::<Flag>()).unwrap().unwrap();
    assert_eq!(flag.to_wire(Value::Bool(true)).unwrap(), Value::Text("Y".into()));
    assert_eq!(flag.from_wire(Value::Text("N".into())).unwrap(), Value::Bool(false));
    assert_eq!(flag.to_wire(Value::I32(1)).unwrap_err().code_str(), "conversion");
}

#[test]
fn converter_with_wrong_type_params_aborts_load() {
    let tm = tm();
    let bad = ConverterPlugin::attribute("half", vec![TypeKey::of::<Flag>()], || Ok(YesNo));
    let err = tm.load_providers(ProviderSources::new().attribute_converter(bad)).unwrap_err();
    assert_eq!(err.code_str(), "plugin_contract");
    assert!(err.message().contains("half"), "{}", err.message());
}

#[test]
fn converter_to_unregistered_type_aborts_load() {
    let tm = tm();
    let bad = ConverterPlugin::attribute("orphan", vec![TypeKey::of::<Flag>(), TypeKey::of::<Unused>()], || Ok(YesNo));
    let err = tm.load_providers(ProviderSources::new().attribute_converter(bad)).unwrap_err();
    assert_eq!(err.code_str(), "plugin_contract");
    assert!(tm.resolve_by_type(TypeKey::of::<Flag>()).unwrap().is_none());
}

#[test]
fn failing_converter_constructor_is_skipped() {
    let tm = tm();
    let sources = ProviderSources::new()
        .attribute_converter(ConverterPlugin::attribute("flaky", vec![TypeKey::of::<Flag>(), TypeKey::of::<String>()], || -> Result<YesNo> {
            Err(anyhow!("no license"))
        }))
        .scalar_converter(ConverterPlugin::new("money", vec![TypeKey::of::<Money>(), TypeKey::of::<i64>()], || {
            let c: Arc<dyn ValueConverter> = Arc::new(MoneyConverter);
            Ok(c)
        }));
    let report = tm.load_providers(sources).unwrap();
    assert_eq!(report.skipped, vec!["flaky".to_string()]);
    assert_eq!(report.registered, vec!["money".to_string()]);
    assert!(tm.resolve_by_type(TypeKey::of::<Flag>()).unwrap().is_none());
}
