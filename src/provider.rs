//! Plugin loading.
//!
//! The host hands over its plugins explicitly in a `ProviderSources`; nothing is discovered.
//! Construction failures are isolated per plugin (logged and skipped). Broken converter
//! contracts abort the load.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::TypeConfig;
use crate::error::{TypeError, TypeResult};
use crate::manager::TypeManager;
use crate::scalar::json::JsonCodec;
use crate::scalar::wrapper::{AttributeConverter, AttributeConverterAdapter, ScalarTypeWrapper, ValueConverter};
use crate::scalar::ScalarTypeRef;
use crate::value::TypeKey;

/// Supplies a batch of entries built from the registry configuration.
pub trait TypeProvider: Send + Sync {
    fn name(&self) -> &str;
    fn supply_entries(&self, config: &TypeConfig, codec: Option<&Arc<JsonCodec>>) -> anyhow::Result<Vec<ScalarTypeRef>>;
}

/// A single application-defined entry.
pub trait CustomScalarType: Send + Sync {
    fn name(&self) -> &str;

    /// Codec-aware constructor; `None` when the plugin does not offer one.
    fn construct_with_codec(&self, _codec: &Arc<JsonCodec>) -> Option<anyhow::Result<ScalarTypeRef>> { None }

    fn construct(&self) -> anyhow::Result<ScalarTypeRef>;
}

type ConverterCtor = Box<dyn Fn() -> anyhow::Result<Arc<dyn ValueConverter>> + Send + Sync>;

/// A converter plugin: its declared type parameters (logical, persisted) and a constructor.
pub struct ConverterPlugin {
    name: String,
    type_params: Vec<TypeKey>,
    ctor: ConverterCtor,
}

impl ConverterPlugin {
    pub fn new<S, F>(name: S, type_params: Vec<TypeKey>, ctor: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> anyhow::Result<Arc<dyn ValueConverter>> + Send + Sync + 'static,
    {
        Self { name: name.into(), type_params, ctor: Box::new(ctor) }
    }

    /// Attribute converter, adapted to the value converter contract.
    pub fn attribute<S, C, F>(name: S, type_params: Vec<TypeKey>, ctor: F) -> Self
    where
        S: Into<String>,
        C: AttributeConverter + 'static,
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let name = name.into();
        let adapter_name = name.clone();
        Self::new(name, type_params, move || {
            let c: Arc<dyn ValueConverter> = Arc::new(AttributeConverterAdapter::new(adapter_name.clone(), ctor()?));
            Ok(c)
        })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn type_params(&self) -> &[TypeKey] { &self.type_params }
}

impl std::fmt::Debug for ConverterPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterPlugin").field("name", &self.name).field("type_params", &self.type_params).finish()
    }
}

#[derive(Default)]
pub struct ProviderSources {
    pub factories: Vec<Box<dyn TypeProvider>>,
    pub scalar_types: Vec<Box<dyn CustomScalarType>>,
    pub scalar_converters: Vec<ConverterPlugin>,
    pub attribute_converters: Vec<ConverterPlugin>,
}

impl ProviderSources {
    pub fn new() -> Self { Self::default() }
    pub fn factory(mut self, p: Box<dyn TypeProvider>) -> Self { self.factories.push(p); self }
    pub fn scalar_type(mut self, p: Box<dyn CustomScalarType>) -> Self { self.scalar_types.push(p); self }
    pub fn scalar_converter(mut self, p: ConverterPlugin) -> Self { self.scalar_converters.push(p); self }
    pub fn attribute_converter(mut self, p: ConverterPlugin) -> Self { self.attribute_converters.push(p); self }
}

/// Plugin names by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    pub registered: Vec<String>,
    pub skipped: Vec<String>,
}

pub(crate) fn load(manager: &TypeManager, sources: ProviderSources) -> TypeResult<LoadReport> {
    let mut report = LoadReport::default();
    let codec = manager.codec();

    let mut factories = sources.factories.into_iter();
    if let Some(factory) = factories.next() {
        match factory.supply_entries(manager.config(), codec.as_ref()) {
            Ok(entries) => {
                debug!(target: "scalar_registry::provider", "factory {} supplied {} entries", factory.name(), entries.len());
                for e in entries { manager.register(e); }
                report.registered.push(factory.name().to_string());
            }
            Err(e) => {
                error!(target: "scalar_registry::provider", "factory {} failed: {:#}", factory.name(), e);
                report.skipped.push(factory.name().to_string());
            }
        }
    }
    for extra in factories {
        warn!(target: "scalar_registry::provider", "ignoring extra type provider {}; only the first is used", extra.name());
        report.skipped.push(extra.name().to_string());
    }

    for plugin in sources.scalar_types {
        let built = match codec.as_ref().and_then(|c| plugin.construct_with_codec(c)) {
            Some(r) => r,
            None => plugin.construct(),
        };
        match built {
            Ok(entry) => {
                debug!(target: "scalar_registry::provider", "custom scalar type {} -> {}", plugin.name(), entry.app_type().name());
                manager.register(entry);
                report.registered.push(plugin.name().to_string());
            }
            Err(e) => {
                let err = TypeError::plugin_construction(plugin.name(), format!("{:#}", e));
                error!(target: "scalar_registry::provider", "{}", err);
                report.skipped.push(plugin.name().to_string());
            }
        }
    }

    for plugin in sources.scalar_converters.iter().chain(sources.attribute_converters.iter()) {
        load_converter(manager, plugin, &mut report)?;
    }
    Ok(report)
}

fn load_converter(manager: &TypeManager, plugin: &ConverterPlugin, report: &mut LoadReport) -> TypeResult<()> {
    let [logical, persisted] = plugin.type_params() else {
        return Err(TypeError::plugin_contract(plugin.name(), format!(
            "converter {} must declare exactly two type parameters (logical, persisted), found {}", plugin.name(), plugin.type_params().len())));
    };
    let inner = manager.resolve_by_type(*persisted)?.ok_or_else(|| TypeError::plugin_contract(plugin.name(), format!(
        "converter {} persists to {} which has no registered scalar type", plugin.name(), persisted.name())))?;
    match (plugin.ctor)() {
        Ok(conv) => {
            debug!(target: "scalar_registry::provider", "converter {} maps {} via {}", plugin.name(), logical.name(), persisted.name());
            manager.put_type(Arc::new(ScalarTypeWrapper::new(*logical, inner, conv)));
            report.registered.push(plugin.name().to_string());
        }
        Err(e) => {
            error!(target: "scalar_registry::provider", "converter {} failed to construct: {:#}", plugin.name(), e);
            report.skipped.push(plugin.name().to_string());
        }
    }
    Ok(())
}
