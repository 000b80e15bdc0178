//! FULL mode: leaf validation through the project's own configuration provider.
//!
//! The provider is discovered from the project artifacts:
//!
//! 1. a default resolver (`io.smallrye.config.SmallRyeConfigProviderResolver`)
//!    whose symbol resolves in the artifacts and that the [`ResolverCatalog`]
//!    knows how to build;
//! 2. otherwise the first usable name listed in a
//!    `META-INF/services/...ConfigProviderResolver` resource;
//! 3. otherwise nothing, and the runtime falls back to SAFE.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::baseline::Baseline;
use super::declared::DeclaredConverter;
use super::support::BackingConfiguration;
use super::{ConversionError, Converter, ConverterValidator, SharedValidator};
use crate::diagnostic::{report, DiagnosticsCollector};
use crate::error::RuntimeError;
use crate::loader::ArtifactLoader;
use crate::mode::ExecutionMode;
use crate::obs;

/// Resolver names tried before any service resource.
pub const DEFAULT_RESOLVERS: &[&str] = &["io.smallrye.config.SmallRyeConfigProviderResolver"];

/// Service resource listing config provider resolvers.
pub const RESOLVER_SERVICE: &str =
    "META-INF/services/org.eclipse.microprofile.config.spi.ConfigProviderResolver";

/// Service resource listing project converters.
pub const CONVERTER_SERVICE: &str = "META-INF/services/org.eclipse.microprofile.config.spi.Converter";

/// Outcome of asking a host configuration for a converter.
///
/// Host implementations answer in one of two call shapes: an optional
/// wrapper around the converter, or the converter itself.
#[derive(Debug, Clone)]
pub enum ConverterLookup {
    Wrapped(Option<Arc<dyn Converter>>),
    Direct(Arc<dyn Converter>),
    /// The host cannot answer at all (missing method, wrong signature).
    Unsupported(String),
}

/// A configuration instance built from the project's provider.
pub trait HostConfig: Send + Sync + fmt::Debug {
    fn converter_for(&self, type_name: &str) -> ConverterLookup;
}

/// Builds a [`HostConfig`] for one resolver implementation.
pub trait ConfigProviderResolver: Send + Sync {
    /// Qualified name the resolver is listed under in artifacts.
    fn name(&self) -> &str;

    fn build(&self, loader: &ArtifactLoader) -> Result<Arc<dyn HostConfig>, RuntimeError>;
}

/// Resolver implementations the engine can instantiate, by name.
#[derive(Clone, Default)]
pub struct ResolverCatalog {
    resolvers: HashMap<String, Arc<dyn ConfigProviderResolver>>,
}

impl ResolverCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in SmallRye-style resolver.
    pub fn standard() -> Self {
        Self::new().with_resolver(Arc::new(SmallRyeResolver))
    }

    pub fn register(&mut self, resolver: Arc<dyn ConfigProviderResolver>) {
        self.resolvers.insert(resolver.name().to_string(), resolver);
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ConfigProviderResolver>) -> Self {
        self.register(resolver);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ConfigProviderResolver>> {
        self.resolvers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ResolverCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverCatalog")
            .field("resolvers", &self.names())
            .finish()
    }
}

/// Names listed in a service resource: one per line, `#` starts a comment.
pub fn parse_service_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every name listed in every copy of `resource`, in loader order.
fn service_names(loader: &ArtifactLoader, resource: &str) -> Vec<String> {
    let mut names = Vec::new();
    for location in loader.find_resources(resource) {
        match loader.read_resource(&location) {
            Ok(bytes) => names.extend(parse_service_names(&String::from_utf8_lossy(&bytes))),
            Err(e) => debug!(resource = %resource, error = %e, "skipping unreadable service resource"),
        }
    }
    names
}

/// Pick the resolver for the current artifacts.
pub fn discover_resolver(
    loader: &ArtifactLoader,
    catalog: &ResolverCatalog,
) -> Option<Arc<dyn ConfigProviderResolver>> {
    for name in DEFAULT_RESOLVERS {
        if loader.resolve(name).is_none() {
            continue;
        }
        if let Some(resolver) = catalog.get(name) {
            obs::emit_config_resolver_selected(name, "default");
            return Some(resolver);
        }
        debug!(resolver = %name, "default resolver present but not instantiable");
    }

    for name in service_names(loader, RESOLVER_SERVICE) {
        if loader.resolve(&name).is_none() {
            debug!(resolver = %name, "listed resolver is not in the artifacts");
            continue;
        }
        match catalog.get(&name) {
            Some(resolver) => {
                obs::emit_config_resolver_selected(&name, "service");
                return Some(resolver);
            }
            None => debug!(resolver = %name, "listed resolver is not instantiable"),
        }
    }

    obs::emit_no_config_resolver();
    None
}

/// Configuration built by [`SmallRyeResolver`]: discovered project
/// converters first, then the baseline.
#[derive(Debug)]
pub struct DiscoveredConfig {
    discovered: HashMap<String, Arc<dyn Converter>>,
    baseline: Baseline,
}

impl DiscoveredConfig {
    pub fn new(baseline: Baseline) -> Self {
        Self {
            discovered: HashMap::new(),
            baseline,
        }
    }

    /// Register a converter for `target`. The first registration wins.
    pub fn add_converter(&mut self, target: impl Into<String>, converter: Arc<dyn Converter>) -> bool {
        let target = target.into();
        if self.discovered.contains_key(&target) {
            return false;
        }
        self.discovered.insert(target, converter);
        true
    }

    /// Register every converter listed in the project's converter service
    /// resources. Unusable entries are skipped. Returns how many were added.
    pub fn add_discovered_converters(&mut self, loader: &ArtifactLoader) -> usize {
        let mut added = 0;
        for name in service_names(loader, CONVERTER_SERVICE) {
            let Some(symbol) = loader.resolve(&name) else {
                debug!(converter = %name, "listed converter is not in the artifacts");
                continue;
            };
            let Some(declaration) = &symbol.converter else {
                debug!(converter = %name, "listed symbol declares no converter");
                continue;
            };
            match DeclaredConverter::compile(&symbol.name, declaration) {
                Ok(converter) => {
                    let target = converter.target().to_string();
                    if self.add_converter(target, Arc::new(converter)) {
                        added += 1;
                    }
                }
                Err(e) => debug!(converter = %name, error = %e, "skipping converter"),
            }
        }
        added
    }

    pub fn discovered_targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = self.discovered.keys().map(String::as_str).collect();
        targets.sort_unstable();
        targets
    }
}

impl HostConfig for DiscoveredConfig {
    fn converter_for(&self, type_name: &str) -> ConverterLookup {
        let converter = self
            .discovered
            .get(type_name)
            .cloned()
            .or_else(|| self.baseline.get(type_name));
        ConverterLookup::Wrapped(converter)
    }
}

/// Built-in resolver registered under the SmallRye resolver name.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallRyeResolver;

impl ConfigProviderResolver for SmallRyeResolver {
    fn name(&self) -> &str {
        DEFAULT_RESOLVERS[0]
    }

    fn build(&self, loader: &ArtifactLoader) -> Result<Arc<dyn HostConfig>, RuntimeError> {
        let mut config = DiscoveredConfig::new(Baseline::standard());
        let added = config.add_discovered_converters(loader);
        debug!(resolver = %self.name(), converters = added, "built discovered config");
        Ok(Arc::new(config))
    }
}

/// How a prepared validator reached its converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Wrapped,
    Direct,
}

/// Leaf validator over a converter obtained from the host configuration.
#[derive(Debug)]
pub struct FullValidator {
    type_name: String,
    prepared: Option<(Arc<dyn Converter>, CallShape)>,
}

impl FullValidator {
    /// Ask `config` for a converter for `type_name`.
    pub fn prepare(config: &dyn HostConfig, type_name: &str) -> Self {
        let prepared = match config.converter_for(type_name) {
            ConverterLookup::Wrapped(Some(converter)) => Some((converter, CallShape::Wrapped)),
            ConverterLookup::Wrapped(None) => None,
            ConverterLookup::Direct(converter) => Some((converter, CallShape::Direct)),
            ConverterLookup::Unsupported(reason) => {
                obs::emit_converter_unavailable(type_name, &reason);
                None
            }
        };
        Self {
            type_name: type_name.to_string(),
            prepared,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn call_shape(&self) -> Option<CallShape> {
        self.prepared.as_ref().map(|(_, shape)| *shape)
    }
}

impl ConverterValidator for FullValidator {
    fn can_validate(&self) -> bool {
        self.prepared.is_some()
    }

    fn validate(&self, value: &str, start: usize, collector: &mut dyn DiagnosticsCollector) {
        let Some((converter, _)) = &self.prepared else {
            return;
        };
        if let Err(e) = converter.convert(value).map_err(ConversionError::invocation) {
            report(collector, e.message(), value, start);
        }
    }

    fn converter_name(&self) -> Option<String> {
        self.prepared
            .as_ref()
            .map(|(converter, _)| converter.name().to_string())
    }
}

/// Backing configuration for FULL mode.
#[derive(Debug, Clone)]
pub struct FullBacking {
    catalog: Arc<ResolverCatalog>,
}

impl FullBacking {
    pub fn new(catalog: Arc<ResolverCatalog>) -> Self {
        Self { catalog }
    }
}

impl Default for FullBacking {
    fn default() -> Self {
        Self::new(Arc::new(ResolverCatalog::standard()))
    }
}

impl BackingConfiguration for FullBacking {
    type Config = dyn HostConfig;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Full
    }

    fn load(&self, loader: &ArtifactLoader) -> Option<Arc<dyn HostConfig>> {
        let resolver = discover_resolver(loader, &self.catalog)?;
        match resolver.build(loader) {
            Ok(config) => Some(config),
            Err(e) => {
                obs::emit_config_build_failed(resolver.name(), &e);
                None
            }
        }
    }

    fn leaf_validator(&self, config: &dyn HostConfig, type_name: &str) -> SharedValidator {
        Arc::new(FullValidator::prepare(config, type_name))
    }
}
