//! The per-project root: artifact set, loader and runtime-support registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::converter::{
    ConfigProviderResolver, ConverterRuntimeSupport, FullBacking, ResolverCatalog, SafeBacking,
    SharedValidator,
};
use crate::diagnostic::DiagnosticsCollector;
use crate::enums::EnumConstantsProvider;
use crate::error::TypeSignatureError;
use crate::loader::{ArtifactLoader, HostSymbols, SharedLoader};
use crate::metrics::METRICS;
use crate::mode::ExecutionMode;
use crate::obs::{self, ValidationSpan};
use crate::provider::{Capability, RuntimeSupport, RuntimeSupportProvider, SupportRegistry};
use crate::settings::EngineSettings;
use crate::signature::{TypeDescriptor, TypeSignatureParser};

/// Signature-to-descriptor resolution over the current loader.
///
/// Cheap to clone; every clone sees loader swaps made through any other.
#[derive(Clone, Debug)]
pub struct TypeResolver {
    loader: SharedLoader,
}

impl TypeResolver {
    pub fn new<I, P>(host: Arc<HostSymbols>, artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let loader = ArtifactLoader::new(artifacts, host);
        Self {
            loader: Arc::new(RwLock::new(Arc::new(loader))),
        }
    }

    /// Snapshot of the current loader.
    pub fn loader(&self) -> Arc<ArtifactLoader> {
        self.loader.read().clone()
    }

    /// Build a loader over `artifacts` (same host) and make it current.
    pub fn replace_artifacts<I, P>(&self, artifacts: I) -> Arc<ArtifactLoader>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let host = self.loader().host().clone();
        let loader = Arc::new(ArtifactLoader::new(artifacts, host));
        *self.loader.write() = loader.clone();
        loader
    }

    /// Parse `signature` for `mode`. SAFE resolves leaves against the host
    /// tier only; FULL goes through the whole parent-last chain.
    pub fn find_type(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        mode: ExecutionMode,
    ) -> Result<TypeDescriptor, TypeSignatureError> {
        let loader = self.loader();
        match mode {
            ExecutionMode::Safe => {
                TypeSignatureParser::parse(signature, provider, &**loader.host())
            }
            ExecutionMode::Full => TypeSignatureParser::parse(signature, provider, &*loader),
        }
    }
}

/// Builder for [`ProjectRuntime`].
pub struct ProjectRuntimeBuilder {
    artifacts: Vec<PathBuf>,
    host: HostSymbols,
    catalog: ResolverCatalog,
    providers: Vec<Arc<dyn RuntimeSupportProvider>>,
}

impl Default for ProjectRuntimeBuilder {
    fn default() -> Self {
        Self {
            artifacts: Vec::new(),
            host: HostSymbols::platform(),
            catalog: ResolverCatalog::standard(),
            providers: Vec::new(),
        }
    }
}

impl ProjectRuntimeBuilder {
    pub fn artifacts<I, P>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.artifacts.extend(artifacts.into_iter().map(Into::into));
        self
    }

    pub fn artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifacts.push(artifact.into());
        self
    }

    /// Replace the host tier (defaults to [`HostSymbols::platform`]).
    pub fn host(mut self, host: HostSymbols) -> Self {
        self.host = host;
        self
    }

    /// Replace the resolver catalog (defaults to [`ResolverCatalog::standard`]).
    pub fn resolver_catalog(mut self, catalog: ResolverCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Add one resolver to the catalog.
    pub fn resolver(mut self, resolver: Arc<dyn ConfigProviderResolver>) -> Self {
        self.catalog.register(resolver);
        self
    }

    /// Inject a provider of extra runtime supports.
    pub fn provider(mut self, provider: Arc<dyn RuntimeSupportProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> ProjectRuntime {
        let types = TypeResolver::new(Arc::new(self.host), &self.artifacts);
        let mut registry = SupportRegistry::new();

        for provider in &self.providers {
            registry.register_provider(provider.as_ref(), &types);
        }
        registry.register(Arc::new(ConverterRuntimeSupport::new(SafeBacking, types.clone())));
        registry.register(Arc::new(ConverterRuntimeSupport::new(
            FullBacking::new(Arc::new(self.catalog)),
            types.clone(),
        )));

        ProjectRuntime {
            types,
            registry,
            artifacts: RwLock::new(self.artifacts),
        }
    }
}

/// Entry point for validating property values of one project.
///
/// All methods take `&self` and may be called from many threads at once.
#[derive(Debug)]
pub struct ProjectRuntime {
    types: TypeResolver,
    registry: SupportRegistry,
    artifacts: RwLock<Vec<PathBuf>>,
}

impl ProjectRuntime {
    pub fn builder() -> ProjectRuntimeBuilder {
        ProjectRuntimeBuilder::default()
    }

    /// Runtime over `artifacts` with the default host and resolvers.
    pub fn new<I, P>(artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::builder().artifacts(artifacts).build()
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.artifacts.iter().cloned())
    }

    /// Validate `value` against `signature`, reporting through `collector`.
    ///
    /// Uses `preferred_mode` when it has a usable backing configuration and
    /// SAFE otherwise. Never fails: unknown types and malformed signatures
    /// produce no diagnostics.
    pub fn validate_value(
        &self,
        value: &str,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        preferred_mode: ExecutionMode,
        collector: &mut dyn DiagnosticsCollector,
    ) {
        let _span = ValidationSpan::enter(signature, preferred_mode);
        METRICS.inc_values_validated();

        let Some(support) = self.converter_support(preferred_mode) else {
            return;
        };
        let Some(converter) = support.as_converter_support() else {
            return;
        };
        let mut counting = CountingCollector {
            inner: collector,
            reported: 0,
        };
        converter.validate(value, signature, provider, &mut counting);
        METRICS.add_diagnostics(counting.reported);
    }

    /// The validator `validate_value` would use, with the same mode fallback.
    pub fn find_converter_validator(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        preferred_mode: ExecutionMode,
    ) -> Option<SharedValidator> {
        let support = self.converter_support(preferred_mode)?;
        support.as_converter_support()?.find_validator(signature, provider)
    }

    /// Short converter name for `signature`, e.g. `IntegerConverter`.
    pub fn find_converter_description(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        preferred_mode: ExecutionMode,
    ) -> Option<String> {
        self.find_converter_validator(signature, provider, preferred_mode)
            .filter(|validator| validator.can_validate())
            .and_then(|validator| validator.converter_simple_name())
    }

    /// Parse `signature` the way `mode` would.
    pub fn find_type(
        &self,
        signature: &str,
        provider: Option<&dyn EnumConstantsProvider>,
        mode: ExecutionMode,
    ) -> Result<TypeDescriptor, TypeSignatureError> {
        self.types.find_type(signature, provider, mode)
    }

    /// Replace the artifact set: rebuild the loader, then reset every support.
    pub fn update_artifact_set<I, P>(&self, artifacts: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let artifacts: Vec<PathBuf> = artifacts.into_iter().map(Into::into).collect();
        let loader = self.types.replace_artifacts(&artifacts);
        *self.artifacts.write() = artifacts;
        self.registry.reset_all();

        METRICS.inc_artifact_updates();
        obs::emit_artifact_set_updated(loader.directory_roots().len(), loader.archive_roots().len());
    }

    /// Drop cached symbols of the current loader. Validators are kept.
    pub fn clear_artifact_cache(&self) {
        self.types.loader().clear_cache();
    }

    pub fn artifact_set(&self) -> Vec<PathBuf> {
        self.artifacts.read().clone()
    }

    pub fn loader(&self) -> Arc<ArtifactLoader> {
        self.types.loader()
    }

    pub fn type_resolver(&self) -> &TypeResolver {
        &self.types
    }

    pub fn support(&self, capability: &Capability, mode: ExecutionMode) -> Option<Arc<dyn RuntimeSupport>> {
        self.registry.get(capability, mode)
    }

    /// Whether `mode` can currently validate with its own configuration.
    pub fn has_usable_backing_configuration(&self, mode: ExecutionMode) -> bool {
        self.registry
            .get(&Capability::ConverterValidation, mode)
            .and_then(|support| {
                support
                    .as_converter_support()
                    .map(|converter| converter.has_usable_backing_configuration())
            })
            .unwrap_or(false)
    }

    fn converter_support(&self, preferred: ExecutionMode) -> Option<Arc<dyn RuntimeSupport>> {
        if preferred != ExecutionMode::Safe {
            if self.has_usable_backing_configuration(preferred) {
                return self.registry.get(&Capability::ConverterValidation, preferred);
            }
            METRICS.inc_safe_fallbacks();
            obs::emit_safe_fallback(preferred);
        }
        self.registry
            .get(&Capability::ConverterValidation, ExecutionMode::Safe)
    }
}

struct CountingCollector<'a> {
    inner: &'a mut dyn DiagnosticsCollector,
    reported: u64,
}

impl DiagnosticsCollector for CountingCollector<'_> {
    fn collect(&mut self, message: &str, source: &str, code: &str, start: usize, end: usize) {
        self.reported += 1;
        self.inner.collect(message, source, code, start, end);
    }
}
