//! convcheck core library
//!
//! Resolves textual type signatures to converter validators and checks
//! configuration values against them, in one of two trust modes:
//!
//! * **SAFE** uses only the embedded baseline converters.
//! * **FULL** loads the project's compiled artifacts and the converters
//!   registered by the project's own configuration provider.
//!
//! The entry point is [`ProjectRuntime`].

pub mod converter;
pub mod diagnostic;
pub mod enums;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod mode;
pub mod notifier;
pub mod obs;
pub mod provider;
pub mod runtime;
pub mod settings;
pub mod signature;
pub mod telemetry;

pub use converter::{
    Baseline, ConversionError, Converter, ConverterValidator, NullValidator, SharedValidator,
};

pub use diagnostic::{
    CallbackCollector, Diagnostic, DiagnosticsCollector, DIAGNOSTIC_SOURCE, VALUE_ERROR_CODE,
};

pub use enums::{EnumConstantsProvider, SimpleEnumConstantsProvider};
pub use error::{LoaderError, Result, RuntimeError, TypeSignatureError};

pub use loader::{
    ArchiveIndex, ArtifactLoader, HostSymbols, ResourceLocation, SymbolDescriptor, SymbolKind,
};

pub use mode::ExecutionMode;
pub use notifier::ArtifactChangeNotifier;
pub use provider::{
    Capability, ConverterSupport, RuntimeSupport, RuntimeSupportProvider, SupportRegistry,
};
pub use runtime::{ProjectRuntime, ProjectRuntimeBuilder, TypeResolver};
pub use settings::EngineSettings;
pub use signature::{EnumType, LeafOrigin, LeafType, TypeDescriptor, TypeSignatureParser};
pub use telemetry::init_tracing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
