//! Transform pipeline
//!
//! parse → classify → identity/snapshot → patch → source map, one file at a
//! time. A `Transformer` holds only read-only configuration, so one instance
//! can serve any number of threads.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_sourcemap::SourceMap;
use std::fmt;
use tracing::{debug, trace, warn};

use crate::classify::classify;
#[cfg(feature = "napi")]
use crate::config::HostOptions;
use crate::config::TransformConfig;
use crate::error::Result;
use crate::identity::IdentityBuilder;
use crate::patch::PatchSet;
use crate::source::SourceUnit;
use crate::sourcemap::build_source_map;
use crate::syntax::{OxcSyntaxProvider, SyntaxProvider};

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

pub enum TransformResult {
    /// No element qualified; the caller should keep the original text.
    Unchanged,
    Transformed(TransformOutput),
}

impl TransformResult {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, TransformResult::Unchanged)
    }

    pub fn output(&self) -> Option<&TransformOutput> {
        match self {
            TransformResult::Unchanged => None,
            TransformResult::Transformed(output) => Some(output),
        }
    }

    pub fn into_output(self) -> Option<TransformOutput> {
        match self {
            TransformResult::Unchanged => None,
            TransformResult::Transformed(output) => Some(output),
        }
    }

    pub fn elements_tagged(&self) -> usize {
        self.output().map_or(0, |output| output.elements_tagged)
    }
}

impl fmt::Debug for TransformResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformResult::Unchanged => f.write_str("Unchanged"),
            TransformResult::Transformed(output) => {
                f.debug_tuple("Transformed").field(output).finish()
            }
        }
    }
}

pub struct TransformOutput {
    pub code: String,
    pub map: SourceMap,
    pub elements_tagged: usize,
}

impl fmt::Debug for TransformOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOutput")
            .field("code", &self.code)
            .field("elements_tagged", &self.elements_tagged)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Transformer<P = OxcSyntaxProvider> {
    provider: P,
    config: TransformConfig,
}

impl Transformer<OxcSyntaxProvider> {
    pub fn new(config: TransformConfig) -> Self {
        Self::with_provider(OxcSyntaxProvider, config)
    }
}

impl<P: SyntaxProvider> Transformer<P> {
    pub fn with_provider(provider: P, config: TransformConfig) -> Self {
        Transformer { provider, config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Like `try_transform`, but a file that cannot be processed is logged
    /// and reported as unchanged.
    pub fn transform(&self, source: &str, path: &str) -> TransformResult {
        match self.try_transform(source, path) {
            Ok(result) => result,
            Err(e) => {
                warn!("jsx-tagger skipped {}: {}", path, e);
                TransformResult::Unchanged
            }
        }
    }

    pub fn try_transform(&self, source: &str, path: &str) -> Result<TransformResult> {
        let unit = SourceUnit::new(source, path);
        let tree = self.provider.parse(&unit)?;

        let builder = IdentityBuilder::new(&self.provider, &unit, &self.config);
        let mut patches = PatchSet::new();

        for classified in classify(&self.provider, &unit, &tree, &self.config.attribute_prefix) {
            match builder.build(&classified) {
                Some(instrumentation) => {
                    patches.inject(classified.element.insert_at, &instrumentation.attributes)
                }
                None => trace!(
                    "{}: <{}> not tagged ({:?})",
                    path,
                    classified.element.name,
                    classified.exclusion
                ),
            }
        }

        if patches.is_empty() {
            return Ok(TransformResult::Unchanged);
        }

        let elements_tagged = patches.len();
        let patched = patches.apply(source)?;
        let map = build_source_map(&unit, builder.relative_path(), &patched);
        debug!("{}: tagged {} elements", path, elements_tagged);

        Ok(TransformResult::Transformed(TransformOutput {
            code: patched.code,
            map,
            elements_tagged,
        }))
    }
}

pub fn transform(source: &str, path: &str, config: &TransformConfig) -> TransformResult {
    Transformer::new(config.clone()).transform(source, path)
}

pub fn try_transform(source: &str, path: &str, config: &TransformConfig) -> Result<TransformResult> {
    Transformer::new(config.clone()).try_transform(source, path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi(object)]
pub struct TaggedModule {
    pub code: String,
    /// Source map JSON
    pub map: String,
}

#[cfg(feature = "napi")]
fn host_options(options: Option<serde_json::Value>) -> napi::Result<HostOptions> {
    match options {
        Some(value) => {
            HostOptions::from_json(value).map_err(|e| napi::Error::from_reason(e.to_string()))
        }
        None => Ok(HostOptions::default()),
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn should_transform_native(id: String, options: Option<serde_json::Value>) -> napi::Result<bool> {
    let filter = host_options(options)?
        .file_filter()
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    Ok(filter.should_transform(&id))
}

/// `null` means "leave the module as it is".
#[cfg(feature = "napi")]
#[napi]
pub fn transform_jsx_native(
    code: String,
    id: String,
    options: Option<serde_json::Value>,
) -> napi::Result<Option<TaggedModule>> {
    let options = host_options(options)?;
    let filter = options
        .file_filter()
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    if !filter.should_transform(&id) {
        return Ok(None);
    }

    Ok(transform(&code, &id, &options.transform)
        .into_output()
        .map(|output| TaggedModule {
            code: output.code,
            map: output.map.to_json_string(),
        }))
}
