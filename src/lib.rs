//! # jsx-tagger
//!
//! Build-time instrumentation for JSX/TSX: every markup element gets
//! attributes naming the file, line and column it came from, so a rendered
//! element can be traced back to its source.
//!
//! ## Transform Invariants
//!
//! 1. **Text patching only**: attributes are spliced in right after the tag
//!    name. Every other byte of the input is kept as is.
//!
//! 2. **Idempotence**: an element carrying any attribute that starts with
//!    the configured prefix is never tagged again.
//!
//! 3. **Transparent groups**: `<>`, `<Fragment>` and `<React.Fragment>`
//!    never receive attributes.
//!
//! 4. **Identity**: `relativePath:line:column`, line 1-based, column
//!    1-based (parser columns are 0-based UTF-16 units plus one). Lines
//!    break on LF, CRLF, CR, U+2028 and U+2029.
//!
//! 5. **Static snapshots**: props snapshots record literal strings, `true`
//!    for valueless attributes and `"[expression]"` for anything else.
//!    Nothing is evaluated.
//!
//! 6. **Failure isolation**: a file that does not parse is reported as
//!    unchanged; a snapshot that does not serialize is dropped for that
//!    element only.

mod batch;
mod classify;
mod config;
mod error;
mod identity;
mod patch;
mod source;
mod sourcemap;
mod syntax;
mod transform;


pub use batch::{instrument_directory, BatchOptions, BatchReport, FileOutcome, FileStatus};
pub use classify::{classify, resolve_name, Classified, Exclusion};
pub use config::{FileFilter, HostOptions, TransformConfig, DEFAULT_ATTRIBUTE_PREFIX};
pub use error::TransformError;
pub use identity::{
    ContentPreview, ElementIdentity, IdentityBuilder, InjectedAttribute, Instrumentation,
    COLUMN_OFFSET, EXPRESSION_SENTINEL,
};
pub use patch::{Insertion, PatchSet, Patched};
pub use source::{LineIndex, SourceLocation, SourceUnit};
pub use syntax::{
    AttributeNode, AttributeValue, ChildNode, ElementName, ElementNode, OxcSyntaxProvider,
    SyntaxProvider, SyntaxTree,
};
pub use transform::{transform, try_transform, TransformOutput, TransformResult, Transformer};

#[cfg(feature = "napi")]
pub use transform::{should_transform_native, transform_jsx_native, TaggedModule};
