//! oaskit — a toolkit for OpenAPI Specification documents.
//!
//! Parses Swagger 2.0 and OpenAPI 3.0.x/3.1.x documents into a shared
//! in-memory model and performs structural transformations over it:
//!
//! - **Parsing** ([`parser`]): version classification, typed decode,
//!   statistics, structural validation, optional source map
//! - **JSONPath** ([`jsonpath`]): read, modify, and remove over the generic
//!   tree with a documented expression subset
//! - **Overlays** ([`overlay`]): OpenAPI Overlay 1.0 application with
//!   deterministic action semantics and dry runs
//! - **Joining** ([`join`]): fold N documents under explicit collision
//!   strategies, rename templates, and semantic deduplication
//! - **Diffing** ([`diff`]): ordered change lists with breaking-change
//!   classification
//! - **Converting** ([`convert`]): 2.0 to 3.x, 3.x to 2.0, and 3.0 to/from
//!   3.1, with typed issues
//! - **Fixing** ([`fix`]): six named repair passes over 3.x documents
//!
//! Components accept pre-parsed [`parser::ParseResult`] values so documents
//! parse once and flow through a pipeline; every mutating component result
//! offers a `to_parse_result()` adapter for the next stage. Inputs are
//! deep-copied before mutation and never modified.
//!
//! ```no_run
//! use oaskit::overlay::{Applier, Overlay};
//! use oaskit::parser;
//!
//! # fn main() -> Result<(), oaskit::Error> {
//! let spec = parser::parse_file("openapi.yaml")?;
//! let overlay = Overlay::from_file("overlay.yaml")?;
//! let result = Applier::new().apply(&spec, &overlay)?;
//! println!(
//!     "applied {} action(s), skipped {}",
//!     result.actions_applied, result.actions_skipped
//! );
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod convert;
pub mod diff;
pub mod error;
pub mod fix;
pub mod join;
pub mod jsonpath;
pub mod loader;
pub mod model;
pub mod overlay;
pub mod parser;
pub mod refs;
pub mod value;

pub use error::{Error, ErrorKind};
pub use loader::SourceFormat;
pub use model::{Document, DocumentAccessor, OASVersion};
pub use parser::{ParseResult, Parser};
