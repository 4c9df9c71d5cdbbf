//! Formula descriptor engine for brewlint.
//!
//! A formula descriptor declares where to fetch one source file, its SHA-256
//! checksum, a compile-then-install sequence and an optional smoke test. This
//! crate parses descriptor text, validates it field by field, detects
//! conflicting descriptors for the same package name across a tap, and prints
//! validated descriptors back in canonical form. Nothing here fetches, builds
//! or installs anything.

pub mod batch;
pub mod checksum;
pub mod duplicates;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod printer;
pub mod types;
pub mod validation;

pub use batch::{BatchReport, FileReport, SourceFile, validate_batch};
pub use types::{FormulaError, InstallStep, PackageDescriptor, TestCommand, Word};
pub use validation::{Diagnostic, Field, ValidationError, ValidationOptions, validate_source};
