//! sodsplit Core
//!
//! Core types and interfaces for the sodsplit partitioning engine:
//! source elements, the symbol table, the fixed module registry, the
//! shared preprocessor-directive scanner and run configuration.

pub mod config;
pub mod directives;
pub mod element;
pub mod error;
pub mod registry;
pub mod symbols;

pub use config::{SplitOptions, TimeBudget};
pub use element::{Element, ElementKind};
pub use error::{Error, Result};
pub use symbols::{SymbolInfo, SymbolTable};
