//! sodsplit Extract
//!
//! Scans the SOD amalgamation text and produces the raw material the later
//! phases work from: one element list per construct kind, plus the symbol
//! table recording what each name is. Nothing here decides module
//! membership; extraction only answers "what is in the file and where".

pub mod patterns;

mod conditionals;
mod decls;
mod deps;
mod functions;
mod macros;

pub use patterns::ElementPatterns;

use serde::Serialize;
use sodsplit_core::{Element, SymbolTable};
use tracing::{debug, info};

/// Everything one pass over the amalgamation produces.
#[derive(Debug, Default)]
pub struct Extraction {
    pub functions: Vec<Element>,
    pub structs: Vec<Element>,
    pub enums: Vec<Element>,
    pub globals: Vec<Element>,
    pub typedefs: Vec<Element>,
    pub macros: Vec<Element>,
    pub comments: Vec<Element>,
    pub conditionals: Vec<Element>,
    pub includes: Vec<Element>,
    /// Name table built while the passes run.
    pub symbols: SymbolTable,
}

impl Extraction {
    /// Count of named symbols: everything except comments, conditionals and
    /// includes.
    pub fn total_symbols(&self) -> usize {
        self.functions.len()
            + self.structs.len()
            + self.enums.len()
            + self.globals.len()
            + self.typedefs.len()
            + self.macros.len()
    }

    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            functions: self.functions.len(),
            structs: self.structs.len(),
            enums: self.enums.len(),
            globals: self.globals.len(),
            typedefs: self.typedefs.len(),
            macros: self.macros.len(),
            comments: self.comments.len(),
            conditionals: self.conditionals.len(),
            includes: self.includes.len(),
            total_symbols: self.total_symbols(),
        }
    }
}

/// Per-kind element counts, for summaries and the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionStats {
    pub functions: usize,
    pub structs: usize,
    pub enums: usize,
    pub globals: usize,
    pub typedefs: usize,
    pub macros: usize,
    pub comments: usize,
    pub conditionals: usize,
    pub includes: usize,
    pub total_symbols: usize,
}

/// Splits amalgamation text into elements.
pub struct Extractor {
    patterns: ElementPatterns,
}

impl Extractor {
    pub fn new() -> Self {
        Self { patterns: ElementPatterns::new() }
    }

    /// Run every extraction pass over `source`.
    pub fn extract(&self, source: &str) -> Extraction {
        let mut symbols = SymbolTable::new();

        let comments = decls::comments(&self.patterns, source);
        let includes = decls::includes(&self.patterns, source);
        let enums = decls::enums(&self.patterns, source, &mut symbols);
        let conditionals = conditionals::extract(&self.patterns, source);
        let functions = functions::extract(&self.patterns, source, &mut symbols);
        let structs = decls::structs(&self.patterns, source, &mut symbols);
        let globals = decls::globals(&self.patterns, source, &mut symbols);
        let typedefs = decls::typedefs(&self.patterns, source, &mut symbols);
        let macros = macros::extract(&self.patterns, source, &mut symbols);

        let out = Extraction {
            functions,
            structs,
            enums,
            globals,
            typedefs,
            macros,
            comments,
            conditionals,
            includes,
            symbols,
        };

        debug!(
            "Pass counts: {} functions, {} structs, {} enums, {} globals, {} typedefs, {} macros",
            out.functions.len(),
            out.structs.len(),
            out.enums.len(),
            out.globals.len(),
            out.typedefs.len(),
            out.macros.len()
        );
        info!("Extracted {} symbols from {} bytes of source", out.total_symbols(), source.len());

        out
    }

    /// Patterns shared with the phases that re-scan element text.
    pub fn patterns(&self) -> &ElementPatterns {
        &self.patterns
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
