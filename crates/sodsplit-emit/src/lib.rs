//! sodsplit Emit
//!
//! Writes the split source tree: a header/implementation pair per module,
//! the shared `sod_common.h` and the umbrella `sod.h`. Headers receive
//! type definitions and public prototypes, implementation units receive
//! bodies and globals; conditionals land on whichever side their content
//! demands, or both when a block mixes declarations with code.

mod common;
mod header;
mod implfile;
mod includes;

use std::fs;

use serde::Serialize;
use sodsplit_classify::SplitPlan;
use sodsplit_core::{ElementKind, Result, SplitOptions};
use sodsplit_extract::{ElementPatterns, Extraction};
use tracing::{debug, info};

/// What one synthesis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct EmitReport {
    /// Modules that received files, in name order.
    pub modules_written: Vec<&'static str>,
    /// Total files created, umbrella and common header included.
    pub files_written: usize,
}

/// Writes the output tree for a classified split.
pub struct Synthesizer {
    patterns: ElementPatterns,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self { patterns: ElementPatterns::new() }
    }

    /// Write every output file under the directories `opts` names.
    pub fn write_tree(
        &self,
        opts: &SplitOptions,
        extraction: &Extraction,
        plan: &SplitPlan,
    ) -> Result<EmitReport> {
        let src_dir = opts.src_dir();
        let include_dir = opts.include_dir();
        fs::create_dir_all(&src_dir)?;
        fs::create_dir_all(&include_dir)?;

        let nn_types_definitions = hoisted_definitions(plan, "nn_types");
        let activation_definitions = hoisted_definitions(plan, "activation");

        fs::write(
            include_dir.join("sod_common.h"),
            common::common_header(extraction, &self.patterns),
        )?;
        info!("Created common header file");
        let mut files_written = 1;

        let mut modules_written = Vec::new();
        for (module, elements) in &plan.modules {
            let hoisted = match *module {
                "nn_types" if !nn_types_definitions.is_empty() => {
                    Some(nn_types_definitions.as_str())
                }
                "activation" if !activation_definitions.is_empty() => {
                    Some(activation_definitions.as_str())
                }
                _ => None,
            };

            let header_elements = header::select(module, elements, &self.patterns);

            let mut needed = includes::infer(elements);
            if *module != "common" {
                needed.insert("common");
            }
            // layer math and detection code always lean on the core types
            if matches!(*module, "cnn" | "detection" | "box_utils" | "activation" | "dropout") {
                needed.insert("nn_types");
            }
            debug!("{}: {} header elements, includes {:?}", module, header_elements.len(), needed);

            let impl_elements = implfile::select(elements, &header_elements);
            let unit = implfile::assemble(module, &impl_elements, &needed);
            fs::write(src_dir.join(format!("sod_{}.c", module)), unit)?;
            files_written += 1;

            // the common header is owned by the dedicated builder above
            if *module != "common" {
                let text = header::assemble(module, &header_elements, hoisted);
                fs::write(include_dir.join(format!("sod_{}.h", module)), text)?;
                files_written += 1;
            }

            info!("Created {} module ({} elements)", module, elements.len());
            modules_written.push(*module);
        }

        let umbrella_path = opts.umbrella_header();
        fs::write(&umbrella_path, common::umbrella(&modules_written))?;
        files_written += 1;
        info!("Created main header file: {}", umbrella_path.display());

        Ok(EmitReport { modules_written, files_written })
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenated enum definitions assigned to `module`, used to hoist the
/// shared enums to the top of its header.
fn hoisted_definitions(plan: &SplitPlan, module: &str) -> String {
    let mut definitions = String::new();
    if let Some(elements) = plan.module(module) {
        for elem in elements {
            if elem.kind == ElementKind::Enum {
                definitions.push_str(&elem.content);
                definitions.push_str("\n\n");
            }
        }
    }
    definitions
}
