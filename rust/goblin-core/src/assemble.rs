//! Program skeletons the partitioned blocks are substituted into.
//!
//! Assembly is plain string substitution. Whether the result compiles is
//! left to the toolchain.

use crate::partition::{partition, Partition};

/// Import every assembled program gets so `fmt.Println` works out of the box.
pub const BASELINE_IMPORT: &str = "\"fmt\"";

/// Which program template to substitute into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skeleton {
    /// Annotated program used by `:run` and `:export`.
    #[default]
    Run,
    /// Bare program handed to the formatter by `:tidy`. It carries no
    /// baseline import and no annotations, so nothing leaks back into the
    /// buffer.
    Tidy,
}

/// Substitute the three blocks into the run skeleton.
pub fn assemble(imports: &str, declarations: &str, statements: &str) -> String {
    let baseline = if imports_baseline(imports) {
        String::new()
    } else {
        format!("\t{BASELINE_IMPORT}\n")
    };

    format!(
        "
package main

import (
{baseline}{imports} // User-provided imports
)

var _ = fmt.Sprint

{declarations} // Global variables, constants, types, and functions

func main() {{
{statements} // Statements
}}
"
    )
}

/// Substitute the three blocks into the comment-free tidy skeleton.
pub fn assemble_for_tidy(imports: &str, declarations: &str, statements: &str) -> String {
    format!(
        "
package main

import (
{imports}
)

{declarations}

func main() {{
{statements}
}}
"
    )
}

impl Partition {
    /// Assemble these blocks into `skeleton`.
    pub fn assemble(&self, skeleton: Skeleton) -> String {
        match skeleton {
            Skeleton::Run => assemble(&self.imports, &self.declarations, &self.statements),
            Skeleton::Tidy => {
                assemble_for_tidy(&self.imports, &self.declarations, &self.statements)
            }
        }
    }
}

/// Partition `lines` and assemble the runnable program.
pub fn program_source<S: AsRef<str>>(lines: &[S]) -> String {
    partition(lines).assemble(Skeleton::Run)
}

fn imports_baseline(imports: &str) -> bool {
    imports.lines().any(|line| line.trim() == BASELINE_IMPORT)
}
