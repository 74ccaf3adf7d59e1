//! Goblin Core
//!
//! Source reassembly engine for the Goblin Go REPL: classifies freeform
//! input lines, partitions a buffer into imports, declarations and
//! statements, assembles a runnable program, and round-trips it through the
//! canonical formatter.

pub mod assemble;
pub mod buffer;
pub mod classify;
pub mod partition;
pub mod tidy;
pub mod toolchain;

pub use assemble::{assemble, program_source, Skeleton};
pub use buffer::{Buffer, BufferError, Deleted, Submission, Undo};
pub use classify::{classify, Bucket, Classified, ClassifierState, Mode};
pub use partition::{partition, partition_source, Partition};
pub use tidy::tidy;
pub use toolchain::{run_lines, Execution, FormatError, SourceFormatter, Toolchain, ToolchainError};
