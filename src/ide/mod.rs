//! IDE features — high-level APIs for editor integrations.
//!
//! Each function corresponds to one editor request and is a pure query over
//! the semantic workspace: data in, data out, no editor-protocol types.
//! The recommended entry point is [`AnalysisHost`]:
//!
//! ```ignore
//! use soli::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content(Path::new("/p/src/A.sol"), "contract A {}");
//!
//! let analysis = host.analysis();
//! let definition = analysis.goto_definition(Path::new("/p/src/A.sol"), 12);
//! ```

mod analysis;
mod completion;
mod goto;
mod hover;
mod references;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use goto::goto_definition;
pub use hover::{HoverResult, hover};
pub use references::find_references;
