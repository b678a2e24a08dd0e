//! dangle-analysis: finds addresses of automatic storage escaping their
//! function in C/C++ sources.
//!
//! Pipeline: tokenize → build symbols → run checks → ordered findings.
//!
//! ```no_run
//! use dangle_analysis::Analyzer;
//! use dangle_core::CheckSettings;
//!
//! let analyzer = Analyzer::new(CheckSettings::new(false));
//! let findings = analyzer
//!     .analyze_source("a.c", "void f(int **out) { int x; *out = &x; }")
//!     .unwrap();
//! assert_eq!(findings.len(), 1);
//! ```

pub mod checks;
pub mod matcher;
pub mod pipeline;
pub mod program;
pub mod symbols;
pub mod tokens;

pub use checks::{AutoVariablesCheck, Check, CheckContext, CheckRegistry, RuleInfo};
pub use pipeline::Analyzer;
pub use program::Program;
