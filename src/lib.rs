//! @ai:module:intent Puppet manifest parser library with inline lint rules
//! @ai:module:layer infrastructure
//! @ai:module:public_api ast, config, diagnostics, discovery, error, output, parser, processor, rules, scanner, validate
//! @ai:module:stateless true
//!
//! # puppet-walk
//!
//! A hand-written scanning parser for Puppet manifests. It walks resources,
//! classes, case statements, includes and variables into a typed tree while
//! checking each construct against a fixed set of lint rules.
//!
//! ## Example
//!
//! ```rust,no_run
//! use puppet_walk::{output, parser, Diagnostics, Severity, WalkOptions};
//!
//! let mut diagnostics = Diagnostics::new();
//! let file = parser::parse(
//!     "init.pp",
//!     "class ntp {\n  include ntp::service\n}\n",
//!     &mut diagnostics,
//!     &WalkOptions::default(),
//! )
//! .unwrap();
//!
//! println!("{}", output::format_tree(&file));
//! println!("{}", output::format_diagnostics(&diagnostics.drain(), Severity::Info));
//! ```

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parser;
pub mod processor;
pub mod rules;
pub mod scanner;
pub mod validate;
mod walkers;

pub use ast::{Block, Case, CaseItem, Class, File, Include, Resource, ResourceType, Statement, Variable};
pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, Position, Severity};
pub use error::{Error, Result, ScanError};
pub use output::{format_diagnostics, format_module_report, format_tree, OutputFormat, RenderOptions};
pub use parser::{parse, walk_content, WalkOptions, Walker};
pub use processor::{process_file, process_module, process_source, FileReport, ModuleReport};
pub use rules::{Rule, RuleViolation};
pub use validate::validate_module;
