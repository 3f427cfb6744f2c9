//! @ai:module:intent Drive parsing over a module, isolating per-file failures
//! @ai:module:layer application
//! @ai:module:public_api process_source, process_file, process_module, FileReport, ModuleReport
//! @ai:module:depends_on parser, discovery, validate, diagnostics, config, error
//! @ai:module:stateless true

use crate::ast::File;
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics, Position, Severity};
use crate::discovery::{check_module_layout, find_manifests, normalize_root};
use crate::error::{Error, Result};
use crate::parser::{parse, WalkOptions};
use crate::validate::validate_module;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// @ai:intent Diagnostics drained after processing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub parsed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// @ai:intent Everything a module run produced
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModuleReport {
    pub module: String,
    pub root: PathBuf,
    pub files: Vec<FileReport>,
    pub trees: Vec<File>,
    pub validation: Option<Vec<Diagnostic>>,
    pub parse_seconds: f64,
    pub validate_seconds: Option<f64>,
}

impl ModuleReport {
    /// @ai:intent All diagnostics of the run in the order they were recorded
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.iter())
            .chain(self.validation.iter().flatten())
    }

    /// @ai:intent Check if the run passed (no ERROR or FATAL diagnostics)
    pub fn passed(&self) -> bool {
        self.diagnostics().all(|d| d.severity < Severity::Error)
    }
}

/// @ai:intent Parse in-memory manifest text, turning internal failures into one FATAL diagnostic
/// @ai:post None iff the walk failed; a brace-unbalanced file still yields Some(empty File)
/// @ai:effects mutates diagnostics
pub fn process_source(
    path: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
    options: &WalkOptions,
) -> Option<File> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        parse(path, text, &mut *diagnostics, options)
    }));

    let failure = match outcome {
        Ok(Ok(file)) => return Some(file),
        Ok(Err(e)) => Error::from(e).to_string(),
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string()),
    };

    tracing::warn!("{}: parsing aborted: {}", path, failure);
    diagnostics.log(
        path,
        Severity::Fatal,
        Position::unknown(),
        format!("FATAL: Panic during file parsing, {}", failure),
        "",
    );
    None
}

/// @ai:intent Read and parse one manifest
/// @ai:effects fs:read, mutates diagnostics
pub fn process_file(path: &Path, diagnostics: &mut Diagnostics, options: &WalkOptions) -> Result<Option<File>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(process_source(&path.display().to_string(), &text, diagnostics, options))
}

/// @ai:intent Parse every manifest of a module, then run the module validator unless only parsing
/// @ai:pre root holds `files/` and `manifests/`
/// @ai:post one FileReport per discovered manifest, in path order
/// @ai:effects fs:read
pub fn process_module(root: &Path, module: &str, config: &Config) -> Result<ModuleReport> {
    check_module_layout(root)?;
    let root = normalize_root(root)?;

    let mut diagnostics = Diagnostics::new();
    let mut report = ModuleReport {
        module: module.to_string(),
        root: root.clone(),
        ..Default::default()
    };

    let start = Instant::now();
    for path in find_manifests(&root) {
        tracing::info!("Processing file: {}", path.display());

        let parsed = match process_file(&path, &mut diagnostics, &config.walk) {
            Ok(file) => file,
            Err(e) => {
                diagnostics.log(
                    &path.display().to_string(),
                    Severity::Fatal,
                    Position::unknown(),
                    e.to_string(),
                    "",
                );
                None
            }
        };

        report.files.push(FileReport {
            path: path.display().to_string(),
            parsed: parsed.is_some(),
            diagnostics: diagnostics.drain(),
        });
        report.trees.extend(parsed);
    }
    report.parse_seconds = start.elapsed().as_secs_f64();

    if !config.only_parse {
        let start = Instant::now();
        validate_module(&report.trees, module, &root, &mut diagnostics);
        report.validation = Some(diagnostics.drain());
        report.validate_seconds = Some(start.elapsed().as_secs_f64());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn module(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("files")).unwrap();
        fs::create_dir(dir.path().join("manifests")).unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_process_source_reports_scan_errors_as_fatal() {
        let mut diagnostics = Diagnostics::new();
        // globally balanced, but the class brace is never closed
        let file = process_source(
            "bad.pp",
            "}\nclass a {\n",
            &mut diagnostics,
            &WalkOptions::default(),
        );

        assert!(file.is_none());
        let fatal: Vec<_> = diagnostics
            .entries()
            .iter()
            .filter(|d| d.severity == Severity::Fatal)
            .collect();
        assert_eq!(fatal.len(), 1);
        assert!(fatal[0].message.starts_with("FATAL: Panic during file parsing"));
        assert!(fatal[0].message.contains("Scan error"));
    }

    #[test]
    fn test_process_module_isolates_files() {
        let dir = module(&[
            ("manifests/init.pp", "class ntp {\n  include ntp::service\n}\n"),
            ("manifests/service.pp", "class ntp::service {\n"),
            ("manifests/.backup.pp", "garbage {"),
        ]);

        let report = process_module(dir.path(), "ntp", &Config::default()).unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report.files[0].diagnostics.is_empty());
        assert_eq!(report.files[1].diagnostics.len(), 1);
        assert_eq!(report.files[1].diagnostics[0].severity, Severity::Fatal);
        assert_eq!(report.trees.len(), 2);

        // ntp::service never got a class because its file was unbalanced
        let validation = report.validation.as_ref().unwrap();
        assert_eq!(validation.len(), 1);
        assert_eq!(validation[0].text, "ntp::service");
        assert!(!report.passed());
    }

    #[test]
    fn test_process_module_only_parse() {
        let dir = module(&[("manifests/init.pp", "class ntp {\n}\n")]);
        let config = Config {
            only_parse: true,
            ..Default::default()
        };

        let report = process_module(dir.path(), "ntp", &config).unwrap();

        assert!(report.validation.is_none());
        assert!(report.passed());
    }

    #[test]
    fn test_process_module_rejects_bad_layout() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            process_module(dir.path(), "ntp", &Config::default()),
            Err(Error::InvalidModule(_))
        ));
    }
}
