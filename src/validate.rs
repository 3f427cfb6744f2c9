//! @ai:module:intent Cross-file checks over every parsed manifest of one module
//! @ai:module:layer application
//! @ai:module:public_api validate_module, expected_class_name
//! @ai:module:depends_on ast, diagnostics
//! @ai:module:stateless true

use crate::ast::{Block, File, ResourceType, Statement};
use crate::diagnostics::{Diagnostics, Position, Severity};
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Component, Path};

/// @ai:intent Run the module-wide checks, logging into the sink
/// @ai:pre files were parsed from manifests below `root`
/// @ai:effects mutates diagnostics
pub fn validate_module(files: &[File], module: &str, root: &Path, diagnostics: &mut Diagnostics) {
    tracing::info!("Validating module {} ({} files)", module, files.len());

    let mut defined: HashMap<&str, &str> = HashMap::new();

    for file in files {
        let expected = expected_class_name(Path::new(&file.path), module, root);

        for class in top_level_classes(file) {
            if let Some(expected) = &expected {
                if class != expected.as_str() {
                    diagnostics.log(
                        &file.path,
                        Severity::Error,
                        Position::unknown(),
                        format!("Class name does not match file path, expected '{}'", expected),
                        class,
                    );
                }
            }
        }

        file.visit(&mut |statement| {
            if let Statement::Class(class) = statement {
                if let Some(first) = defined.insert(&class.name, &file.path) {
                    diagnostics.log(
                        &file.path,
                        Severity::Error,
                        Position::unknown(),
                        format!("Duplicate class definition, first defined in {}", first),
                        class.name.as_str(),
                    );
                }
            }
        });

        for item in &file.items {
            if let Statement::Block(block) = item {
                check_duplicate_resources(block, &file.path, diagnostics);
            }
        }
    }

    let own_prefix = format!("{}::", module);
    for file in files {
        file.visit(&mut |statement| {
            if let Statement::Include(include) = statement {
                let own = include.name == module || include.name.starts_with(&own_prefix);
                if own && !defined.contains_key(include.name.as_str()) {
                    diagnostics.log(
                        &file.path,
                        Severity::Warning,
                        Position::unknown(),
                        "Included class is not defined in this module",
                        include.name.as_str(),
                    );
                }
            }
        });
    }
}

/// @ai:intent Class name Puppet's autoloader expects for a manifest path
/// @ai:example ("/m/manifests/init.pp", "ntp", "/m") -> Some("ntp")
/// @ai:example ("/m/manifests/config/files.pp", "ntp", "/m") -> Some("ntp::config::files")
/// @ai:example ("/m/tests/init.pp", "ntp", "/m") -> None
/// @ai:effects pure
pub fn expected_class_name(path: &Path, module: &str, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();

    if components.next() != Some(Component::Normal(OsStr::new("manifests"))) {
        return None;
    }

    let mut segments = vec![module.to_string()];
    let parts: Vec<&Path> = components.map(|c| Path::new(c.as_os_str())).collect();
    let (last, dirs) = parts.split_last()?;

    for dir in dirs {
        segments.push(dir.to_str()?.to_string());
    }

    let stem = last.file_stem()?.to_str()?;
    if !(dirs.is_empty() && stem == "init") {
        segments.push(stem.to_string());
    }

    Some(segments.join("::"))
}

fn top_level_classes(file: &File) -> impl Iterator<Item = &str> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Statement::Block(block) => Some(block.items.iter()),
            _ => None,
        })
        .flatten()
        .filter_map(|statement| match statement {
            Statement::Class(class) => Some(class.name.as_str()),
            _ => None,
        })
}

/// Resources declared twice among the siblings of one block.
fn check_duplicate_resources(block: &Block, file: &str, diagnostics: &mut Diagnostics) {
    let mut seen: HashSet<(ResourceType, &str)> = HashSet::new();

    for statement in &block.items {
        match statement {
            Statement::Resource(resource) => {
                if !seen.insert((resource.kind, resource.name.as_str())) {
                    diagnostics.log(
                        file,
                        Severity::Error,
                        Position::unknown(),
                        "Duplicate resource declaration",
                        format!("{}['{}']", resource.kind, resource.name),
                    );
                }
            }
            Statement::Block(inner) => check_duplicate_resources(inner, file, diagnostics),
            Statement::Class(class) => check_duplicate_resources(&class.body, file, diagnostics),
            Statement::Case(case) => {
                for item in &case.items {
                    check_duplicate_resources(&item.body, file, diagnostics);
                }
            }
            Statement::Variable(_) | Statement::Include(_) => {}
        }
    }
}
