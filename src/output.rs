//! @ai:module:intent Format diagnostics, trees and module reports for the console or JSON
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_diagnostics, format_tree, format_module_report
//! @ai:module:depends_on processor, diagnostics, ast
//! @ai:module:stateless true

use crate::ast::{Block, File, Statement};
use crate::diagnostics::{Diagnostic, Severity};
use crate::processor::ModuleReport;
use colored::{ColoredString, Colorize};
use std::path::Path;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Options that shape the text rendering of a report
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub threshold: Severity,
    pub print_tree: bool,
}

fn colorize(severity: Severity, text: &str) -> ColoredString {
    match severity {
        Severity::Fatal => text.white().on_red().bold(),
        Severity::Error => text.red().bold(),
        Severity::Warning => text.yellow().bold(),
        Severity::Info => text.white(),
        Severity::Debug => text.cyan(),
    }
}

/// @ai:intent Render one diagnostic as a single colored line
/// @ai:effects pure
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let location = format!(
        "{}:{}:{}",
        diagnostic.file, diagnostic.position.line, diagnostic.position.column
    );

    let mut line = format!(
        "{} {} - {}",
        colorize(diagnostic.severity, diagnostic.severity.label()),
        location.dimmed(),
        diagnostic.message
    );

    if !diagnostic.text.is_empty() {
        let text = diagnostic.text.lines().next().unwrap_or_default().trim();
        line.push_str(&format!(" {}", format!("`{}`", text).dimmed()));
    }

    line
}

/// @ai:intent Render the diagnostics at or above the threshold, or a success line when none is an error or warning
/// @ai:effects pure
pub fn format_diagnostics(diagnostics: &[Diagnostic], threshold: Severity) -> String {
    let mut output = String::new();
    let mut problems = false;

    for diagnostic in diagnostics.iter().filter(|d| d.severity >= threshold) {
        output.push_str(&format_diagnostic(diagnostic));
        output.push('\n');
        problems |= diagnostic.severity >= Severity::Warning;
    }

    if !problems {
        output.push_str(&format!("{}\n", "No Errors/Warnings Found".green()));
    }

    output
}

/// @ai:intent Render a parsed file as an indented tree
/// @ai:effects pure
pub fn format_tree(file: &File) -> String {
    let mut output = format!("{}\n", file.path.bold());
    for item in &file.items {
        write_statement(&mut output, item, 1);
    }
    output
}

fn write_block(output: &mut String, block: &Block, depth: usize) {
    for statement in &block.items {
        write_statement(output, statement, depth);
    }
}

fn write_statement(output: &mut String, statement: &Statement, depth: usize) {
    let indent = "  ".repeat(depth);

    match statement {
        Statement::Block(block) => {
            output.push_str(&format!("{}block ({} items)\n", indent, block.len()));
            write_block(output, block, depth + 1);
        }
        Statement::Variable(variable) => {
            output.push_str(&format!("{}${} = {}\n", indent, variable.name, variable.value));
        }
        Statement::Include(include) => {
            output.push_str(&format!("{}include {}\n", indent, include.name.cyan()));
        }
        Statement::Class(class) => {
            output.push_str(&format!("{}class {}\n", indent, class.name.cyan()));
            write_block(output, &class.body, depth + 1);
        }
        Statement::Case(case) => {
            output.push_str(&format!("{}case {}\n", indent, case.discriminant));
            for item in &case.items {
                output.push_str(&format!("{}  '{}':\n", indent, item.literal));
                write_block(output, &item.body, depth + 2);
            }
        }
        Statement::Resource(resource) => {
            let chained = if resource.dependency { " ->" } else { "" };
            output.push_str(&format!(
                "{}{} '{}'{}\n",
                indent,
                resource.kind.to_string().yellow(),
                resource.name,
                chained
            ));
            for attribute in &resource.attributes {
                output.push_str(&format!("{}    {}\n", indent, attribute));
            }
        }
    }
}

/// @ai:intent Format a module report as a string
/// @ai:effects pure
pub fn format_module_report(report: &ModuleReport, format: OutputFormat, options: RenderOptions) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => format_module_report_text(report, options),
    }
}

fn format_module_report_text(report: &ModuleReport, options: RenderOptions) -> String {
    let mut output = String::new();

    for file in &report.files {
        let shown = relative(Path::new(&file.path), &report.root);
        output.push_str(&format!("{}\n", format!("Processing file: ./{}", shown).cyan()));
        output.push_str(&format_diagnostics(&file.diagnostics, options.threshold));
    }

    output.push_str(&format!("parsing took {:.6} seconds\n", report.parse_seconds));

    if options.print_tree {
        for tree in &report.trees {
            output.push_str(&format_tree(tree));
        }
    }

    if let (Some(validation), Some(seconds)) = (&report.validation, report.validate_seconds) {
        output.push_str(&format_diagnostics(validation, options.threshold));
        output.push_str(&format!("validating took {:.6} seconds\n", seconds));
    }

    output
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
