//! @ai:module:intent Sub-walkers for class bodies, case arms and resource attribute bodies
//! @ai:module:layer application
//! @ai:module:depends_on parser, ast, rules, scanner
//! @ai:module:stateless true

use crate::ast::{Case, CaseItem, Class, Resource, ResourceType};
use crate::diagnostics::{Position, Severity};
use crate::error::ScanError;
use crate::parser::{is_blank, line_with_break, Walker};
use crate::rules::Rule;
use crate::scanner::{count_newlines, find_until, matching_end_brace, rest_of_line};

impl Walker<'_> {
    /// @ai:intent Walk a class span into a Class with a single body Block
    /// @ai:effects mutates diagnostics
    pub fn walk_class(&mut self, content: &str, name: &str, line: usize) -> Result<Class, ScanError> {
        tracing::debug!("{}:{}: class {}", self.file, line, name);
        let body = self.walk_block(content, line)?;

        Ok(Class {
            name: name.to_string(),
            body,
        })
    }

    /// @ai:intent Walk a case span, producing one CaseItem per quoted arm
    /// @ai:pre content starts at the case's opening brace
    /// @ai:post arms without a quoted literal are skipped and reported at DEBUG
    /// @ai:effects mutates diagnostics
    pub fn walk_case(
        &mut self,
        content: &str,
        discriminant: &str,
        mut line: usize,
    ) -> Result<Case, ScanError> {
        tracing::debug!("{}:{}: case {}", self.file, line, discriminant);

        let bytes = content.as_bytes();
        let mut case = Case {
            discriminant: discriminant.to_string(),
            items: Vec::new(),
        };
        let mut index = usize::from(content.starts_with('{'));
        let mut line_start = 0;

        while index < content.len() {
            let rest = &content[index..];

            match bytes[index] {
                b'\'' | b'"' => {
                    if !self.check(line_with_break(rest), line, Rule::CaseItemLine) {
                        if self.options.resync {
                            index += rest_of_line(rest).len();
                            continue;
                        }
                        break;
                    }
                    index += 1;

                    let (literal, size) = find_until(&content[index..], '\'', Some('"'))?;
                    index += size;
                    let (_, size) = find_until(&content[index..], ':', None)?;
                    index += size;
                    let (_, size) = find_until(&content[index..], '{', None)?;
                    index += size;

                    let end = matching_end_brace(content, index)?;
                    let span = &content[index..end];
                    let body = self.walk_block(span, line)?;
                    case.items.push(CaseItem {
                        literal: literal.to_string(),
                        body,
                    });

                    line += count_newlines(span) - 1;
                    index = end;
                }
                b'{' => {
                    // `default: {` and other unquoted arms
                    let arm = rest_of_line(&content[line_start..]).trim();
                    self.diagnostics.log(
                        self.file,
                        Severity::Debug,
                        Position::line(line),
                        "Unimplemented?",
                        arm,
                    );

                    let end = matching_end_brace(content, index)?;
                    line += count_newlines(&content[index..end]) - 1;
                    index = end;
                }
                b'\n' => {
                    line += 1;
                    index += 1;
                    line_start = index;
                }
                _ => index += rest.chars().next().map_or(1, char::len_utf8),
            }
        }

        Ok(case)
    }

    /// @ai:intent Walk a resource span: capture the title, then lint and collect attribute lines
    /// @ai:pre content starts at the resource's opening brace and holds a quoted title
    /// @ai:post attributes keep source order; lines failing the pointer or value rule are not collected
    /// @ai:effects mutates diagnostics
    pub fn walk_resource(
        &mut self,
        content: &str,
        kind: ResourceType,
        mut line: usize,
    ) -> Result<Resource, ScanError> {
        let bytes = content.as_bytes();
        let mut resource = Resource::new(kind);

        let (_, size) = find_until(content, '\'', Some('"'))?;
        let mut index = size + 1;
        let (name, size) = find_until(&content[index..], '\'', Some('"'))?;
        resource.name = name.to_string();
        index += size;
        let (_, size) = find_until(&content[index..], ':', None)?;
        index += size + 1;

        tracing::debug!("{}:{}: resource {} '{}'", self.file, line, kind, resource.name);

        while index < content.len() {
            match bytes[index] {
                b'\n' => {
                    line += 1;
                    index += 1;
                }
                b'}' => index += 1,
                byte if is_blank(byte) => index += 1,
                _ => {
                    let text = rest_of_line(&content[index..]);
                    let next = content
                        .get(index + text.len() + 1..)
                        .map(rest_of_line)
                        .unwrap_or("");

                    if self.check(text, line, Rule::ResourceItemPointer)
                        && self.check(text, line, Rule::ResourceItemValue)
                    {
                        // a missing comma before the closing brace only warrants a warning
                        let joined = format!("{}{}", text, next);
                        let rule = if Rule::ResourceItemCommaNextLineEnd.is_match(&joined) {
                            Rule::ResourceItemCommaWarn
                        } else {
                            Rule::ResourceItemComma
                        };
                        self.check(text, line, rule);
                        resource.attributes.push(text.to_string());
                    }
                    index += text.len();
                }
            }
        }

        Ok(resource)
    }
}
