//! @ai:module:intent Walk manifest text into a Block of statements without a tokenizer
//! @ai:module:layer application
//! @ai:module:public_api parse, walk_content, WalkOptions, Walker
//! @ai:module:depends_on ast, diagnostics, rules, scanner, error
//! @ai:module:stateless true

use crate::ast::{Block, File, Include, ResourceType, Statement, Variable};
use crate::diagnostics::{Diagnostics, Position, Severity};
use crate::error::ScanError;
use crate::rules::Rule;
use crate::scanner::{
    balance_check, count_newlines, find_open_brace, find_until, matching_end_brace,
    normalize_newlines, rest_of_line, strip_comments,
};
use serde::{Deserialize, Serialize};

/// @ai:intent Knobs that change how the walkers react to failed structural rules
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalkOptions {
    /// Skip to the next line after a failed `include`/`case`/`class`/case-item
    /// rule instead of dropping the rest of the enclosing block.
    #[serde(default)]
    pub resync: bool,
}

/// @ai:intent Parse one manifest into a File, logging findings into the sink
/// @ai:pre text is the full file content
/// @ai:post an unbalanced file yields a File with no items and one FATAL entry
/// @ai:effects mutates diagnostics
pub fn parse(
    path: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
    options: &WalkOptions,
) -> Result<File, ScanError> {
    let mut file = File::new(path);
    walk_content(text, &mut file, diagnostics, 1, options)?;
    Ok(file)
}

/// @ai:intent Strip comments, verify brace balance, then walk the whole content as one Block
/// @ai:effects mutates file, diagnostics
pub fn walk_content(
    content: &str,
    file: &mut File,
    diagnostics: &mut Diagnostics,
    line: usize,
    options: &WalkOptions,
) -> Result<(), ScanError> {
    let content = strip_comments(&normalize_newlines(content));
    let balance = balance_check(&content);

    if balance == 0 {
        let path = file.path.clone();
        let mut walker = Walker::new(&path, diagnostics, options);
        let block = walker.walk_block(&content, line)?;
        file.items.push(Statement::Block(block));
    } else {
        let message = if balance < 0 {
            "Too few start braces '{', file can't be parsed"
        } else {
            "Too few end braces '}', file can't be parsed"
        };
        tracing::debug!("{}: brace balance {}", file.path, balance);
        diagnostics.log(&file.path, Severity::Fatal, Position::unknown(), message, "");
    }

    Ok(())
}

/// @ai:intent Recursive-descent context shared by the block walker and the sub-walkers
pub struct Walker<'a> {
    pub(crate) file: &'a str,
    pub(crate) diagnostics: &'a mut Diagnostics,
    pub(crate) options: &'a WalkOptions,
}

impl<'a> Walker<'a> {
    pub fn new(file: &'a str, diagnostics: &'a mut Diagnostics, options: &'a WalkOptions) -> Self {
        Self {
            file,
            diagnostics,
            options,
        }
    }

    pub(crate) fn check(&mut self, text: &str, line: usize, rule: Rule) -> bool {
        self.diagnostics
            .check_rule(text, Position::line(line), self.file, rule)
    }

    /// @ai:intent Turn a span of text into an ordered Block of statements
    /// @ai:pre the span is brace balanced
    /// @ai:post at least one byte is consumed per iteration
    /// @ai:effects mutates diagnostics
    pub fn walk_block(&mut self, content: &str, mut line: usize) -> Result<Block, ScanError> {
        let bytes = content.as_bytes();
        let mut block = Block::default();
        let mut index = 0;

        while index < content.len() {
            let rest = &content[index..];

            match bytes[index] {
                b'\n' => {
                    line += 1;
                    index += 1;
                }
                b'{' | b'}' => index += 1,
                b'$' => {
                    let text = rest_of_line(rest);
                    match find_until(&text[1..], '=', None) {
                        Ok((name, size)) => {
                            let value = &text[1 + size + 1..];
                            block.push(Statement::Variable(Variable {
                                name: name.trim().to_string(),
                                value: value.trim().to_string(),
                            }));
                        }
                        Err(_) => self.unimplemented(text, line),
                    }
                    index += text.len();
                }
                _ if rest.starts_with("->") => {
                    match block.items.last_mut() {
                        Some(Statement::Resource(resource)) => resource.set_dependency(),
                        _ => self.diagnostics.log(
                            self.file,
                            Severity::Error,
                            Position::line(line),
                            "Dependency definition invalid",
                            "->",
                        ),
                    }
                    index += 2;
                }
                _ if rest.starts_with("include") => {
                    if !self.check(line_with_break(rest), line, Rule::IncludeLine) {
                        if self.options.resync {
                            index += rest_of_line(rest).len();
                            continue;
                        }
                        break;
                    }
                    index += "include".len();
                    index += skip_blanks(&content[index..]);

                    let name: String = content[index..]
                        .chars()
                        .take_while(|c| c.is_ascii_alphanumeric() || *c == ':' || *c == '_')
                        .collect();
                    index += name.len();
                    block.push(Statement::Include(Include { name }));
                }
                _ if rest.starts_with("case") => {
                    if !self.check(statement_head(rest), line, Rule::CaseLine) {
                        if self.options.resync {
                            index += rest_of_line(rest).len();
                            continue;
                        }
                        break;
                    }
                    index += "case".len();

                    let (head, size) = header(&content[index..])?;
                    line += count_newlines(head) - 1;
                    index += size;

                    let end = matching_end_brace(content, index)?;
                    let span = &content[index..end];
                    let case = self.walk_case(span, head.trim(), line)?;
                    block.push(Statement::Case(case));

                    line += count_newlines(span) - 1;
                    index = end;
                }
                _ if rest.starts_with("class") => {
                    if !self.check(statement_head(rest), line, Rule::ClassLine) {
                        if self.options.resync {
                            index += rest_of_line(rest).len();
                            continue;
                        }
                        break;
                    }
                    index += "class".len();

                    let (head, size) = header(&content[index..])?;
                    line += count_newlines(head) - 1;
                    index += size;

                    let end = matching_end_brace(content, index)?;
                    let span = &content[index..end];
                    let class = self.walk_class(span, class_name(head), line)?;
                    block.push(Statement::Class(class));

                    line += count_newlines(span) - 1;
                    index = end;
                }
                byte => {
                    let text = rest_of_line(rest);
                    let kind = if text.contains("=>") {
                        None
                    } else {
                        ResourceType::match_prefix(rest)
                    };

                    match kind {
                        Some(kind) => {
                            if !self.check(text, line, Rule::ResourceFirstLine) {
                                let skipped = skip_malformed(rest)?;
                                line += count_newlines(&rest[..skipped]) - 1;
                                index += skipped;
                                continue;
                            }
                            index += kind.keyword().len();

                            let (_, size) = find_until(&content[index..], '{', None)?;
                            index += size;

                            let end = matching_end_brace(content, index)?;
                            let span = &content[index..end];
                            let resource = self.walk_resource(span, kind, line)?;
                            block.push(Statement::Resource(resource));

                            line += count_newlines(span) - 1;
                            index = end;
                        }
                        None if is_blank(byte) => index += 1,
                        None => {
                            self.unimplemented(text, line);
                            index += text.len().max(1);
                        }
                    }
                }
            }
        }

        Ok(block)
    }

    fn unimplemented(&mut self, text: &str, line: usize) {
        self.diagnostics.log(
            self.file,
            Severity::Debug,
            Position::line(line),
            "Unimplemented?",
            text,
        );
    }
}

pub(crate) fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r')
}

fn skip_blanks(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

/// The current line including its line break.
pub(crate) fn line_with_break(text: &str) -> &str {
    match text.find('\n') {
        Some(end) => &text[..=end],
        None => text,
    }
}

/// Header of a `case`/`class` statement through the end of the line holding its '{'.
fn statement_head(text: &str) -> &str {
    match find_open_brace(text) {
        Some(brace) => &text[..brace + line_with_break(&text[brace..]).len()],
        None => line_with_break(text),
    }
}

/// Text before the '{' opening a `case`/`class` body, and its length.
fn header(text: &str) -> Result<(&str, usize), ScanError> {
    let size = find_open_brace(text).ok_or(ScanError::Missing { target: '{' })?;
    Ok((&text[..size], size))
}

/// Identifier portion of a class header, dropping parameters and `inherits`.
fn class_name(head: &str) -> &str {
    let head = head.trim_start();
    let end = head
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == ':' || c == '_'))
        .unwrap_or(head.len());
    &head[..end]
}

/// Length of a malformed resource: through its matching '}' when the header
/// opens a brace, otherwise up to the next '}'.
fn skip_malformed(rest: &str) -> Result<usize, ScanError> {
    let line = rest_of_line(rest);
    match line.find('{') {
        Some(open) => matching_end_brace(rest, open),
        None => find_until(rest, '}', None).map(|(_, size)| size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Resource, ResourceType};
    use pretty_assertions::assert_eq;

    fn walk(text: &str) -> (File, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let file = parse("test.pp", text, &mut diagnostics, &WalkOptions::default()).unwrap();
        (file, diagnostics)
    }

    fn top(file: &File) -> &Block {
        match file.items.as_slice() {
            [Statement::Block(block)] => block,
            other => panic!("expected a single top-level block, got {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_file_is_rejected() {
        let (file, diagnostics) = walk("class a {\n  include b\n");
        assert!(file.items.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.entries()[0].severity, Severity::Fatal);
        assert_eq!(diagnostics.entries()[0].position, Position::unknown());
        assert!(diagnostics.entries()[0].message.contains("end braces"));

        let (file, diagnostics) = walk("}\n");
        assert!(file.items.is_empty());
        assert!(diagnostics.entries()[0].message.contains("start braces"));
    }

    #[test]
    fn test_braces_in_comments_are_ignored() {
        let (file, diagnostics) = walk("# {\ninclude ntp\n");
        assert!(diagnostics.is_empty());
        assert_eq!(top(&file).len(), 1);
    }

    #[test]
    fn test_variable() {
        let (file, _) = walk("$servers = ['a', 'b']\n$x=1");
        assert_eq!(
            top(&file).items,
            vec![
                Statement::Variable(Variable {
                    name: "servers".to_string(),
                    value: "['a', 'b']".to_string(),
                }),
                Statement::Variable(Variable {
                    name: "x".to_string(),
                    value: "1".to_string(),
                }),
            ]
        );
    }

    #[test]
    fn test_include() {
        let (file, diagnostics) = walk("include apache::mod::ssl\ninclude ntp\n");
        assert!(diagnostics.is_empty());
        assert_eq!(
            top(&file).items,
            vec![
                Statement::Include(Include {
                    name: "apache::mod::ssl".to_string()
                }),
                Statement::Include(Include {
                    name: "ntp".to_string()
                }),
            ]
        );
    }

    #[test]
    fn test_failed_include_aborts_rest_of_block() {
        let (file, diagnostics) = walk("include ntp\ninclude a, b\ninclude c\n");
        assert_eq!(top(&file).len(), 1);
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert_eq!(diagnostics.entries()[0].position.line, 2);
    }

    #[test]
    fn test_failed_include_resyncs_when_enabled() {
        let mut diagnostics = Diagnostics::new();
        let options = WalkOptions { resync: true };
        let file = parse("t.pp", "include a, b\ninclude c\n", &mut diagnostics, &options).unwrap();
        assert_eq!(
            top(&file).items,
            vec![Statement::Include(Include {
                name: "c".to_string()
            })]
        );
    }

    #[test]
    fn test_resource() {
        let (file, diagnostics) = walk(
            "file { '/etc/motd':\n  ensure  => file,\n  content => 'hello',\n}\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
        assert_eq!(
            top(&file).items,
            vec![Statement::Resource(Resource {
                kind: ResourceType::File,
                name: "/etc/motd".to_string(),
                attributes: vec!["ensure  => file,".to_string(), "content => 'hello',".to_string()],
                dependency: false,
            })]
        );
    }

    #[test]
    fn test_dependency_chain_flags_left_resource() {
        let (file, diagnostics) = walk(
            "package { 'ntp':\n  ensure => installed,\n} ->\nservice { 'ntp':\n  ensure => running,\n}\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
        let flags: Vec<bool> = top(&file)
            .items
            .iter()
            .map(|s| match s {
                Statement::Resource(r) => r.dependency,
                _ => panic!("expected resources"),
            })
            .collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_dependency_after_non_resource_is_error() {
        let (file, diagnostics) = walk("include ntp\n->\n");
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert_eq!(diagnostics.entries()[0].message, "Dependency definition invalid");
        assert_eq!(diagnostics.entries()[0].position.line, 2);
        assert_eq!(top(&file).len(), 1);

        let (_, diagnostics) = walk("->\n");
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_class_with_nested_statements() {
        let (file, diagnostics) = walk(
            "class ntp (\n  $servers = [],\n) inherits ntp::params {\n  include ntp::install\n  service { 'ntp':\n    ensure => running,\n  }\n}\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
        match top(&file).items.as_slice() {
            [Statement::Class(class)] => {
                assert_eq!(class.name, "ntp");
                assert_eq!(class.body.len(), 2);
                assert!(matches!(class.body.items[1], Statement::Resource(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_case_statement() {
        let (file, diagnostics) = walk(
            "case $facts['os']['family'] {\n  'Debian': {\n    include apt\n  }\n  \"RedHat\": {\n    include yum\n    $repo = 'epel'\n  }\n}\ninclude after\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());

        let block = top(&file);
        assert_eq!(block.len(), 2);
        match &block.items[0] {
            Statement::Case(case) => {
                assert_eq!(case.discriminant, "$facts['os']['family']");
                assert_eq!(case.items.len(), 2);
                assert_eq!(case.items[0].literal, "Debian");
                assert_eq!(case.items[1].literal, "RedHat");
                assert_eq!(case.items[1].body.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_class_keeps_previous_siblings() {
        let (file, diagnostics) = walk("include a\nclass Bad {\n  include b\n}\ninclude c\n");
        assert_eq!(top(&file).len(), 1);
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_class_with_hash_default_parameter() {
        let (file, diagnostics) = walk("class a ($h = {}, $n = 1) {\n  include b\n}\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
        match top(&file).items.as_slice() {
            [Statement::Class(class)] => {
                assert_eq!(class.name, "a");
                assert_eq!(class.body.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_case_keeps_previous_siblings() {
        let (file, diagnostics) = walk("include a\ncase {\n  'x': {\n  }\n}\ninclude c\n");
        assert_eq!(
            top(&file).items,
            vec![Statement::Include(Include {
                name: "a".to_string()
            })]
        );
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert_eq!(diagnostics.entries()[0].position.line, 2);
    }

    #[test]
    fn test_failed_case_resyncs_when_enabled() {
        let mut diagnostics = Diagnostics::new();
        let options = WalkOptions { resync: true };
        let file = parse(
            "t.pp",
            "include a\ncase {\n  'x': {\n  }\n}\ninclude c\n",
            &mut diagnostics,
            &options,
        )
        .unwrap();
        let names: Vec<&str> = top(&file)
            .items
            .iter()
            .map(|s| match s {
                Statement::Include(include) => include.name.as_str(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_failed_class_resyncs_when_enabled() {
        let mut diagnostics = Diagnostics::new();
        let options = WalkOptions { resync: true };
        let file = parse(
            "t.pp",
            "class Bad {\n  include b\n}\ninclude c\n",
            &mut diagnostics,
            &options,
        )
        .unwrap();
        assert_eq!(top(&file).len(), 2);
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let (file, diagnostics) = walk(
            "include ntp\r\nfile { '/x':\r\n  ensure => file,\r\n}\r\ninclude b\r\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.entries());
        assert_eq!(top(&file).len(), 3);
        match &top(&file).items[1] {
            Statement::Resource(resource) => {
                assert_eq!(resource.attributes, vec!["ensure => file,".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_resource_is_skipped() {
        let (file, diagnostics) = walk(
            "file { $path:\n  ensure => file,\n}\ninclude ntp\n",
        );
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert_eq!(
            top(&file).items,
            vec![Statement::Include(Include {
                name: "ntp".to_string()
            })]
        );
    }

    #[test]
    fn test_unrecognized_line_logs_once() {
        let (file, diagnostics) = walk("if $x {\n  include a\n}\n");
        assert_eq!(diagnostics.count(Severity::Debug), 1);
        assert_eq!(diagnostics.entries()[0].text, "if $x {");
        assert_eq!(top(&file).len(), 1);
    }

    #[test]
    fn test_unrecognized_non_ascii_line_makes_progress() {
        let (file, diagnostics) = walk("é unknown\n");
        assert_eq!(diagnostics.count(Severity::Debug), 1);
        assert!(top(&file).is_empty());
    }

    #[test]
    fn test_attribute_line_mentioning_type_is_not_a_resource() {
        let (file, diagnostics) = walk("user => 'root'\n");
        assert!(top(&file).is_empty());
        assert_eq!(diagnostics.count(Severity::Debug), 1);
    }

    #[test]
    fn test_line_numbers_after_nested_span() {
        let (_, diagnostics) = walk("class a {\n  include b\n}\n\nbogus\n");
        assert_eq!(diagnostics.entries()[0].position.line, 5);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(class_name(" ntp::config (\n $x = 1,\n) "), "ntp::config");
        assert_eq!(statement_head("class a {\n b\n}"), "class a {\n");
        assert_eq!(statement_head("class a ($h = {}) {\n b\n}"), "class a ($h = {}) {\n");
        assert_eq!(line_with_break("a\nb"), "a\n");
        assert_eq!(skip_malformed("file { $x:\n a => b,\n}\nrest"), Ok(21));
    }
}
