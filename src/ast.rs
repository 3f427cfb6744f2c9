//! @ai:module:intent Define the typed tree produced by walking a manifest
//! @ai:module:layer domain
//! @ai:module:public_api File, Block, Statement, Class, Case, CaseItem, Resource, ResourceType, Include, Variable
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Parsed manifest; in practice holds one top-level Block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct File {
    pub path: String,
    pub items: Vec<Statement>,
}

/// @ai:intent Ordered statements of a brace-delimited body or a whole file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub items: Vec<Statement>,
}

/// @ai:intent Any node that can appear inside a Block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Block(Block),
    Variable(Variable),
    Include(Include),
    Class(Class),
    Case(Case),
    Resource(Resource),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Case {
    pub discriminant: String,
    pub items: Vec<CaseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseItem {
    pub literal: String,
    pub body: Block,
}

/// @ai:intent A typed, titled declaration with raw attribute lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub name: String,
    pub attributes: Vec<String>,
    pub dependency: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Include {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// @ai:intent Closed vocabulary of recognized resource types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Augeas,
    Cron,
    Exec,
    File,
    Group,
    Host,
    Mount,
    Notify,
    Package,
    Service,
    SshAuthorizedKey,
    Tidy,
    User,
    Yumrepo,
}

/// Sorted by keyword.
const VOCABULARY: [(&str, ResourceType); 14] = [
    ("augeas", ResourceType::Augeas),
    ("cron", ResourceType::Cron),
    ("exec", ResourceType::Exec),
    ("file", ResourceType::File),
    ("group", ResourceType::Group),
    ("host", ResourceType::Host),
    ("mount", ResourceType::Mount),
    ("notify", ResourceType::Notify),
    ("package", ResourceType::Package),
    ("service", ResourceType::Service),
    ("ssh_authorized_key", ResourceType::SshAuthorizedKey),
    ("tidy", ResourceType::Tidy),
    ("user", ResourceType::User),
    ("yumrepo", ResourceType::Yumrepo),
];

impl ResourceType {
    pub fn keyword(self) -> &'static str {
        VOCABULARY
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(keyword, _)| *keyword)
            .unwrap_or_default()
    }

    /// @ai:intent Resource type whose keyword prefixes the text, when exactly one does
    /// @ai:post None when zero or several keywords match
    /// @ai:example ("service { 'ntp':") -> Some(Service)
    /// @ai:example ("classy") -> None
    /// @ai:effects pure
    pub fn match_prefix(text: &str) -> Option<ResourceType> {
        // a keyword that prefixes `text` sorts at or before it
        let upper = VOCABULARY.partition_point(|(keyword, _)| *keyword <= text);
        let mut candidates = VOCABULARY[..upper]
            .iter()
            .filter(|(keyword, _)| text.starts_with(keyword));

        match (candidates.next(), candidates.next()) {
            (Some((_, kind)), None) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl File {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    /// @ai:intent Visit every statement of the file depth-first, parents before children
    /// @ai:effects pure
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Statement)) {
        for item in &self.items {
            item.visit(&mut *f);
        }
    }
}

impl Block {
    pub fn push(&mut self, statement: Statement) {
        self.items.push(statement);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Statement {
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Statement)) {
        f(self);
        let children: &'a [Statement] = match self {
            Statement::Block(block) => &block.items,
            Statement::Class(class) => &class.body.items,
            Statement::Case(case) => {
                for item in &case.items {
                    for statement in &item.body.items {
                        statement.visit(&mut *f);
                    }
                }
                return;
            }
            Statement::Variable(_) | Statement::Include(_) | Statement::Resource(_) => &[],
        };
        for statement in children {
            statement.visit(&mut *f);
        }
    }
}

impl Resource {
    pub fn new(kind: ResourceType) -> Self {
        Self {
            kind,
            name: String::new(),
            attributes: Vec::new(),
            dependency: false,
        }
    }

    /// @ai:intent Mark the resource as ordered before the next one via '->'
    pub fn set_dependency(&mut self) {
        self.dependency = true;
    }
}
