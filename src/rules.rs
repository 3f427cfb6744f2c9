//! @ai:module:intent Fixed registry of pattern-backed lint rules
//! @ai:module:layer domain
//! @ai:module:public_api Rule, RuleViolation
//! @ai:module:depends_on diagnostics
//! @ai:module:stateless true

use crate::diagnostics::Severity;
use regex::Regex;

macro_rules! compile {
    ($pattern:expr) => {{
        use std::sync::OnceLock;
        static REGEX: OnceLock<Regex> = OnceLock::new();
        REGEX.get_or_init(|| Regex::new($pattern).unwrap_or_else(|e| panic!("{}", e)))
    }};
}

// A single- or double-quoted literal on one line.
const QUOTED: &str = r#"(?:'[^'\n]*'|"[^"\n]*")"#;

/// @ai:intent Identifier of a lint rule; each maps to a fixed severity, message and pattern
/// @ai:invariant patterns are anchored at the start of the evaluated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    IncludeLine,
    CaseLine,
    ClassLine,
    CaseItemLine,
    ResourceFirstLine,
    ResourceItemPointer,
    ResourceItemValue,
    ResourceItemComma,
    ResourceItemCommaWarn,
    ResourceItemCommaNextLineEnd,
}

/// @ai:intent Outcome of a rule that did not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub rule: Rule,
    pub severity: Severity,
    pub message: &'static str,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::IncludeLine,
        Rule::CaseLine,
        Rule::ClassLine,
        Rule::CaseItemLine,
        Rule::ResourceFirstLine,
        Rule::ResourceItemPointer,
        Rule::ResourceItemValue,
        Rule::ResourceItemComma,
        Rule::ResourceItemCommaWarn,
        Rule::ResourceItemCommaNextLineEnd,
    ];

    /// @ai:intent Severity logged when the rule fails
    pub fn severity(self) -> Severity {
        match self {
            Rule::ResourceItemCommaWarn => Severity::Warning,
            Rule::ResourceItemCommaNextLineEnd => Severity::Debug,
            _ => Severity::Error,
        }
    }

    /// @ai:intent Message logged when the rule fails
    pub fn message(self) -> &'static str {
        match self {
            Rule::IncludeLine => "Include statement invalid, expected 'include <class>' alone on its line",
            Rule::CaseLine => "Case statement invalid, expected 'case <expression> {'",
            Rule::ClassLine => "Class definition invalid, expected 'class <name> {'",
            Rule::CaseItemLine => "Case item invalid, expected '<value>': {",
            Rule::ResourceFirstLine => "Resource definition invalid, expected \"<type> { '<title>':\"",
            Rule::ResourceItemPointer => "Resource attribute invalid, expected '<attribute> =>'",
            Rule::ResourceItemValue => "Resource attribute value invalid",
            Rule::ResourceItemComma => "Resource attribute should end with a comma",
            Rule::ResourceItemCommaWarn => "Last resource attribute should end with a comma",
            Rule::ResourceItemCommaNextLineEnd => "Resource attribute is not followed by the end of the resource",
        }
    }

    /// @ai:intent Compiled pattern of the rule, built once per process
    pub fn pattern(self) -> &'static Regex {
        match self {
            Rule::IncludeLine => compile!(r"^include[ \t]+[A-Za-z0-9_:]+[ \t]*(?:\n|$)"),
            Rule::CaseLine => compile!(r"^case[ \t]+[^\s{][^\n{]*\{[ \t]*(?:\n|$)"),
            Rule::ClassLine => compile!(concat!(
                r"^class[ \t]+[a-z][a-z0-9_]*(?:::[a-z][a-z0-9_]*)*",
                r"(?:\s*\([^)]*\))?",
                r"(?:[ \t]+inherits[ \t]+[a-z0-9_:]+)?",
                r"[ \t]*\{[ \t]*(?:\n|$)"
            )),
            Rule::CaseItemLine => compile!(&format!(
                r"^{q}(?:[ \t]*,[ \t]*{q})*[ \t]*:[ \t]*\{{",
                q = QUOTED
            )),
            Rule::ResourceFirstLine => compile!(&format!(
                r"^[a-z][a-z0-9_]*(?:::[a-z][a-z0-9_]*)*[ \t]*\{{[ \t]*{q}[ \t]*:[ \t]*$",
                q = QUOTED
            )),
            Rule::ResourceItemPointer => compile!(r"^[a-z][a-z0-9_]*[ \t]*=>"),
            Rule::ResourceItemValue => compile!(&format!(
                concat!(
                    r"^[a-z][a-z0-9_]*[ \t]+=>[ \t]+",
                    r"(?:{q}|\$\{{?[A-Za-z_:][\w:]*\}}?|-?\d+(?:\.\d+)?",
                    r"|true|false|undef|\[|\{{|[A-Z][\w:]*\[|[a-z][\w:]*)"
                ),
                q = QUOTED
            )),
            Rule::ResourceItemComma | Rule::ResourceItemCommaWarn => {
                compile!(r"^[^\n]*,[ \t]*$")
            }
            Rule::ResourceItemCommaNextLineEnd => compile!(r"^[^\n]*[^,\s][ \t]*\}[ \t]*$"),
        }
    }

    /// @ai:intent Evaluate the rule against text without side effects
    /// @ai:effects pure
    pub fn evaluate(self, text: &str) -> Result<(), RuleViolation> {
        if self.is_match(text) {
            Ok(())
        } else {
            Err(RuleViolation {
                rule: self,
                severity: self.severity(),
                message: self.message(),
            })
        }
    }

    pub fn is_match(self, text: &str) -> bool {
        self.pattern().is_match(text)
    }
}
