//! Environment marker expressions (PEP 508-style).
//!
//! A marker is a boolean expression over a fixed set of environment
//! variables (`python_version`, `sys_platform`, `platform_system`, `os_name`,
//! `extra`, ...) combined with `and`/`or`, parentheses, and comparison
//! operators (`==`, `!=`, `<`, `<=`, `>`, `>=`, `in`, `not in`). The resolver
//! evaluates a dependency's marker against a fixed [`Environment`] snapshot
//! before constraints are ever considered; a dependency whose marker
//! evaluates `false` is pruned outright.

use crate::version::Version;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error returned when a marker expression cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of marker expression")]
    UnexpectedEof,
    #[error("unexpected token in marker expression: {0}")]
    UnexpectedToken(String),
    #[error("unknown marker variable: {0}")]
    UnknownVariable(String),
}

/// A fixed snapshot of the environment a marker is evaluated against.
#[derive(Debug, Clone)]
pub struct Environment {
    values: HashMap<String, String>,
}

impl Environment {
    /// Build an environment from explicit `(variable, value)` pairs.
    #[must_use]
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// The current process's own environment: `sys_platform` from
    /// `std::env::consts::OS`, `platform_system` likewise, and
    /// `python_version`/`implementation_name` left unset unless supplied
    /// explicitly, since this resolver never runs inside the target
    /// ecosystem's own interpreter.
    #[must_use]
    pub fn current() -> Self {
        let mut values = HashMap::new();
        values.insert("sys_platform".to_string(), std::env::consts::OS.to_string());
        values.insert("os_name".to_string(), std::env::consts::OS.to_string());
        values.insert(
            "platform_machine".to_string(),
            std::env::consts::ARCH.to_string(),
        );
        Self { values }
    }

    /// Look up a variable's value, returning `""` when unset so comparisons
    /// against an unset variable fail cleanly rather than erroring.
    #[must_use]
    pub fn get(&self, variable: &str) -> &str {
        self.values.get(variable).map_or("", String::as_str)
    }

    /// Override or insert a variable, e.g. `extra` during an extras-aware
    /// resolve pass.
    pub fn set(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.values.insert(variable.into(), value.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

const KNOWN_VARIABLES: &[&str] = &[
    "python_version",
    "python_full_version",
    "os_name",
    "sys_platform",
    "platform_machine",
    "platform_python_implementation",
    "platform_release",
    "platform_system",
    "platform_version",
    "implementation_name",
    "implementation_version",
    "extra",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// A single comparison, e.g. `python_version >= "3.8"`.
#[derive(Debug, Clone)]
struct Comparison {
    variable: String,
    op: CmpOp,
    literal: String,
}

impl Comparison {
    fn eval(&self, env: &Environment) -> bool {
        let value = env.get(&self.variable);
        match self.op {
            CmpOp::Eq => value == self.literal,
            CmpOp::Ne => value != self.literal,
            CmpOp::In => self.literal.contains(value),
            CmpOp::NotIn => !self.literal.contains(value),
            CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
                match (Version::parse(value), Version::parse(&self.literal)) {
                    (Ok(v), Ok(l)) => match self.op {
                        CmpOp::Lt => v < l,
                        CmpOp::Le => v <= l,
                        CmpOp::Gt => v > l,
                        CmpOp::Ge => v >= l,
                        _ => unreachable!(),
                    },
                    _ => false,
                }
            }
        }
    }
}

/// A marker expression's abstract syntax tree.
#[derive(Debug, Clone)]
pub enum Marker {
    Compare(CompareNode),
    And(Box<Marker>, Box<Marker>),
    Or(Box<Marker>, Box<Marker>),
}

#[derive(Debug, Clone)]
pub struct CompareNode(Comparison);

impl Marker {
    /// Parse a marker expression string.
    ///
    /// # Errors
    /// Returns [`ParseError`] on malformed input or an unrecognized
    /// variable name.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens: &tokens, pos: 0 };
        let marker = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(ParseError::UnexpectedToken(
                parser.tokens[parser.pos].clone(),
            ));
        }
        Ok(marker)
    }

    /// Evaluate the marker against `env`.
    #[must_use]
    pub fn evaluate(&self, env: &Environment) -> bool {
        match self {
            Self::Compare(CompareNode(c)) => c.eval(env),
            Self::And(a, b) => a.evaluate(env) && b.evaluate(env),
            Self::Or(a, b) => a.evaluate(env) || b.evaluate(env),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(CompareNode(c)) => {
                let op = match c.op {
                    CmpOp::Eq => "==",
                    CmpOp::Ne => "!=",
                    CmpOp::Lt => "<",
                    CmpOp::Le => "<=",
                    CmpOp::Gt => ">",
                    CmpOp::Ge => ">=",
                    CmpOp::In => "in",
                    CmpOp::NotIn => "not in",
                };
                write!(f, "{} {} \"{}\"", c.variable, op, c.literal)
            }
            Self::And(a, b) => write!(f, "{a} and {b}"),
            Self::Or(a, b) => write!(f, "({a}) or ({b})"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '(' || c == ')' {
            tokens.push(c.to_string());
            i += 1;
        } else if c == '"' || c == '\'' {
            let quote = c;
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && chars[j] != quote {
                j += 1;
            }
            if j >= chars.len() {
                return Err(ParseError::UnexpectedEof);
            }
            tokens.push(format!("\"{}\"", chars[start..j].iter().collect::<String>()));
            i = j + 1;
        } else if "=!<>".contains(c) {
            let mut op = c.to_string();
            if i + 1 < chars.len() && chars[i + 1] == '=' {
                op.push('=');
                i += 2;
            } else {
                i += 1;
            }
            tokens.push(op);
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() && !"()\"'=!<>".contains(chars[i]) {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn bump(&mut self) -> Result<String, ParseError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(tok)
    }

    fn parse_or(&mut self) -> Result<Marker, ParseError> {
        let mut node = self.parse_and()?;
        while self.peek() == Some("or") {
            self.pos += 1;
            let rhs = self.parse_and()?;
            node = Marker::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Marker, ParseError> {
        let mut node = self.parse_atom()?;
        while self.peek() == Some("and") {
            self.pos += 1;
            let rhs = self.parse_atom()?;
            node = Marker::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<Marker, ParseError> {
        if self.peek() == Some("(") {
            self.pos += 1;
            let inner = self.parse_or()?;
            let close = self.bump()?;
            if close != ")" {
                return Err(ParseError::UnexpectedToken(close));
            }
            return Ok(inner);
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Marker, ParseError> {
        let lhs = self.bump()?;
        let (variable, literal_lhs) = unwrap_literal_or_var(&lhs)?;

        let op_tok = self.bump()?;
        let op = match op_tok.as_str() {
            "==" => CmpOp::Eq,
            "!=" => CmpOp::Ne,
            "<" => CmpOp::Lt,
            "<=" => CmpOp::Le,
            ">" => CmpOp::Gt,
            ">=" => CmpOp::Ge,
            "in" => CmpOp::In,
            "not" => {
                let next = self.bump()?;
                if next != "in" {
                    return Err(ParseError::UnexpectedToken(next));
                }
                CmpOp::NotIn
            }
            other => return Err(ParseError::UnexpectedToken(other.to_string())),
        };

        let rhs = self.bump()?;
        let (rhs_variable, literal_rhs) = unwrap_literal_or_var(&rhs)?;

        // Exactly one side must be the bare identifier (the marker
        // variable); the other carries the quoted literal.
        let (variable, literal) = match (variable, literal_lhs, rhs_variable, literal_rhs) {
            (Some(v), None, None, Some(l)) => (v, l),
            (None, Some(l), Some(v), None) => (v, l),
            _ => return Err(ParseError::UnexpectedToken(format!("{lhs} {op_tok} {rhs}"))),
        };

        if !KNOWN_VARIABLES.contains(&variable.as_str()) {
            return Err(ParseError::UnknownVariable(variable));
        }

        Ok(Marker::Compare(CompareNode(Comparison {
            variable,
            op,
            literal,
        })))
    }
}

fn unwrap_literal_or_var(tok: &str) -> Result<(Option<String>, Option<String>), ParseError> {
    if let Some(inner) = tok.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Ok((None, Some(inner.to_string())))
    } else {
        Ok((Some(tok.to_string()), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> Environment {
        let mut m = HashMap::new();
        for (k, v) in pairs {
            m.insert((*k).to_string(), (*v).to_string());
        }
        Environment::new(m)
    }

    #[test]
    fn simple_equality() {
        let m = Marker::parse(r#"sys_platform == "linux""#).unwrap();
        assert!(m.evaluate(&env_with(&[("sys_platform", "linux")])));
        assert!(!m.evaluate(&env_with(&[("sys_platform", "darwin")])));
    }

    #[test]
    fn literal_on_left_is_accepted() {
        let m = Marker::parse(r#""linux" == sys_platform"#).unwrap();
        assert!(m.evaluate(&env_with(&[("sys_platform", "linux")])));
    }

    #[test]
    fn and_or_precedence() {
        let m = Marker::parse(
            r#"python_version >= "3.7" and sys_platform == "linux" or sys_platform == "darwin""#,
        )
        .unwrap();
        assert!(m.evaluate(&env_with(&[
            ("python_version", "3.9"),
            ("sys_platform", "linux")
        ])));
        assert!(m.evaluate(&env_with(&[
            ("python_version", "2.7"),
            ("sys_platform", "darwin")
        ])));
        assert!(!m.evaluate(&env_with(&[
            ("python_version", "2.7"),
            ("sys_platform", "linux")
        ])));
    }

    #[test]
    fn parentheses_group() {
        let m = Marker::parse(
            r#"(sys_platform == "linux" or sys_platform == "darwin") and python_version >= "3.8""#,
        )
        .unwrap();
        assert!(m.evaluate(&env_with(&[
            ("sys_platform", "darwin"),
            ("python_version", "3.9")
        ])));
        assert!(!m.evaluate(&env_with(&[
            ("sys_platform", "win32"),
            ("python_version", "3.9")
        ])));
    }

    #[test]
    fn extra_in_operator() {
        let m = Marker::parse(r#"extra in "test,dev""#).unwrap();
        assert!(m.evaluate(&env_with(&[("extra", "test")])));
        assert!(!m.evaluate(&env_with(&[("extra", "prod")])));
    }

    #[test]
    fn unknown_variable_rejected() {
        assert!(Marker::parse(r#"nonsense_var == "1""#).is_err());
    }

    #[test]
    fn unset_variable_compares_false_not_error() {
        let m = Marker::parse(r#"implementation_name == "cpython""#).unwrap();
        assert!(!m.evaluate(&env_with(&[])));
    }
}
