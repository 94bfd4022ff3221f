//! Template engine for mail bodies.
//!
//! A small Handlebars-style engine:
//!
//! - Variable expansion: `{{variable}}`
//! - Escaping: `\{{` to output a literal `{{`
//!
//! Template sources are parsed when the document is loaded, so syntax
//! errors surface at load time. Referencing a variable that is not one
//! of the resolved mail fields is a render-time error.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use thiserror::Error;

/// Template-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Parse error in the template source.
    #[error("template parse error: {0}")]
    Parse(String),

    /// The template references a variable that does not exist.
    #[error("undefined template variable: {0}")]
    UndefinedVariable(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// A node in the parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Raw text content.
    Text(String),
    /// Variable reference: `{{name}}`.
    Variable(String),
}

/// Template parser.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        while self.pos < self.input.len() {
            if self.rest().starts_with("\\{{") {
                self.pos += 3;
                nodes.push(Node::Text("{{".to_string()));
            } else if self.rest().starts_with("{{") {
                nodes.push(self.parse_tag()?);
            } else {
                let text = self.collect_text();
                if !text.is_empty() {
                    nodes.push(Node::Text(text));
                }
            }
        }

        Ok(nodes)
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Parse a `{{name}}` tag. The opening braces are still pending.
    fn parse_tag(&mut self) -> Result<Node> {
        self.pos += 2;
        self.skip_whitespace();

        let name = self.parse_identifier()?;
        self.skip_whitespace();

        if !self.rest().starts_with("}}") {
            return Err(TemplateError::Parse(format!(
                "unclosed tag for variable '{name}'"
            )));
        }
        self.pos += 2;

        Ok(Node::Variable(name))
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.rest().chars().next() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(TemplateError::Parse(format!(
                "expected variable name at byte {start}"
            )));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Collect raw text until the next tag or escape sequence.
    fn collect_text(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("{{") || rest.starts_with("\\{{") {
                break;
            }
            let c = rest.chars().next().expect("non-empty rest");
            self.pos += c.len_utf8();
        }
        self.input[start..self.pos].to_string()
    }
}

/// A parsed template retaining its raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse a template from its source string.
    pub fn parse(source: &str) -> Result<Self> {
        let nodes = Parser::new(source).parse()?;
        Ok(Self {
            raw: source.to_string(),
            nodes,
        })
    }

    /// The raw template source.
    pub fn source(&self) -> &str {
        &self.raw
    }

    /// Render the template against the given variables.
    ///
    /// Every variable referenced by the template must be present in the
    /// map; a missing variable is an error rather than an empty string,
    /// so typos in field names do not silently vanish from the mail.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String> {
        let mut output = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => output.push_str(text),
                Node::Variable(name) => match vars.get(name) {
                    Some(value) => output.push_str(value),
                    None => return Err(TemplateError::UndefinedVariable(name.clone())),
                },
            }
        }
        Ok(output)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        Template::parse(s)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Template::parse(&raw).map_err(de::Error::custom)
    }
}
