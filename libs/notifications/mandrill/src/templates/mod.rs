//! Mail body templates backed by Handlebars.
//!
//! A `MailTemplate` is compiled once when it is created, so syntax errors
//! surface before any send is attempted. HTML templates escape substituted
//! values; text templates insert them verbatim.
//!
//! Supports:
//! - Variables: `{{name}}`
//! - Conditionals: `{{#if condition}}...{{/if}}`
//! - Raw HTML in HTML templates: `{{{unescaped}}}`

use crate::error::MailResult;
use handlebars::Handlebars;
use std::collections::HashMap;
use std::fmt;

/// Whether substituted values are HTML-escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Html,
    Text,
}

/// A named, pre-compiled mail template
#[derive(Clone)]
pub struct MailTemplate {
    name: String,
    kind: TemplateKind,
    blank: bool,
    registry: Handlebars<'static>,
}

impl MailTemplate {
    /// Compile an HTML template. Values are HTML-escaped when rendered.
    pub fn html(name: impl Into<String>, source: &str) -> MailResult<Self> {
        Self::compile(name.into(), source, TemplateKind::Html)
    }

    /// Compile a plain text template. Values are inserted as-is.
    pub fn text(name: impl Into<String>, source: &str) -> MailResult<Self> {
        Self::compile(name.into(), source, TemplateKind::Text)
    }

    fn compile(name: String, source: &str, kind: TemplateKind) -> MailResult<Self> {
        let mut registry = Handlebars::new();
        if kind == TemplateKind::Text {
            registry.register_escape_fn(handlebars::no_escape);
        }
        registry.register_template_string(&name, source)?;

        Ok(Self {
            name,
            kind,
            blank: source.trim().is_empty(),
            registry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// True when the source was empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Execute the template against the given variables
    pub fn render(&self, vars: &HashMap<String, String>) -> MailResult<String> {
        Ok(self.registry.render(&self.name, vars)?)
    }
}

impl fmt::Debug for MailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailTemplate")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}
