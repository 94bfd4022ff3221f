//! Body rendering for resolved mails.

use std::collections::HashMap;
use std::fmt;

use crate::mail::tree::ResolvedMail;
use crate::template;

/// Separator placed between the HTML and text bodies when both are set.
const BODY_SEPARATOR: &str = "\n---------------\n";

impl ResolvedMail {
    /// The substitution variables a template may reference: exactly the
    /// resolved mail's own fields, as strings. The literal `text` and
    /// `html` fields are exposed, so a text template may reference the
    /// html field and vice versa.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let f = &self.fields;
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), f.title.clone());
        vars.insert(
            "date".to_string(),
            f.date.map(|d| d.to_string()).unwrap_or_default(),
        );
        vars.insert("attach".to_string(), f.attach.join(", "));
        vars.insert("text".to_string(), f.text.clone());
        vars.insert("html".to_string(), f.html.clone());
        vars.insert("from".to_string(), f.from.to_string());
        vars.insert("to".to_string(), f.to.to_string());
        vars.insert("cc".to_string(), f.cc.to_string());
        vars.insert("bcc".to_string(), f.bcc.to_string());
        vars
    }

    /// Render the plain-text channel: template expansion when a text
    /// template is set, otherwise the literal `text` field unchanged.
    pub fn render_text(&self) -> template::Result<String> {
        match &self.fields.text_template {
            Some(tmpl) => tmpl.render(&self.template_vars()),
            None => Ok(self.fields.text.clone()),
        }
    }

    /// Render the HTML channel: template expansion when an HTML
    /// template is set, otherwise the literal `html` field unchanged.
    pub fn render_html(&self) -> template::Result<String> {
        match &self.fields.html_template {
            Some(tmpl) => tmpl.render(&self.template_vars()),
            None => Ok(self.fields.html.clone()),
        }
    }

    /// Render the combined body. With only one channel set the rendered
    /// channel is returned; with both, the HTML comes first, separated
    /// from the text by a dashed rule; with neither, an empty string.
    ///
    /// The channel selection looks at the literal fields, matching the
    /// per-channel fallback behavior of `render_text`/`render_html`.
    pub fn render_body(&self) -> template::Result<String> {
        match (self.fields.text.is_empty(), self.fields.html.is_empty()) {
            (false, true) => self.render_text(),
            (true, false) => self.render_html(),
            (false, false) => {
                let html = self.render_html()?;
                let text = self.render_text()?;
                Ok(format!("{html}{BODY_SEPARATOR}{text}"))
            }
            (true, true) => Ok(String::new()),
        }
    }

    /// The literal body without template expansion, for diagnostics.
    pub fn body_string(&self) -> String {
        match (self.fields.text.is_empty(), self.fields.html.is_empty()) {
            (false, true) => self.fields.text.clone(),
            (true, false) => self.fields.html.clone(),
            (false, false) => format!(
                "{}{}{}",
                self.fields.html, BODY_SEPARATOR, self.fields.text
            ),
            (true, true) => String::new(),
        }
    }
}

impl fmt::Display for ResolvedMail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = &self.fields;
        let date = fields
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "[{}] {} | from: {} | to: {} | cc: {} | bcc: {}\nattached: {}\n{}",
            fields.title,
            date,
            fields.from,
            fields.to,
            fields.cc,
            fields.bcc,
            fields.attach.join(", "),
            self.body_string(),
        )
    }
}
