//! The per-node mail payload and the inheritance merge.

use serde::Deserialize;

use crate::address::{Address, AddressList};
use crate::datetime::DateTime;
use crate::template::Template;

/// The set of fields a node in the mail tree may carry.
///
/// Every field is optional in the source document. Scalar strings use
/// the empty string as the "unset" state; `date` and the two template
/// fields distinguish unset (`None`) from any concrete value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MailFields {
    /// Mail subject.
    #[serde(default)]
    pub title: String,
    /// Scheduled send time; `None` means "send now" at dispatch.
    #[serde(default)]
    pub date: Option<DateTime>,
    /// Attachment file paths, relative to the working directory.
    #[serde(default)]
    pub attach: Vec<String>,
    /// Literal plain-text body.
    #[serde(default)]
    pub text: String,
    /// Template for the plain-text body; overrides `text` when set.
    #[serde(default)]
    pub text_template: Option<Template>,
    /// Literal HTML body.
    #[serde(default)]
    pub html: String,
    /// Template for the HTML body; overrides `html` when set.
    #[serde(default)]
    pub html_template: Option<Template>,
    /// Sender address.
    #[serde(default)]
    pub from: Address,
    /// Primary recipients.
    #[serde(default)]
    pub to: AddressList,
    /// Carbon-copy recipients.
    #[serde(default)]
    pub cc: AddressList,
    /// Blind-carbon-copy recipients.
    #[serde(default)]
    pub bcc: AddressList,
}

impl MailFields {
    /// Merge a descendant's own fields over this (inherited) field set,
    /// returning a new field set. Neither input is modified.
    ///
    /// Precedence:
    /// - scalar strings (`title`, `text`, `html`): the child wins when
    ///   non-empty, otherwise the inherited value is kept;
    /// - optionals (`date`, `text_template`, `html_template`): the child
    ///   wins when set;
    /// - `from`: inherited wholesale when the child's address is empty,
    ///   name and address always travel together;
    /// - lists (`attach`, `to`, `cc`, `bcc`): the child's entries
    ///   followed by the inherited entries, duplicates kept.
    pub fn override_with(&self, own: &MailFields) -> MailFields {
        MailFields {
            title: pick_string(&self.title, &own.title),
            date: own.date.or(self.date),
            attach: own
                .attach
                .iter()
                .chain(self.attach.iter())
                .cloned()
                .collect(),
            text: pick_string(&self.text, &own.text),
            text_template: own
                .text_template
                .clone()
                .or_else(|| self.text_template.clone()),
            html: pick_string(&self.html, &own.html),
            html_template: own
                .html_template
                .clone()
                .or_else(|| self.html_template.clone()),
            from: if own.from.is_empty() {
                self.from.clone()
            } else {
                own.from.clone()
            },
            to: own.to.concat(&self.to),
            cc: own.cc.concat(&self.cc),
            bcc: own.bcc.concat(&self.bcc),
        }
    }
}

fn pick_string(inherited: &str, own: &str) -> String {
    if own.is_empty() {
        inherited.to_string()
    } else {
        own.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> MailFields {
        MailFields {
            title: "Child title".to_string(),
            date: Some("2026-01-01 09:00".parse().unwrap()),
            attach: vec!["child.png".to_string()],
            text: "child text".to_string(),
            text_template: Some(Template::parse("child {{text}}").unwrap()),
            html: "<p>child</p>".to_string(),
            html_template: Some(Template::parse("child {{html}}").unwrap()),
            from: Address::new("Child", "child@example.com"),
            to: AddressList(vec![Address::new("", "to-child@example.com")]),
            cc: AddressList(vec![Address::new("", "cc-child@example.com")]),
            bcc: AddressList(vec![Address::new("", "bcc-child@example.com")]),
        }
    }

    fn ancestor() -> MailFields {
        MailFields {
            title: "Ancestor title".to_string(),
            date: Some("2025-12-31 23:00".parse().unwrap()),
            attach: vec!["ancestor.png".to_string()],
            text: "ancestor text".to_string(),
            text_template: Some(Template::parse("ancestor {{text}}").unwrap()),
            html: "<p>ancestor</p>".to_string(),
            html_template: Some(Template::parse("ancestor {{html}}").unwrap()),
            from: Address::new("Ancestor", "ancestor@example.com"),
            to: AddressList(vec![Address::new("", "to-ancestor@example.com")]),
            cc: AddressList(vec![Address::new("", "cc-ancestor@example.com")]),
            bcc: AddressList(vec![Address::new("", "bcc-ancestor@example.com")]),
        }
    }

    #[test]
    fn test_populated_child_keeps_scalars() {
        let merged = ancestor().override_with(&populated());
        let child = populated();
        assert_eq!(merged.title, child.title);
        assert_eq!(merged.date, child.date);
        assert_eq!(merged.text, child.text);
        assert_eq!(merged.text_template, child.text_template);
        assert_eq!(merged.html, child.html);
        assert_eq!(merged.html_template, child.html_template);
        assert_eq!(merged.from, child.from);
    }

    #[test]
    fn test_empty_child_inherits_scalars() {
        let merged = ancestor().override_with(&MailFields::default());
        let base = ancestor();
        assert_eq!(merged.title, base.title);
        assert_eq!(merged.date, base.date);
        assert_eq!(merged.text, base.text);
        assert_eq!(merged.text_template, base.text_template);
        assert_eq!(merged.html, base.html);
        assert_eq!(merged.html_template, base.html_template);
        assert_eq!(merged.from, base.from);
    }

    #[test]
    fn test_lists_concatenate_child_first() {
        let merged = ancestor().override_with(&populated());
        assert_eq!(merged.attach, vec!["child.png", "ancestor.png"]);
        assert_eq!(merged.to.0[0].address, "to-child@example.com");
        assert_eq!(merged.to.0[1].address, "to-ancestor@example.com");
        assert_eq!(merged.cc.len(), 2);
        assert_eq!(merged.bcc.len(), 2);
    }

    #[test]
    fn test_empty_child_lists_equal_ancestor() {
        let merged = ancestor().override_with(&MailFields::default());
        assert_eq!(merged.attach, ancestor().attach);
        assert_eq!(merged.to, ancestor().to);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut own = MailFields::default();
        own.to = AddressList(vec![Address::new("", "same@example.com")]);
        let mut base = MailFields::default();
        base.to = AddressList(vec![Address::new("", "same@example.com")]);

        let merged = base.override_with(&own);
        assert_eq!(merged.to.len(), 2);
    }

    #[test]
    fn test_from_travels_wholesale() {
        let mut own = MailFields::default();
        // Name without address counts as empty, so the whole ancestor
        // address wins, name included.
        own.from = Address::new("Only Name", "");

        let merged = ancestor().override_with(&own);
        assert_eq!(merged.from, Address::new("Ancestor", "ancestor@example.com"));
    }

    #[test]
    fn test_merge_is_non_destructive() {
        let base = ancestor();
        let own = populated();
        let before = (base.clone(), own.clone());
        let _ = base.override_with(&own);
        assert_eq!(before, (base, own));
    }
}
