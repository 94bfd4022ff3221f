//! Structural verification of resolved mails.
//!
//! Verification is purely diagnostic: it accumulates every violation
//! across every mail instead of failing fast. Callers decide whether a
//! non-empty result is fatal.

use std::collections::BTreeSet;
use std::fs;

use thiserror::Error;

use crate::mail::ResolvedMail;
use crate::template::TemplateError;

/// A single verification violation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An attachment path does not name an existing regular file.
    #[error("file not found: {0}")]
    MissingAttachment(String),

    /// Both body channels are empty.
    #[error("the text and html of the mail to {to} are empty; set at least one of text or html")]
    EmptyBody {
        /// Display form of the mail's `to` list.
        to: String,
    },

    /// The mail's body cannot be rendered.
    #[error("mail to {to}: {source}")]
    Render {
        /// Display form of the mail's `to` list.
        to: String,
        /// The underlying template failure.
        #[source]
        source: TemplateError,
    },
}

/// Check every resolved mail and return all violations found.
///
/// Missing attachments are deduplicated by filename across the whole
/// batch and reported in lexicographic order, ahead of the per-mail
/// body checks.
pub fn verify(mails: &[ResolvedMail]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut missing = BTreeSet::new();
    for mail in mails {
        for filename in &mail.fields.attach {
            if !is_regular_file(filename) {
                missing.insert(filename.clone());
            }
        }
    }
    errors.extend(missing.into_iter().map(ValidationError::MissingAttachment));

    for mail in mails {
        let to = mail.fields.to.to_string();

        let text = mail.render_text();
        let html = mail.render_html();
        if let Err(source) = &text {
            errors.push(ValidationError::Render {
                to: to.clone(),
                source: source.clone(),
            });
        }
        if let Err(source) = &html {
            errors.push(ValidationError::Render {
                to: to.clone(),
                source: source.clone(),
            });
        }

        if let (Ok(text), Ok(html)) = (text, html) {
            if text.is_empty() && html.is_empty() {
                errors.push(ValidationError::EmptyBody { to });
            }
        }
    }

    errors
}

fn is_regular_file(path: &str) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, AddressList};
    use crate::mail::MailFields;
    use crate::template::Template;
    use std::io::Write;

    fn mail(fields: MailFields) -> ResolvedMail {
        ResolvedMail { fields }
    }

    fn with_text(text: &str) -> ResolvedMail {
        mail(MailFields {
            text: text.to_string(),
            ..MailFields::default()
        })
    }

    #[test]
    fn test_valid_mail_passes() {
        let errors = verify(&[with_text("hello")]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_body_reported_with_recipients() {
        let m = mail(MailFields {
            to: AddressList(vec![Address::new("", "who@example.com")]),
            ..MailFields::default()
        });
        let errors = verify(&[m]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::EmptyBody { to } if to.contains("who@example.com")
        ));
    }

    #[test]
    fn test_template_output_counts_as_body() {
        // Empty literal text, but the template produces output.
        let m = mail(MailFields {
            title: "Greetings".to_string(),
            text_template: Some(Template::parse("{{title}}!").unwrap()),
            ..MailFields::default()
        });
        assert!(verify(&[m]).is_empty());
    }

    #[test]
    fn test_missing_attachment_reported() {
        let m = mail(MailFields {
            text: "body".to_string(),
            attach: vec!["does-not-exist.png".to_string()],
            ..MailFields::default()
        });
        let errors = verify(&[m]);
        assert_eq!(
            errors,
            vec![ValidationError::MissingAttachment(
                "does-not-exist.png".to_string()
            )]
        );
    }

    #[test]
    fn test_existing_attachment_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "content").unwrap();

        let m = mail(MailFields {
            text: "body".to_string(),
            attach: vec![path.to_string_lossy().into_owned()],
            ..MailFields::default()
        });
        assert!(verify(&[m]).is_empty());
    }

    #[test]
    fn test_directory_is_not_a_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let m = mail(MailFields {
            text: "body".to_string(),
            attach: vec![dir.path().to_string_lossy().into_owned()],
            ..MailFields::default()
        });
        assert_eq!(verify(&[m]).len(), 1);
    }

    #[test]
    fn test_accumulates_across_mails() {
        let a = mail(MailFields {
            text: "x".to_string(),
            attach: vec!["missing-a".to_string()],
            ..MailFields::default()
        });
        let b = mail(MailFields {
            text: "x".to_string(),
            attach: vec!["missing-b".to_string()],
            ..MailFields::default()
        });
        let empty = mail(MailFields::default());

        let errors = verify(&[a, b, empty]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_missing_attachments_deduplicated() {
        let shared = "shared-missing.png".to_string();
        let a = mail(MailFields {
            text: "x".to_string(),
            attach: vec![shared.clone()],
            ..MailFields::default()
        });
        let b = mail(MailFields {
            text: "x".to_string(),
            attach: vec![shared.clone(), shared.clone()],
            ..MailFields::default()
        });

        let errors = verify(&[a, b]);
        assert_eq!(errors, vec![ValidationError::MissingAttachment(shared)]);
    }

    #[test]
    fn test_render_failure_becomes_validation_error() {
        let m = mail(MailFields {
            text: "x".to_string(),
            text_template: Some(Template::parse("{{bogus}}").unwrap()),
            to: AddressList(vec![Address::new("", "who@example.com")]),
            ..MailFields::default()
        });
        let errors = verify(&[m]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::Render { .. }));
    }

    #[test]
    fn test_never_short_circuits() {
        // One mail with every kind of violation still yields them all.
        let m = mail(MailFields {
            attach: vec!["nope.bin".to_string()],
            text: "x".to_string(),
            text_template: Some(Template::parse("{{bogus}}").unwrap()),
            ..MailFields::default()
        });
        let errors = verify(&[m]);
        assert_eq!(errors.len(), 2);
    }
}
