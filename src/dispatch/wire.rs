//! SendGrid v3 wire format.
//!
//! Translates a resolved mail into the JSON body of a
//! `POST /v3/mail/send` request. Attachments are read whole, base64
//! encoded and typed by filename extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::address::Address;
use crate::datetime::DateTime;
use crate::error::Result;
use crate::mail::ResolvedMail;

/// A name/email pair as SendGrid expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRef {
    /// The addr-spec.
    pub email: String,
    /// Display name, omitted when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl From<&Address> for EmailRef {
    fn from(addr: &Address) -> Self {
        EmailRef {
            email: addr.address.clone(),
            name: addr.name.clone(),
        }
    }
}

/// The recipient grouping attached to one outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Personalization {
    /// Primary recipients.
    pub to: Vec<EmailRef>,
    /// Carbon-copy recipients, omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<EmailRef>,
    /// Blind-carbon-copy recipients, omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<EmailRef>,
}

/// One body channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    /// MIME type, `text/plain` or `text/html`.
    #[serde(rename = "type")]
    pub content_type: String,
    /// The rendered body.
    pub value: String,
}

/// One encoded attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireAttachment {
    /// Base64-encoded file content.
    pub content: String,
    /// MIME type guessed from the filename.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Base name of the attached file.
    pub filename: String,
    /// Always `inline`.
    pub disposition: String,
    /// Content id, equal to the filename.
    pub content_id: String,
}

/// The full mail-send request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailSendRequest {
    /// Recipient groupings; a single entry per mail.
    pub personalizations: Vec<Personalization>,
    /// Sender.
    pub from: EmailRef,
    /// Subject, omitted when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    /// Rendered body channels, plain text before HTML.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    /// Encoded attachments, omitted when none.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<WireAttachment>,
    /// Unix timestamp for scheduled delivery.
    pub send_at: i64,
    /// Extra headers; carries the RFC 2822 `Date`.
    pub headers: BTreeMap<String, String>,
}

/// Build the wire request for one resolved mail.
///
/// Rendering happens here a second time (verification already rendered
/// once); attachment files are read in full and any read failure fails
/// only this mail's request, not the run.
pub fn build_request(mail: &ResolvedMail) -> Result<MailSendRequest> {
    let fields = &mail.fields;

    let date = fields.date.unwrap_or_else(DateTime::now);
    let mut headers = BTreeMap::new();
    headers.insert("Date".to_string(), date.rfc2822());

    let mut content = Vec::new();
    let text = mail.render_text()?;
    if !text.is_empty() {
        content.push(Content {
            content_type: "text/plain".to_string(),
            value: text,
        });
    }
    let html = mail.render_html()?;
    if !html.is_empty() {
        content.push(Content {
            content_type: "text/html".to_string(),
            value: html,
        });
    }

    let attachments = fields
        .attach
        .iter()
        .map(|filename| read_attachment(filename))
        .collect::<Result<Vec<_>>>()?;

    Ok(MailSendRequest {
        personalizations: vec![Personalization {
            to: fields.to.iter().map(EmailRef::from).collect(),
            cc: fields.cc.iter().map(EmailRef::from).collect(),
            bcc: fields.bcc.iter().map(EmailRef::from).collect(),
        }],
        from: EmailRef::from(&fields.from),
        subject: fields.title.clone(),
        content,
        attachments,
        send_at: date.timestamp(),
        headers,
    })
}

/// Read and encode one attachment file.
fn read_attachment(filename: &str) -> Result<WireAttachment> {
    let data = fs::read(filename)?;

    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let basename = Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    Ok(WireAttachment {
        content: BASE64.encode(data),
        content_type,
        filename: basename.clone(),
        disposition: "inline".to_string(),
        content_id: basename,
    })
}
