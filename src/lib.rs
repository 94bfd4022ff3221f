//! mailtree - batch mail sender
//!
//! Reads a tree-structured YAML document describing a batch of
//! personalized emails, resolves per-leaf content by merging inherited
//! fields down the tree, renders optional text/HTML templates,
//! validates the result and dispatches through the SendGrid v3 API
//! with bounded retry.

pub mod address;
pub mod config;
pub mod datetime;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mail;
pub mod template;
pub mod verify;

pub use address::{Address, AddressList};
pub use config::{Cli, RetryConfig};
pub use datetime::DateTime;
pub use dispatch::{
    DeadLetter, DeliveryError, DispatchQueue, DispatchReport, MailSendRequest, SendGridTransport,
    Transport,
};
pub use error::{MailtreeError, Result};
pub use mail::{Document, MailFields, MailNode, ResolvedMail};
pub use template::{Template, TemplateError};
pub use verify::{verify, ValidationError};
