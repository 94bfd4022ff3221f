//! Dispatching resolved mails through the delivery provider.
//!
//! Mails are sent sequentially from a FIFO queue. A failed attempt is
//! logged and the mail requeued at the back after an exponential
//! backoff; once a mail exhausts its attempt budget it moves to the
//! dead-letter list so one bad recipient cannot stall the batch.

mod transport;
mod wire;

use std::collections::VecDeque;
use std::thread;

use tracing::{error, info, warn};

pub use transport::{DeliveryError, SendGridTransport, Transport};
pub use wire::{build_request, Content, EmailRef, MailSendRequest, Personalization, WireAttachment};

use crate::config::RetryConfig;
use crate::mail::ResolvedMail;

/// A mail that could not be delivered.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    /// The undelivered mail.
    pub mail: ResolvedMail,
    /// Why the last attempt failed.
    pub reason: String,
}

/// Outcome of a dispatch run.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Number of mails accepted by the provider.
    pub sent: usize,
    /// Mails that were set aside after exhausting their attempts or
    /// failing to build a request.
    pub dead: Vec<DeadLetter>,
}

impl DispatchReport {
    /// Whether every mail in the batch was delivered.
    pub fn all_sent(&self) -> bool {
        self.dead.is_empty()
    }
}

struct Entry {
    mail: ResolvedMail,
    request: MailSendRequest,
    attempts: u32,
}

/// The retry queue over a delivery transport.
pub struct DispatchQueue<T: Transport> {
    transport: T,
    policy: RetryConfig,
}

impl<T: Transport> DispatchQueue<T> {
    /// Create a queue with the given transport and retry policy.
    pub fn new(transport: T, policy: RetryConfig) -> Self {
        Self { transport, policy }
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send every mail, in order, retrying failures per the policy.
    ///
    /// A mail whose wire request cannot be built (unreadable
    /// attachment, unrenderable template) is dead-lettered immediately;
    /// that failure is scoped to the one mail, never the run.
    pub fn send_all(&self, mails: Vec<ResolvedMail>) -> DispatchReport {
        let mut report = DispatchReport::default();

        let mut queue: VecDeque<Entry> = VecDeque::with_capacity(mails.len());
        for mail in mails {
            match build_request(&mail) {
                Ok(request) => queue.push_back(Entry {
                    mail,
                    request,
                    attempts: 0,
                }),
                Err(e) => {
                    error!("failed to build request for mail to {}: {e}", mail.fields.to);
                    report.dead.push(DeadLetter {
                        mail,
                        reason: e.to_string(),
                    });
                }
            }
        }

        while let Some(mut entry) = queue.pop_front() {
            match self.transport.send(&entry.request) {
                Ok(()) => {
                    info!("sent mail to {}", entry.mail.fields.to);
                    report.sent += 1;
                }
                Err(e) => {
                    entry.attempts += 1;
                    if entry.attempts >= self.policy.max_attempts {
                        error!(
                            "giving up on mail to {} after {} attempts: {e}",
                            entry.mail.fields.to, entry.attempts
                        );
                        report.dead.push(DeadLetter {
                            mail: entry.mail,
                            reason: e.to_string(),
                        });
                    } else {
                        warn!(
                            "failed to send mail to {} (attempt {} of {}): {e}",
                            entry.mail.fields.to, entry.attempts, self.policy.max_attempts
                        );
                        thread::sleep(self.policy.backoff(entry.attempts));
                        queue.push_back(entry);
                    }
                }
            }
        }

        report
    }
}
