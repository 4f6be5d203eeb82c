//! Outgoing email: order notifications and support requests.
//!
//! Delivery goes through the [`Mailer`] trait. [`SmtpMailer`] relays over
//! SMTP with STARTTLS; [`DisabledMailer`] logs and drops messages when no
//! relay is configured.
//!
//! [`Notifier`] renders the Askama templates and hands each message to a
//! spawned task. Delivery failures are logged there and never reach the
//! caller; nothing is retried.

mod smtp;
mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp::SmtpMailer;

use crate::models::Order;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Delivers rendered messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Mailer used when SMTP is not configured. Drops every message.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email dropped"
        );
        Ok(())
    }
}

pub const SUBJECT_UNAPPROVED_ORDER: &str = "[unapproved] New order";
pub const SUBJECT_NEW_ORDER: &str = "New order";
pub const SUBJECT_YOUR_ORDER: &str = "Your order";
pub const SUBJECT_SUPPORT: &str = "Support Request";

/// Composes notification emails and dispatches them in the background.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

impl Notifier {
    /// Create a notifier sending admin copies to `admin_email`.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: impl Into<String>) -> Self {
        Self {
            mailer,
            admin_email: admin_email.into(),
        }
    }

    /// Address receiving admin notifications.
    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Hand a message to a background task.
    ///
    /// Returns immediately. A failed delivery is logged by the task.
    pub fn dispatch(&self, email: OutgoingEmail) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let to = email.to.clone();
            let subject = email.subject.clone();
            match mailer.send(email).await {
                Ok(()) => tracing::debug!(%to, %subject, "email delivered"),
                Err(e) => tracing::error!(%to, %subject, error = %e, "email delivery failed"),
            }
        });
    }

    /// Tell the admin a checkout was submitted but not yet paid.
    pub fn order_received(&self, order: &Order) {
        match templates::order_bodies(order) {
            Ok((text_body, html_body)) => self.dispatch(OutgoingEmail {
                to: self.admin_email.clone(),
                reply_to: None,
                subject: SUBJECT_UNAPPROVED_ORDER.to_owned(),
                text_body,
                html_body,
            }),
            Err(e) => log_render_failure(&e, SUBJECT_UNAPPROVED_ORDER),
        }
    }

    /// Send the paid-order summary to the admin and the customer.
    pub fn order_approved(&self, order: &Order) {
        let (text_body, html_body) = match templates::order_bodies(order) {
            Ok(bodies) => bodies,
            Err(e) => return log_render_failure(&e, SUBJECT_NEW_ORDER),
        };

        self.dispatch(OutgoingEmail {
            to: self.admin_email.clone(),
            reply_to: None,
            subject: SUBJECT_NEW_ORDER.to_owned(),
            text_body: text_body.clone(),
            html_body: html_body.clone(),
        });
        self.dispatch(OutgoingEmail {
            to: order.email.to_string(),
            reply_to: None,
            subject: SUBJECT_YOUR_ORDER.to_owned(),
            text_body,
            html_body,
        });
    }

    /// Forward a support request to the admin, replying to the customer.
    pub fn support_request(&self, email: &str, fullname: &str, message: &str) {
        match templates::support_bodies(email, fullname, message) {
            Ok((text_body, html_body)) => self.dispatch(OutgoingEmail {
                to: self.admin_email.clone(),
                reply_to: Some(email.to_owned()),
                subject: SUBJECT_SUPPORT.to_owned(),
                text_body,
                html_body,
            }),
            Err(e) => log_render_failure(&e, SUBJECT_SUPPORT),
        }
    }
}

fn log_render_failure(error: &askama::Error, subject: &str) {
    tracing::error!(error = %error, %subject, "failed to render email");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::fixtures;
    use crate::testing::RecordingMailer;

    fn order(id: &str) -> Order {
        fixtures::orders()
            .into_iter()
            .find(|o| o.order_id.as_str() == id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_order_received_goes_to_admin_only() {
        let (mailer, mut outbox) = RecordingMailer::new();
        let notifier = Notifier::new(Arc::new(mailer), "owner@atelier.test");

        notifier.order_received(&order("ORD-001"));

        let sent = outbox.next().await.unwrap();
        assert_eq!(sent.to, "owner@atelier.test");
        assert_eq!(sent.subject, SUBJECT_UNAPPROVED_ORDER);
        assert!(sent.text_body.contains("Nova Poshta: 12345"));
        assert!(outbox.is_drained().await);
    }

    #[tokio::test]
    async fn test_order_approved_goes_to_admin_and_customer() {
        let (mailer, mut outbox) = RecordingMailer::new();
        let notifier = Notifier::new(Arc::new(mailer), "owner@atelier.test");

        notifier.order_approved(&order("ORD-003"));

        let mut sent = vec![outbox.next().await.unwrap(), outbox.next().await.unwrap()];
        sent.sort_by(|a, b| a.subject.cmp(&b.subject));

        assert_eq!(sent[0].subject, SUBJECT_NEW_ORDER);
        assert_eq!(sent[0].to, "owner@atelier.test");
        assert_eq!(sent[1].subject, SUBJECT_YOUR_ORDER);
        assert_eq!(sent[1].to, "international@example.com");
        assert!(sent[1].text_body.contains("Postal code: 10001"));
    }

    #[tokio::test]
    async fn test_support_request_replies_to_customer() {
        let (mailer, mut outbox) = RecordingMailer::new();
        let notifier = Notifier::new(Arc::new(mailer), "owner@atelier.test");

        notifier.support_request("buyer@example.com", "Buyer", "<b>Where is my coat?</b>");

        let sent = outbox.next().await.unwrap();
        assert_eq!(sent.reply_to.as_deref(), Some("buyer@example.com"));
        assert!(sent.html_body.contains("&lt;b&gt;Where is my coat?"));
        assert!(sent.text_body.contains("<b>Where is my coat?</b>"));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_swallowed() {
        let notifier = Notifier::new(Arc::new(crate::testing::FailingMailer), "owner@atelier.test");
        notifier.order_approved(&order("ORD-001"));
        tokio::task::yield_now().await;
    }
}
