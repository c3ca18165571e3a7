//! # Email Notifier
//!
//! Sends the transactional thank-you message through an HTTP email provider.
//!
//! "Success" means the provider accepted the message, not that the recipient
//! received it; there is no delivery-confirmation loop. The notifier does not
//! deduplicate: sending twice produces two emails. Duplicates are a tolerated
//! cost of the at-least-once feed, bounded by the consumer's small retry
//! window.

use std::future::Future;

use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

pub const SUBJECT: &str = "Thank you for your design details";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email provider rejected message: {0}")]
    Rejected(StatusCode),
}

pub trait EmailNotifier: Send + Sync {
    fn send(&self, email: &str, name: &str)
    -> impl Future<Output = Result<(), NotifyError>> + Send;
}

impl<N: EmailNotifier> EmailNotifier for std::sync::Arc<N> {
    fn send(
        &self,
        email: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        N::send(self.as_ref(), email, name)
    }
}

pub struct HttpEmailNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl HttpEmailNotifier {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.email_endpoint.clone(),
            api_key: config.email_api_key.clone(),
            sender: config.sender_email.clone(),
        }
    }
}

impl EmailNotifier for HttpEmailNotifier {
    async fn send(&self, email: &str, name: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.sender,
                "to": [email],
                "subject": SUBJECT,
                "html": html_body(name),
                "text": text_body(name),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status()));
        }

        info!(%email, "Email accepted by provider");

        Ok(())
    }
}

pub fn html_body(name: &str) -> String {
    format!(
        "<h1>Hello {name},</h1><p>Thank you for submitting your design details. \
         We have received your information and will be in touch soon.</p>"
    )
}

pub fn text_body(name: &str) -> String {
    format!(
        "Hello {name}, Thank you for submitting your design details. \
         We have received your information and will be in touch soon."
    )
}
