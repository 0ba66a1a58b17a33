//! Outbound email.
//!
//! A small backend abstraction in the Django style: SMTP for production,
//! console for development, memory for tests. Delivery failure is fatal
//! for the request that triggered the send; nothing is retried.

use async_trait::async_trait;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum MailError {
	#[error("invalid email message: {0}")]
	Message(String),
	#[error("smtp transport error: {0}")]
	Transport(String),
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
	pub from: String,
	pub to: String,
	pub subject: String,
	pub body: String,
}

#[async_trait]
pub trait EmailBackend: Send + Sync {
	async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Production backend over lettre's async SMTP transport.
pub struct SmtpBackend {
	transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpBackend {
	pub fn new(host: &str, port: u16) -> Self {
		let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
			.port(port)
			.build();
		Self { transport }
	}
}

#[async_trait]
impl EmailBackend for SmtpBackend {
	async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
		let email = Message::builder()
			.from(
				message
					.from
					.parse()
					.map_err(|_| MailError::Message(format!("bad from address {}", message.from)))?,
			)
			.to(message
				.to
				.parse()
				.map_err(|_| MailError::Message(format!("bad to address {}", message.to)))?)
			.subject(&message.subject)
			.body(message.body.clone())
			.map_err(|err| MailError::Message(err.to_string()))?;
		self.transport
			.send(email)
			.await
			.map(|_| ())
			.map_err(|err| MailError::Transport(err.to_string()))
	}
}

/// Development backend: logs the message instead of sending it.
pub struct ConsoleBackend;

#[async_trait]
impl EmailBackend for ConsoleBackend {
	async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
		info!(
			to = %message.to,
			subject = %message.subject,
			body = %message.body,
			"email (console backend)"
		);
		Ok(())
	}
}

/// Test backend: records sent messages for assertions.
#[derive(Default)]
pub struct MemoryBackend {
	sent: Mutex<Vec<EmailMessage>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn sent_messages(&self) -> Vec<EmailMessage> {
		self.sent.lock().await.clone()
	}
}

#[async_trait]
impl EmailBackend for MemoryBackend {
	async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
		self.sent.lock().await.push(message.clone());
		Ok(())
	}
}

/// Pick a backend from settings. Unknown names fall back to console with
/// a warning rather than refusing to boot.
pub fn backend_from_settings(settings: &Settings) -> std::sync::Arc<dyn EmailBackend> {
	use std::sync::Arc;
	match settings.email_backend.as_str() {
		"smtp" => Arc::new(SmtpBackend::new(&settings.smtp_host, settings.smtp_port)),
		"memory" => Arc::new(MemoryBackend::new()),
		"console" => Arc::new(ConsoleBackend),
		other => {
			tracing::warn!(backend = %other, "unknown EMAIL_BACKEND, using console");
			Arc::new(ConsoleBackend)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn memory_backend_records_messages() {
		let backend = MemoryBackend::new();
		let message = EmailMessage {
			from: "noreply@critique.local".to_string(),
			to: "alice@example.com".to_string(),
			subject: "Confirmation code".to_string(),
			body: "Your confirmation code: 123".to_string(),
		};
		backend.send(&message).await.unwrap();
		let sent = backend.sent_messages().await;
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0], message);
	}

	#[tokio::test]
	async fn console_backend_always_succeeds() {
		let message = EmailMessage {
			from: "a@b.c".to_string(),
			to: "d@e.f".to_string(),
			subject: "s".to_string(),
			body: "b".to_string(),
		};
		assert!(ConsoleBackend.send(&message).await.is_ok());
	}
}
