//! Reply notifications.
//!
//! `ReplyDispatcher::dispatch` runs on the request path after the reply is
//! stored. It only decides whether a notification is due, renders it and puts
//! it on an in-process outbox. `DispatchWorker` drains the outbox in the
//! background and owns delivery, retries and failure logging.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use handlebars::Handlebars;
use serde_json::json;
use db::models::ombudsman_ticket::Model as Ticket;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use util::config::AppConfig;

use super::text::{has_visible_content, html_to_text};
use crate::mailer::{MailError, Mailer, OutgoingEmail, SmtpMailer};

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub institution_name: String,
    /// Offset used when showing dates to the submitter.
    pub utc_offset_minutes: i32,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            institution_name: "Ouvidoria".into(),
            utc_offset_minutes: -180,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(2000),
        }
    }
}

impl NotificationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            institution_name: config.institution_name.clone(),
            utc_offset_minutes: config.display_utc_offset_minutes,
            max_attempts: config.mail_max_attempts,
            retry_backoff: Duration::from_millis(config.mail_retry_backoff_ms),
        }
    }

    fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyReply,
    Anonymous,
    MissingEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Queued,
    Skipped(SkipReason),
    /// No mail transport; the reply is stored but nobody is told.
    NotConfigured,
    /// The notification was lost: it could not be rendered or the worker is gone.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct ReplyNotification {
    pub ticket_id: String,
    pub email: OutgoingEmail,
}

#[derive(Clone)]
pub struct ReplyDispatcher {
    outbox: Option<UnboundedSender<ReplyNotification>>,
    settings: Arc<NotificationSettings>,
}

impl ReplyDispatcher {
    /// A dispatcher without a mail transport. Every eligible reply reports `NotConfigured`.
    pub fn disabled(settings: NotificationSettings) -> Self {
        Self {
            outbox: None,
            settings: Arc::new(settings),
        }
    }

    /// Spawns a `DispatchWorker` delivering through `mailer`. Needs a Tokio runtime.
    pub fn start(mailer: Arc<dyn Mailer>, settings: NotificationSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = DispatchWorker {
            inbox: rx,
            mailer,
            max_attempts: settings.max_attempts.max(1),
            retry_backoff: settings.retry_backoff,
        };
        tokio::spawn(worker.run());

        Self {
            outbox: Some(tx),
            settings: Arc::new(settings),
        }
    }

    /// SMTP-backed dispatcher, or a disabled one when SMTP credentials are absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, MailError> {
        let settings = NotificationSettings::from_config(config);
        match SmtpMailer::from_config(config)? {
            Some(mailer) => Ok(Self::start(Arc::new(mailer), settings)),
            None => {
                tracing::warn!("SMTP credentials not configured; reply notifications are disabled");
                Ok(Self::disabled(settings))
            }
        }
    }

    /// Queues the reply notification for `ticket` when one is due.
    pub fn dispatch(&self, ticket: &Ticket, reply: &str) -> DispatchOutcome {
        if !has_visible_content(reply) {
            return DispatchOutcome::Skipped(SkipReason::EmptyReply);
        }
        if !ticket.is_identified() {
            return DispatchOutcome::Skipped(SkipReason::Anonymous);
        }
        let Some(to) = ticket.contact_email() else {
            return DispatchOutcome::Skipped(SkipReason::MissingEmail);
        };

        let Some(outbox) = &self.outbox else {
            tracing::warn!(ticket_id = %ticket.id, "Reply not sent: no mail transport configured");
            return DispatchOutcome::NotConfigured;
        };

        let email = match compose_reply_email(ticket, to, reply, &self.settings) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(ticket_id = %ticket.id, error = %e, "Could not render reply notification");
                return DispatchOutcome::Dropped;
            }
        };
        let notification = ReplyNotification {
            ticket_id: ticket.id.clone(),
            email,
        };

        match outbox.send(notification) {
            Ok(()) => {
                tracing::debug!(ticket_id = %ticket.id, "Reply notification queued");
                DispatchOutcome::Queued
            }
            Err(_) => {
                tracing::error!(ticket_id = %ticket.id, "Dispatch worker stopped; reply notification dropped");
                DispatchOutcome::Dropped
            }
        }
    }
}

const REPLY_TEMPLATE: &str = "<p>Olá, {{name}}.</p>\
<p>Sua manifestação \"{{subject}}\", registrada em {{opened_at}}, recebeu a seguinte resposta:</p>\
<div>{{{reply}}}</div>\
<p>Atenciosamente,<br>{{institution}}</p>";

/// Renders the email telling the submitter their manifestation was answered.
///
/// Ticket fields are HTML-escaped; the reply is staff-authored markup and goes in as is.
pub fn compose_reply_email(
    ticket: &Ticket,
    to: &str,
    reply: &str,
    settings: &NotificationSettings,
) -> Result<OutgoingEmail, MailError> {
    let greeting_name = ticket
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("manifestante");
    let opened_at = ticket
        .created_at
        .with_timezone(&settings.offset())
        .format("%d/%m/%Y às %H:%M")
        .to_string();

    let html = Handlebars::new()
        .render_template(
            REPLY_TEMPLATE,
            &json!({
                "name": greeting_name,
                "subject": ticket.subject,
                "opened_at": opened_at,
                "reply": reply,
                "institution": settings.institution_name,
            }),
        )
        .map_err(|e| MailError::Build(e.to_string()))?;
    let text = html_to_text(&html);

    Ok(OutgoingEmail {
        to: to.to_owned(),
        subject: format!("Resposta à sua manifestação: {}", ticket.subject),
        html,
        text,
    })
}

/// Background consumer of the reply outbox.
pub struct DispatchWorker {
    inbox: UnboundedReceiver<ReplyNotification>,
    mailer: Arc<dyn Mailer>,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl DispatchWorker {
    pub async fn run(mut self) {
        while let Some(notification) = self.inbox.recv().await {
            self.deliver(notification).await;
        }
        tracing::debug!("Reply outbox closed; dispatch worker exiting");
    }

    async fn deliver(&self, notification: ReplyNotification) {
        for attempt in 1..=self.max_attempts {
            match self.mailer.send(&notification.email).await {
                Ok(()) => {
                    tracing::info!(ticket_id = %notification.ticket_id, attempt, "Reply notification sent");
                    return;
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        ticket_id = %notification.ticket_id,
                        attempt,
                        error = %e,
                        "Reply notification failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff.saturating_mul(attempt)).await;
                }
                Err(e) => {
                    tracing::error!(
                        ticket_id = %notification.ticket_id,
                        attempts = self.max_attempts,
                        error = %e,
                        "Giving up on reply notification"
                    );
                }
            }
        }
    }
}
