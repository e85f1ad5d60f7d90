//! Outbound notification email. Delivery runs over SMTP via lettre; failures
//! are logged and never fail the originating request.

use lettre::message::header::ContentType;
use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::EmailConfig;
use crate::core::shared::models::Ticket;

pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: String,
    frontend_url: String,
}

impl Mailer {
    pub fn from_config(config: &EmailConfig, frontend_url: &str) -> Self {
        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => match SmtpTransport::relay(&config.smtp_host) {
                Ok(builder) => Some(
                    builder
                        .port(config.smtp_port)
                        .credentials(Credentials::new(user.clone(), pass.clone()))
                        .build(),
                ),
                Err(e) => {
                    warn!("SMTP relay unavailable, email disabled: {e}");
                    None
                }
            },
            _ => Some(
                SmtpTransport::builder_dangerous(&config.smtp_host)
                    .port(config.smtp_port)
                    .build(),
            ),
        };

        Self {
            transport,
            from: config.from.clone(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ticket_url(&self, ticket_id: Uuid) -> String {
        format!("{}/tickets/{}", self.frontend_url, ticket_id)
    }

    pub fn reset_url(&self, raw_token: &str) -> String {
        format!("{}/reset-password/{}", self.frontend_url, raw_token)
    }

    pub fn invite_url(&self, raw_token: &str) -> String {
        format!("{}/complete-registration?token={}", self.frontend_url, raw_token)
    }

    fn deliver(&self, to: &str, subject: &str, body: String) {
        let Some(transport) = &self.transport else {
            warn!(to, subject, "email transport disabled, dropping message");
            return;
        };

        let from = match self.from.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("invalid sender address {}: {e}", self.from);
                return;
            }
        };
        let to_mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("invalid recipient address {to}: {e}");
                return;
            }
        };

        let message = match Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(message) => message,
            Err(e) => {
                warn!("failed to build email to {to}: {e}");
                return;
            }
        };

        match transport.send(&message) {
            Ok(_) => info!(to, subject, "email sent"),
            Err(e) => warn!("failed to send email to {to}: {e}"),
        }
    }

    pub fn send_verification_code(&self, to: &str, first_name: &str, code: &str) {
        self.deliver(to, "Email Verification", verification_body(first_name, code));
    }

    pub fn send_password_reset(&self, to: &str, first_name: &str, reset_url: &str) {
        self.deliver(
            to,
            "Password Reset Request",
            password_reset_body(first_name, reset_url),
        );
    }

    pub fn send_invitation(&self, to: &str, full_name: &str, role: &str, invite_url: &str) {
        self.deliver(
            to,
            "Welcome to SupportSphere - Complete Your Registration",
            invitation_body(full_name, role, invite_url),
        );
    }

    pub fn send_ticket_created(&self, to: &str, first_name: &str, ticket: &Ticket) {
        self.deliver(
            to,
            "Your Support Ticket Has Been Created",
            ticket_created_body(first_name, ticket, &self.ticket_url(ticket.id)),
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn send_comment_notification(
        &self,
        to: &str,
        first_name: &str,
        ticket_id: Uuid,
        ticket_title: &str,
        author_name: &str,
        text: &str,
        is_reply: bool,
    ) {
        let subject = if is_reply {
            "New Reply to Your Comment"
        } else {
            "New Comment on Your Support Ticket"
        };
        self.deliver(
            to,
            subject,
            comment_body(
                first_name,
                ticket_title,
                author_name,
                text,
                &self.ticket_url(ticket_id),
                is_reply,
            ),
        );
    }
}

fn verification_body(first_name: &str, code: &str) -> String {
    format!(
        "Hi {first_name},\n\n\
         Your SupportSphere verification code is: {code}\n\n\
         The code expires in 10 minutes. If you did not sign up, you can\n\
         safely ignore this email.\n\n\
         Best regards,\nThe SupportSphere Team"
    )
}

fn password_reset_body(first_name: &str, reset_url: &str) -> String {
    format!(
        "Hi {first_name},\n\n\
         We received a request to reset your password. Use the link below:\n\
         {reset_url}\n\n\
         The link expires in 10 minutes. If you did not request a reset,\n\
         you can safely ignore this email.\n\n\
         Best regards,\nThe SupportSphere Team"
    )
}

fn invitation_body(full_name: &str, role: &str, invite_url: &str) -> String {
    format!(
        "Hi {full_name},\n\n\
         You have been invited to join SupportSphere as a {role}.\n\n\
         Click the link below to set your password and activate your account:\n\
         {invite_url}\n\n\
         This invitation will expire in 7 days.\n\n\
         If you did not expect this invitation, you can safely ignore this email.\n\n\
         Best regards,\nThe SupportSphere Team"
    )
}

fn ticket_created_body(first_name: &str, ticket: &Ticket, ticket_url: &str) -> String {
    format!(
        "Hi {first_name},\n\n\
         Your support ticket has been created.\n\n\
         Title:    {}\n\
         Status:   {}\n\
         Priority: {}\n\
         Category: {}\n\n\
         Track it here: {ticket_url}\n\n\
         Best regards,\nThe SupportSphere Team",
        ticket.title, ticket.status, ticket.priority, ticket.category
    )
}

fn comment_body(
    first_name: &str,
    ticket_title: &str,
    author_name: &str,
    text: &str,
    ticket_url: &str,
    is_reply: bool,
) -> String {
    let lead = if is_reply {
        "replied to your comment on"
    } else {
        "commented on your ticket"
    };
    format!(
        "Hi {first_name},\n\n\
         {author_name} {lead} \"{ticket_title}\":\n\n\
         {text}\n\n\
         View the conversation: {ticket_url}\n\n\
         Best regards,\nThe SupportSphere Team"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_body_carries_code() {
        let body = verification_body("Ada", "4821");
        assert!(body.contains("4821"));
        assert!(body.contains("Ada"));
    }

    #[test]
    fn invitation_body_carries_role_and_link() {
        let body = invitation_body("Ada Lovelace", "support_agent", "https://x/y?token=t");
        assert!(body.contains("support_agent"));
        assert!(body.contains("https://x/y?token=t"));
    }

    #[test]
    fn comment_body_distinguishes_replies() {
        let reply = comment_body("Ada", "Cannot log in", "Bob Admin", "hi", "u", true);
        let top = comment_body("Ada", "Cannot log in", "Bob Admin", "hi", "u", false);
        assert!(reply.contains("replied to your comment"));
        assert!(top.contains("commented on your ticket"));
    }
}
