pub mod mailer;
pub mod ombudsman;
