//! Demo services wired by the injector

mod mailer;
mod notifier;

pub use mailer::{LogMailer, Mailer, SmtpMailer};
pub use notifier::{Notifier, RequestContext};
