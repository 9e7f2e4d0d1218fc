//! Application bindings
//!
//! Everything the demo resolves is configured here. `Notifier` is missing on
//! purpose: it is constructed implicitly from the bindings below.

use std::sync::Arc;

use weave::Binder;

use crate::config::MailConfig;
use crate::services::{LogMailer, Mailer, RequestContext, SmtpMailer};

/// Scope used for per-request objects
pub const REQUEST_SCOPE: &str = "request";

pub fn register(binder: &mut Binder) {
    let mail = MailConfig::from_env();
    let driver = mail.driver.clone();
    binder.bind::<MailConfig>().to_instance(mail);

    match driver.as_str() {
        "smtp" => binder.bind::<dyn Mailer>().to::<SmtpMailer>().as_singleton(),
        _ => binder.bind::<dyn Mailer>().to::<LogMailer>().as_singleton(),
    }

    binder
        .bind::<RequestContext>()
        .to_provider(|cx| {
            Arc::new(RequestContext {
                id: cx.scope().to_string(),
            })
        })
        .as_singleton();
    binder
        .bind::<RequestContext>()
        .for_scope(REQUEST_SCOPE)
        .to_provider(|_| {
            Arc::new(RequestContext {
                id: format!("req-{}", std::process::id()),
            })
        })
        .as_singleton();
}
