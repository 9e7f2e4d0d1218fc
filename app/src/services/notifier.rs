use std::sync::Arc;

use weave::injectable;

use super::Mailer;

/// Identifies the scope a request-level object was built for
#[derive(Debug)]
pub struct RequestContext {
    pub id: String,
}

/// Built implicitly: never bound, only constructed from its dependencies
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    request: Arc<RequestContext>,
}

#[injectable]
impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, request: Arc<RequestContext>) -> Self {
        Self { mailer, request }
    }

    pub fn notify(&self, user: &str) -> String {
        self.mailer
            .send(user, &format!("signed in (request {})", self.request.id))
    }
}
