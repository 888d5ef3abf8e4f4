//! Request identity carried across process boundaries.

use std::fmt;
use std::sync::Arc;

use crate::context::new_id;
use crate::context::scope::{ScopedRequestId, WorkScope};

/// Locale used when none is supplied.
pub const DEFAULT_LOCALE: &str = "sv";

/// Immutable per-request identity layered over a [`WorkScope`].
///
/// The request id is the join key between logs, metrics and error bodies on
/// both sides of a service boundary. It is never empty.
#[derive(Clone)]
pub struct RequestContext {
    identity: Arc<Identity>,
    scope: WorkScope,
}

struct Identity {
    id: String,
    client_id: String,
    locale: String,
    credential: Option<String>,
}

impl RequestContext {
    /// Create a context from a parent scope.
    ///
    /// The request id is attached to a child of `parent` as a [`ScopedRequestId`].
    /// An empty `request_id` is replaced by a freshly minted one and an empty
    /// `locale` by [`DEFAULT_LOCALE`].
    pub fn new(
        parent: &WorkScope,
        request_id: impl Into<String>,
        client_id: impl Into<String>,
        locale: impl Into<String>,
        credential: Option<String>,
    ) -> Self {
        let mut id = request_id.into();
        if id.is_empty() {
            id = new_id();
        }
        let mut locale = locale.into();
        if locale.is_empty() {
            locale = DEFAULT_LOCALE.to_string();
        }

        let scope = parent.with_value(ScopedRequestId(id.clone()));
        Self {
            identity: Arc::new(Identity {
                id,
                client_id: client_id.into(),
                locale,
                credential: credential.filter(|c| !c.is_empty()),
            }),
            scope,
        }
    }

    /// Create a context with a fresh request id over a root scope.
    ///
    /// Used for work that is not triggered by an inbound request.
    pub fn from_root(
        client_id: impl Into<String>,
        locale: impl Into<String>,
        credential: Option<String>,
    ) -> Self {
        Self::new(&WorkScope::root(), new_id(), client_id, locale, credential)
    }

    /// Request id (correlation id).
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    /// Identifier of the calling client.
    pub fn client_id(&self) -> &str {
        &self.identity.client_id
    }

    /// Preferred locale.
    pub fn locale(&self) -> &str {
        &self.identity.locale
    }

    /// Bearer credential, when the caller supplied one.
    pub fn credential(&self) -> Option<&str> {
        self.identity.credential.as_deref()
    }

    /// Cancellation scope of the request.
    pub fn scope(&self) -> &WorkScope {
        &self.scope
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context(id=[{}], clientId=[{}] language={})",
            self.id(),
            self.client_id(),
            self.locale()
        )
    }
}

// Credential stays out of debug output.
impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id())
            .field("client_id", &self.client_id())
            .field("locale", &self.locale())
            .field("has_credential", &self.credential().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_from_root() {
        let ctx = RequestContext::from_root("test-client-id", "sv", Some("auth-token".into()));

        assert!(Uuid::parse_str(ctx.id()).is_ok());
        assert_eq!(ctx.scope().request_id(), Some(ctx.id()));
        assert_eq!(ctx.client_id(), "test-client-id");
        assert_eq!(ctx.credential(), Some("auth-token"));
        assert!(!ctx.scope().is_cancelled());
    }

    #[test]
    fn test_new_keeps_supplied_id() {
        let parent = WorkScope::root();
        let ctx = RequestContext::new(&parent, "req-42", "client", "en", None);

        assert_eq!(ctx.id(), "req-42");
        assert_eq!(ctx.scope().request_id(), Some("req-42"));
        assert_eq!(ctx.locale(), "en");
        assert_eq!(ctx.credential(), None);
        // The parent scope is not modified.
        assert_eq!(parent.request_id(), None);
    }

    #[test]
    fn test_empty_fields_fall_back() {
        let ctx = RequestContext::new(&WorkScope::root(), "", "client", "", Some(String::new()));

        assert!(!ctx.id().is_empty());
        assert_eq!(ctx.locale(), DEFAULT_LOCALE);
        assert_eq!(ctx.credential(), None);
    }

    #[test]
    fn test_inherits_parent_cancellation() {
        let parent = WorkScope::root();
        let ctx = RequestContext::new(&parent, "req-1", "client", "sv", None);
        parent.cancel();
        assert!(ctx.scope().is_cancelled());
    }

    #[test]
    fn test_display_hides_credential() {
        let ctx = RequestContext::new(&WorkScope::root(), "id-1", "c-1", "sv", Some("secret".into()));
        assert_eq!(ctx.to_string(), "Context(id=[id-1], clientId=[c-1] language=sv)");
        assert!(!format!("{:?}", ctx).contains("secret"));
    }
}
