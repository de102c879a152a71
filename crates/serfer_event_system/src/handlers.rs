//! Handler capabilities and the registry that holds them.
//!
//! Every event category has at most one handler. A handler is anything that
//! implements [`Handler`] for the category's payload type, or a plain closure
//! wrapped in [`TypedHandler`]. Slots left empty mean "nobody is listening"
//! and the router silently drops events of that category.
//!
//! Handlers run on their own spawned task. The dispatcher never waits for
//! them, never times them out and never catches their failures; a handler
//! that needs error reporting or retries must do it itself.

use crate::events::{Event, MemberEvent, Query, UserEvent};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Capability to consume one category of event payload.
///
/// # Examples
///
/// ```rust
/// use serfer_event_system::{async_trait, Handler, MemberEvent};
///
/// struct JoinCounter;
///
/// #[async_trait]
/// impl Handler<MemberEvent> for JoinCounter {
///     async fn handle(&self, event: MemberEvent) {
///         println!("{} members joined", event.members.len());
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<E>: Send + Sync + 'static
where
    E: Send + 'static,
{
    /// Consumes one event payload.
    async fn handle(&self, event: E);
}

/// Consumes whole events regardless of category.
///
/// The dispatch loop only depends on this trait, so anything able to route an
/// [`Event`] can be driven by it. `None` stands for an absent event and must
/// be ignored.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle_event(&self, event: Option<Event>);
}

/// Adapter turning a synchronous closure into a [`Handler`].
///
/// ```rust
/// use serfer_event_system::{HandlerRegistry, TypedHandler, UserEvent};
///
/// let registry = HandlerRegistry::new("serfer").with_user_event(TypedHandler::new(
///     "print_user_event",
///     |event: UserEvent| println!("user event {}", event.name),
/// ));
/// assert!(registry.has_user_event_handler());
/// ```
pub struct TypedHandler<E, F>
where
    F: Fn(E) + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: PhantomData<fn(E)>,
}

impl<E, F> TypedHandler<E, F>
where
    F: Fn(E) + Send + Sync,
{
    /// Creates a new closure handler with a name used in debug output.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            handler,
            name: name.into(),
            _phantom: PhantomData,
        }
    }

    pub fn handler_name(&self) -> &str {
        &self.name
    }
}

impl<E, F> fmt::Debug for TypedHandler<E, F>
where
    F: Fn(E) + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedHandler")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<E, F> Handler<E> for TypedHandler<E, F>
where
    E: Send + 'static,
    F: Fn(E) + Send + Sync + 'static,
{
    async fn handle(&self, event: E) {
        (self.handler)(event)
    }
}

/// Handler slots for every event category plus the service prefix used to
/// split user events into service and unknown events.
///
/// The registry is plain configuration: build it once with the `with_*`
/// methods, hand it to the router and never mutate it again.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    service_prefix: String,
    pub(crate) user_event: Option<Arc<dyn Handler<UserEvent>>>,
    pub(crate) unknown_event: Option<Arc<dyn Handler<UserEvent>>>,
    pub(crate) member_join: Option<Arc<dyn Handler<MemberEvent>>>,
    pub(crate) member_leave: Option<Arc<dyn Handler<MemberEvent>>>,
    pub(crate) member_failed: Option<Arc<dyn Handler<MemberEvent>>>,
    pub(crate) member_reap: Option<Arc<dyn Handler<MemberEvent>>>,
    pub(crate) member_update: Option<Arc<dyn Handler<MemberEvent>>>,
    pub(crate) query: Option<Arc<dyn Handler<Query>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry for the given service prefix.
    pub fn new(service_prefix: impl Into<String>) -> Self {
        Self {
            service_prefix: service_prefix.into(),
            ..Default::default()
        }
    }

    pub fn service_prefix(&self) -> &str {
        &self.service_prefix
    }

    /// Handler for service events, invoked with the prefix stripped.
    pub fn with_user_event(mut self, handler: impl Handler<UserEvent>) -> Self {
        self.user_event = Some(Arc::new(handler));
        self
    }

    /// Handler for user events outside the service namespace.
    pub fn with_unknown_event(mut self, handler: impl Handler<UserEvent>) -> Self {
        self.unknown_event = Some(Arc::new(handler));
        self
    }

    pub fn with_member_join(mut self, handler: impl Handler<MemberEvent>) -> Self {
        self.member_join = Some(Arc::new(handler));
        self
    }

    pub fn with_member_leave(mut self, handler: impl Handler<MemberEvent>) -> Self {
        self.member_leave = Some(Arc::new(handler));
        self
    }

    pub fn with_member_failed(mut self, handler: impl Handler<MemberEvent>) -> Self {
        self.member_failed = Some(Arc::new(handler));
        self
    }

    pub fn with_member_reap(mut self, handler: impl Handler<MemberEvent>) -> Self {
        self.member_reap = Some(Arc::new(handler));
        self
    }

    pub fn with_member_update(mut self, handler: impl Handler<MemberEvent>) -> Self {
        self.member_update = Some(Arc::new(handler));
        self
    }

    pub fn with_query(mut self, handler: impl Handler<Query>) -> Self {
        self.query = Some(Arc::new(handler));
        self
    }

    pub fn has_user_event_handler(&self) -> bool {
        self.user_event.is_some()
    }

    /// Returns the name of a service event with `prefix:` removed, or `None`
    /// when `name` is not in the service namespace.
    ///
    /// ```rust
    /// use serfer_event_system::HandlerRegistry;
    ///
    /// let registry = HandlerRegistry::new("svc");
    /// assert_eq!(registry.service_event_name("svc:deploy"), Some("deploy"));
    /// assert_eq!(registry.service_event_name("svcdeploy"), None);
    /// assert_eq!(registry.service_event_name("deploy"), None);
    /// ```
    pub fn service_event_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.service_prefix.as_str())?
            .strip_prefix(':')
    }

    /// Checks whether a user event name belongs to the service namespace.
    pub fn is_service_event(&self, name: &str) -> bool {
        self.service_event_name(name).is_some()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("service_prefix", &self.service_prefix)
            .field("user_event", &self.user_event.is_some())
            .field("unknown_event", &self.unknown_event.is_some())
            .field("member_join", &self.member_join.is_some())
            .field("member_leave", &self.member_leave.is_some())
            .field("member_failed", &self.member_failed.is_some())
            .field("member_reap", &self.member_reap.is_some())
            .field("member_update", &self.member_update.is_some())
            .field("query", &self.query.is_some())
            .finish()
    }
}
