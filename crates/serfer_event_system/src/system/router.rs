/// Event classification and handler dispatch
use crate::events::{Event, EventType, UserEvent};
use crate::handlers::{EventHandler, Handler, HandlerRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes each event to the single handler registered for its category.
///
/// Events that cannot be delivered fall into one of three tiers:
///
/// * **No handler registered** for a known category: the event is dropped
///   without logging.
/// * **Unrecognized event kind**: a warning is logged and the event dropped.
/// * **User event outside the service namespace**: a warning is logged and
///   the unmodified event goes to the unknown-event handler.
///
/// Routing never fails and never returns anything to the caller.
#[derive(Debug, Clone)]
pub struct EventRouter {
    registry: Arc<HandlerRegistry>,
}

impl EventRouter {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Classifies one event and invokes the matching handler.
    ///
    /// An absent event (`None`) is ignored silently.
    pub async fn dispatch(&self, event: Option<Event>) {
        let Some(event) = event else {
            return;
        };

        match event {
            Event::MemberJoin(payload) => invoke(&self.registry.member_join, payload).await,
            Event::MemberLeave(payload) => invoke(&self.registry.member_leave, payload).await,
            Event::MemberFailed(payload) => invoke(&self.registry.member_failed, payload).await,
            // Reap payloads are passed through as-is; marking members reaped is up to the consumer
            Event::MemberReap(payload) => invoke(&self.registry.member_reap, payload).await,
            Event::MemberUpdate(payload) => invoke(&self.registry.member_update, payload).await,
            Event::User(user_event) => self.dispatch_user_event(user_event).await,
            Event::Query(query) => invoke(&self.registry.query, query).await,
            Event::Unrecognized(unrecognized) => {
                warn!(
                    "🟡 Unhandled cluster event: {} ({:?})",
                    EventType::Unknown(unrecognized.code),
                    unrecognized
                );
            }
        }
    }

    /// Splits user events into service events and unknown events.
    async fn dispatch_user_event(&self, mut event: UserEvent) {
        let raw_name = self
            .registry
            .service_event_name(&event.name)
            .map(str::to_owned);

        match raw_name {
            Some(raw_name) => {
                event.name = raw_name;
                debug!("📨 Service user event: {}", event.name);
                invoke(&self.registry.user_event, event).await;
            }
            None => {
                warn!("❓ Unknown user event: {:?}", event);
                invoke(&self.registry.unknown_event, event).await;
            }
        }
    }
}

#[async_trait]
impl EventHandler for EventRouter {
    async fn handle_event(&self, event: Option<Event>) {
        self.dispatch(event).await
    }
}

/// Calls the handler in `slot` if one is registered.
async fn invoke<E>(slot: &Option<Arc<dyn Handler<E>>>, event: E)
where
    E: Send + 'static,
{
    if let Some(handler) = slot {
        handler.handle(event).await;
    }
}
