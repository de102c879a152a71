//! Default event consumers that log every delivery.

use serfer_event_system::{async_trait, Handler, HandlerRegistry, MemberEvent, Query, UserEvent};
use tracing::info;

/// Logs each event it receives under a fixed category label.
#[derive(Debug, Clone)]
pub struct LoggingConsumer {
    category: &'static str,
}

impl LoggingConsumer {
    pub fn new(category: &'static str) -> Self {
        Self { category }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }
}

#[async_trait]
impl Handler<MemberEvent> for LoggingConsumer {
    async fn handle(&self, event: MemberEvent) {
        for member in &event.members {
            info!(
                "👥 [{}] {} at {}:{} is {}",
                self.category, member.name, member.addr, member.port, member.status
            );
        }
    }
}

#[async_trait]
impl Handler<UserEvent> for LoggingConsumer {
    async fn handle(&self, event: UserEvent) {
        info!(
            "📨 [{}] {} (ltime {}, {} bytes, coalesce: {})",
            self.category,
            event.name,
            event.ltime,
            event.payload.len(),
            event.coalesce
        );
    }
}

#[async_trait]
impl Handler<Query> for LoggingConsumer {
    async fn handle(&self, event: Query) {
        info!(
            "❔ [{}] {} (ltime {}, {} bytes)",
            self.category,
            event.name,
            event.ltime,
            event.payload.len()
        );
    }
}

/// Builds a registry with a [`LoggingConsumer`] in every slot.
pub fn logging_registry(service_prefix: &str) -> HandlerRegistry {
    HandlerRegistry::new(service_prefix)
        .with_user_event(LoggingConsumer::new("user"))
        .with_unknown_event(LoggingConsumer::new("unknown"))
        .with_member_join(LoggingConsumer::new("join"))
        .with_member_leave(LoggingConsumer::new("leave"))
        .with_member_failed(LoggingConsumer::new("failed"))
        .with_member_reap(LoggingConsumer::new("reap"))
        .with_member_update(LoggingConsumer::new("update"))
        .with_query(LoggingConsumer::new("query"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_registry_fills_every_slot() {
        let registry = logging_registry("billing");
        let debug = format!("{registry:?}");

        assert_eq!(registry.service_prefix(), "billing");
        assert!(registry.has_user_event_handler());
        assert!(!debug.contains("false"), "unfilled slot in {debug}");
    }

    #[tokio::test]
    async fn test_consumer_handles_every_payload() {
        let consumer = LoggingConsumer::new("test");
        assert_eq!(consumer.category(), "test");

        Handler::<MemberEvent>::handle(&consumer, MemberEvent::default()).await;
        Handler::<UserEvent>::handle(&consumer, UserEvent::default()).await;
        Handler::<Query>::handle(&consumer, Query::default()).await;
    }
}
