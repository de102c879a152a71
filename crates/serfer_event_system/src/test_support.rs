//! Shared helpers for the crate's tests.

use crate::events::{Event, Member, MemberEvent, MemberStatus, Query, UserEvent};
use crate::handlers::{EventHandler, Handler};
use async_trait::async_trait;
use std::fmt::{self, Write as _};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One handler invocation as seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Member(&'static str, MemberEvent),
    User(&'static str, UserEvent),
    Query(&'static str, Query),
}

impl Delivery {
    pub fn slot(&self) -> &'static str {
        match self {
            Delivery::Member(slot, _) | Delivery::User(slot, _) | Delivery::Query(slot, _) => slot,
        }
    }
}

/// Handler that records every invocation into a shared log, tagged with the
/// slot it was registered under.
#[derive(Debug, Clone)]
pub struct Recorder {
    slot: &'static str,
    log: Arc<Mutex<Vec<Delivery>>>,
}

impl Recorder {
    pub fn new(slot: &'static str, log: &Arc<Mutex<Vec<Delivery>>>) -> Self {
        Self {
            slot,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl Handler<MemberEvent> for Recorder {
    async fn handle(&self, event: MemberEvent) {
        self.log.lock().unwrap().push(Delivery::Member(self.slot, event));
    }
}

#[async_trait]
impl Handler<UserEvent> for Recorder {
    async fn handle(&self, event: UserEvent) {
        self.log.lock().unwrap().push(Delivery::User(self.slot, event));
    }
}

#[async_trait]
impl Handler<Query> for Recorder {
    async fn handle(&self, event: Query) {
        self.log.lock().unwrap().push(Delivery::Query(self.slot, event));
    }
}

/// Whole-event handler forwarding everything it receives to a channel,
/// optionally after a delay.
#[derive(Debug)]
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<Event>,
    delay: Option<Duration>,
}

impl ChannelHandler {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        Self::delayed(None)
    }

    pub fn delayed(delay: Option<Duration>) -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender, delay }), receiver)
    }
}

#[async_trait]
impl EventHandler for ChannelHandler {
    async fn handle_event(&self, event: Option<Event>) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(event) = event {
            let _ = self.sender.send(event);
        }
    }
}

/// Whole-event handler that reports entry and then never returns.
#[derive(Debug)]
pub struct StalledHandler {
    entered: mpsc::UnboundedSender<()>,
}

impl StalledHandler {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<()>) {
        let (entered, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { entered }), receiver)
    }
}

#[async_trait]
impl EventHandler for StalledHandler {
    async fn handle_event(&self, _event: Option<Event>) {
        let _ = self.entered.send(());
        std::future::pending::<()>().await;
    }
}

pub fn test_member(name: &str) -> Member {
    let mut member = Member::new(name, IpAddr::V4(Ipv4Addr::LOCALHOST), 9022);
    member.status = MemberStatus::Alive;
    member.protocol_min = 2;
    member.protocol_max = 5;
    member.protocol_cur = 5;
    member.delegate_min = 2;
    member.delegate_max = 5;
    member.delegate_cur = 5;
    member
}

pub fn user_event(name: &str) -> UserEvent {
    UserEvent {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Captures log records emitted while the returned guard is alive on the
/// current thread.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::registry().with(logs.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn count(&self, level: Level) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(record_level, _)| *record_level == level)
            .count()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|(record_level, message)| *record_level == level && message.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.records
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.message + &visitor.fields));
    }
}
