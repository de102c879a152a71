//! # Cluster Events
//!
//! This module defines every event the dispatcher understands. Events are
//! produced upstream by the gossip layer and are treated as immutable inputs,
//! with one exception: the router rewrites [`UserEvent::name`] before handing
//! a service event to its handler.
//!
//! ## Event Categories
//!
//! ### Membership Events
//! Join, leave, failure, update and reap notifications. Each carries the
//! ordered list of affected [`Member`]s.
//!
//! ### User Events
//! Application-defined broadcasts. Names namespaced with the configured
//! service prefix (`prefix:name`) belong to this application; everything
//! else is routed to the unknown-event handler.
//!
//! ### Queries
//! Request/response style broadcasts carried as [`Query`].
//!
//! ### Unrecognized Events
//! Event kinds outside the known set. They are logged and dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

// ============================================================================
// Primitive Types
// ============================================================================

/// Logical clock value attached to user events and queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LamportTime(pub u64);

impl fmt::Display for LamportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status of a cluster member as reported by the gossip layer.
///
/// [`MemberStatus::Reaped`] is a marker used by reconciliation consumers to
/// record that a member was reaped. The dispatcher itself never assigns it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    #[default]
    None,
    Alive,
    Leaving,
    Left,
    Failed,
    Reaped,
}

impl MemberStatus {
    /// Numeric wire code, with `-1` reserved for the reap marker.
    pub fn code(self) -> i32 {
        match self {
            MemberStatus::None => 0,
            MemberStatus::Alive => 1,
            MemberStatus::Leaving => 2,
            MemberStatus::Left => 3,
            MemberStatus::Failed => 4,
            MemberStatus::Reaped => -1,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberStatus::None => "none",
            MemberStatus::Alive => "alive",
            MemberStatus::Leaving => "leaving",
            MemberStatus::Left => "left",
            MemberStatus::Failed => "failed",
            MemberStatus::Reaped => "reaped",
        };
        f.write_str(s)
    }
}

/// A single node in the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique node name
    pub name: String,
    /// Advertised address of the node
    pub addr: IpAddr,
    /// Gossip port of the node
    pub port: u16,
    /// Arbitrary key/value metadata published by the node
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Current health status
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub protocol_min: u8,
    #[serde(default)]
    pub protocol_max: u8,
    #[serde(default)]
    pub protocol_cur: u8,
    #[serde(default)]
    pub delegate_min: u8,
    #[serde(default)]
    pub delegate_max: u8,
    #[serde(default)]
    pub delegate_cur: u8,
}

impl Member {
    /// Creates an alive member with empty tags and zeroed protocol bounds.
    pub fn new(name: impl Into<String>, addr: IpAddr, port: u16) -> Self {
        Self {
            name: name.into(),
            addr,
            port,
            tags: HashMap::new(),
            status: MemberStatus::Alive,
            protocol_min: 0,
            protocol_max: 0,
            protocol_cur: 0,
            delegate_min: 0,
            delegate_max: 0,
            delegate_cur: 0,
        }
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload of every membership change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberEvent {
    /// Affected members, in the order the gossip layer reported them
    pub members: Vec<Member>,
}

impl MemberEvent {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }
}

/// An application-defined broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    /// Logical time the event was issued at
    #[serde(default)]
    pub ltime: LamportTime,
    /// Event name, possibly namespaced as `prefix:name`
    pub name: String,
    /// Opaque payload
    #[serde(default)]
    pub payload: Vec<u8>,
    /// Whether the gossip layer may coalesce events with the same name
    #[serde(default)]
    pub coalesce: bool,
}

/// A query broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub ltime: LamportTime,
    pub name: String,
    #[serde(default)]
    pub payload: Vec<u8>,
}

/// An event of a kind this dispatcher does not know how to route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedEvent {
    /// Raw event type code reported by the producer
    pub code: i32,
    /// Free-form description kept for diagnostics
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Event Sum Type
// ============================================================================

/// Every event that can arrive on the dispatch queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    MemberJoin(MemberEvent),
    MemberLeave(MemberEvent),
    MemberFailed(MemberEvent),
    MemberUpdate(MemberEvent),
    MemberReap(MemberEvent),
    User(UserEvent),
    Query(Query),
    Unrecognized(UnrecognizedEvent),
}

impl Event {
    /// Returns the discriminator of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            Event::MemberJoin(_) => EventType::MemberJoin,
            Event::MemberLeave(_) => EventType::MemberLeave,
            Event::MemberFailed(_) => EventType::MemberFailed,
            Event::MemberUpdate(_) => EventType::MemberUpdate,
            Event::MemberReap(_) => EventType::MemberReap,
            Event::User(_) => EventType::User,
            Event::Query(_) => EventType::Query,
            Event::Unrecognized(e) => EventType::Unknown(e.code),
        }
    }
}

/// Discriminator of an [`Event`], used for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MemberJoin,
    MemberLeave,
    MemberFailed,
    MemberUpdate,
    MemberReap,
    User,
    Query,
    Unknown(i32),
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::MemberJoin => f.write_str("member-join"),
            EventType::MemberLeave => f.write_str("member-leave"),
            EventType::MemberFailed => f.write_str("member-failed"),
            EventType::MemberUpdate => f.write_str("member-update"),
            EventType::MemberReap => f.write_str("member-reap"),
            EventType::User => f.write_str("user"),
            EventType::Query => f.write_str("query"),
            EventType::Unknown(code) => write!(f, "unknown-event-{code}"),
        }
    }
}

// Tests module
mod tests;
