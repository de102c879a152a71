//! # Serfer Event System
//!
//! Routes cluster membership events coming out of a gossip layer to
//! per-category handlers, and drives that routing from a queue on a
//! cancellable background task.
//!
//! ## Core Features
//!
//! - **Typed Events**: Every event kind is a variant of [`Event`], no dynamic downcasts
//! - **Capability Registry**: One optional handler per category in [`HandlerRegistry`]
//! - **Service Namespacing**: User events named `prefix:name` go to the user-event
//!   handler with the prefix stripped, everything else goes to the unknown-event handler
//! - **Non-blocking Dispatch**: Each event is handled on its own Tokio task
//! - **Graceful Shutdown**: [`DispatchLoop::stop`] waits for the loop to exit
//!
//! ## Architecture Overview
//!
//! - [`EventRouter`]: classification and handler invocation for a single event
//! - [`DispatchLoop`]: queue consumer racing cancellation against new events
//! - [`ShutdownState`]: level-triggered cancellation shared between components
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use serfer_event_system::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = HandlerRegistry::new("serfer")
//!         .with_member_join(TypedHandler::new("log_joins", |event: MemberEvent| {
//!             for member in &event.members {
//!                 println!("{} joined from {}:{}", member.name, member.addr, member.port);
//!             }
//!         }))
//!         .with_user_event(TypedHandler::new("log_user_events", |event: UserEvent| {
//!             println!("service event {}", event.name);
//!         }));
//!
//!     let (events, dispatcher) = create_dispatcher(registry, 1024);
//!     dispatcher.start()?;
//!
//!     events
//!         .send(Event::User(UserEvent {
//!             name: "serfer:deploy".to_string(),
//!             ..Default::default()
//!         }))
//!         .await?;
//!
//!     dispatcher.stop().await?;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;
pub mod events;
pub mod handlers;
pub mod shutdown;
pub mod system;

#[cfg(test)]
mod test_support;

pub use error::DispatchError;
pub use events::{
    Event, EventType, LamportTime, Member, MemberEvent, MemberStatus, Query, UnrecognizedEvent,
    UserEvent,
};
pub use handlers::{EventHandler, Handler, HandlerRegistry, TypedHandler};
pub use shutdown::ShutdownState;
pub use system::{create_dispatcher, DispatchLoop, DispatchStats, EventRouter, LoopState};

// External dependencies that handler implementations commonly need
pub use async_trait::async_trait;
