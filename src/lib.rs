//! Scholar Compass - form-state decision engine for guided financial
//! goal forms.
//!
//! The crate decides which form fields to reveal (progressive
//! disclosure), validates input and detects conflicts through
//! pluggable collaborators, and protects sessions with checksummed
//! snapshots, automatic rollback, and a safety monitor that degrades
//! AI assistance before it can do damage.
//!
//! ## Architecture
//!
//! Hexagonal: the `domain` is pure and IO-free, `ports` define the
//! contracts to the outside world, `adapters` implement them, and the
//! `application` layer orchestrates.
//!
//! ```no_run
//! use std::sync::Arc;
//! use scholar_compass::adapters::events::InMemoryEventPublisher;
//! use scholar_compass::application::EngineRegistry;
//! use scholar_compass::config::AppConfig;
//! use scholar_compass::domain::foundation::SessionId;
//!
//! # async fn run() {
//! let config = AppConfig::load().expect("config");
//! let events = Arc::new(InMemoryEventPublisher::new());
//! let registry = EngineRegistry::new(config.engine, events);
//! let engine = registry.engine(SessionId::new()).await;
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
