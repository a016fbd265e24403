/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # correlate-engine
//!
//! `correlate-engine` is the control core of a complex-event-processing
//! layer: it observes messages tagged with a source identifier, buffers each
//! source's recent messages in a per-route windowed cache, evaluates the
//! rules bound to that source on every novel message, and notifies listeners
//! when a rule's condition holds.
//!
//! Typical usage is API-first and centered on [`EventEngine`]. The cache
//! family is chosen at construction time through a [`CacheDirectoryFactory`];
//! the `correlate-cache-memory` crate supplies the default in-memory one.
//!
//! ```
//! use correlate_cache_memory::MemoryCacheFactory;
//! use correlate_engine::{CorrelationRule, EventEngine, EventMessage, WindowSpec};
//! use std::sync::Arc;
//!
//! # pub mod demo {
//! #     use async_trait::async_trait;
//! #     use correlate_engine::{CorrelationRule, EventMessage, RuleError, RuleListener};
//! #     use std::sync::atomic::{AtomicUsize, Ordering};
//! #     use std::sync::Arc;
//! #
//! #     pub struct OrderSpikeRule;
//! #
//! #     #[async_trait]
//! #     impl CorrelationRule for OrderSpikeRule {
//! #         fn name(&self) -> &str {
//! #             "order-spike"
//! #         }
//! #
//! #         fn bound_route_ids(&self) -> String {
//! #             "orders-inbound".to_string()
//! #         }
//! #
//! #         async fn is_match(&self) -> bool {
//! #             true
//! #         }
//! #
//! #         async fn start(&self) -> Result<(), RuleError> {
//! #             Ok(())
//! #         }
//! #
//! #         async fn stop(&self) -> Result<(), RuleError> {
//! #             Ok(())
//! #         }
//! #     }
//! #
//! #     #[derive(Default)]
//! #     pub struct CountingListener {
//! #         pub fired: AtomicUsize,
//! #     }
//! #
//! #     #[async_trait]
//! #     impl RuleListener for CountingListener {
//! #         async fn rule_fired(
//! #             &self,
//! #             _rule: &Arc<dyn CorrelationRule>,
//! #             _message: &Arc<EventMessage>,
//! #         ) {
//! #             self.fired.fetch_add(1, Ordering::SeqCst);
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = EventEngine::new("quick-start", &MemoryCacheFactory, "memory").unwrap();
//!
//! let window: WindowSpec = "30s,1000".parse().unwrap();
//! engine.add_route("orders-inbound", &window).await.unwrap();
//!
//! let rule: Arc<dyn CorrelationRule> = Arc::new(demo::OrderSpikeRule);
//! let listener = Arc::new(demo::CountingListener::default());
//! engine.add_rule(rule.clone(), Some(listener.clone())).await;
//!
//! engine.start().await.unwrap();
//!
//! let message = Arc::new(
//!     EventMessage::new(b"order-created".to_vec()).with_route_id("orders-inbound"),
//! );
//! engine.dispatch(message.clone()).await;
//! // Same message id again: the window reports a duplicate, nothing fires.
//! engine.dispatch(message).await;
//!
//! assert_eq!(
//!     listener.fired.load(std::sync::atomic::Ordering::SeqCst),
//!     1
//! );
//!
//! engine.remove_rule(&rule).await;
//! engine.stop().await.unwrap();
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: the outward [`EventEngine`] surface
//! - Control plane: rule registration bookkeeping and lifecycle ownership
//! - Routing: message-to-cache identifier resolution policy
//! - Data plane: the per-message dispatch path
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events. Library code emits events and
//! does not unconditionally initialize a global subscriber; binaries and
//! tests are responsible for one-time `tracing_subscriber` initialization at
//! process boundaries.

mod control_plane;
mod data_plane;
mod engine;
mod eventcache;
mod message;
mod routing;
mod rule;

#[doc(hidden)]
pub mod observability;

pub use engine::{EngineError, EventEngine};
pub use eventcache::{CacheDirectory, CacheDirectoryFactory, CacheError, EventCache, WindowSpec};
pub use message::EventMessage;
pub use routing::resolver::{
    default_resolvers, EndpointKeyResolver, OriginRouteResolver, RouteResolver,
};
pub use rule::{CorrelationRule, RuleError, RuleListener};
