/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::control_plane::engine_lifecycle::EngineLifecycle;
use crate::control_plane::rule_registry::RuleRegistry;
use crate::data_plane::dispatcher::MessageDispatcher;
use crate::eventcache::{CacheDirectory, CacheDirectoryFactory, CacheError, EventCache, WindowSpec};
use crate::message::EventMessage;
use crate::observability::events;
use crate::routing::resolver::{default_resolvers, RouteResolver};
use crate::rule::{CorrelationRule, RuleError, RuleListener};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "engine";

/// Failures surfaced by the engine facade.
#[derive(Debug)]
pub enum EngineError {
    /// Cache directory construction or lifecycle failure. During
    /// construction this is fatal: nothing else was created, so there is no
    /// partial state to roll back.
    CacheDirectory(CacheError),
    /// A rule's start/stop failed during the lifecycle cascade.
    Rule(RuleError),
    /// The engine was used after `stop()`. Stopped is terminal.
    Stopped,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::CacheDirectory(err) => write!(f, "cache directory failure: {err}"),
            EngineError::Rule(err) => write!(f, "rule lifecycle failure: {err}"),
            EngineError::Stopped => write!(f, "engine is stopped"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::CacheDirectory(err) => Some(err),
            EngineError::Rule(err) => Some(err),
            EngineError::Stopped => None,
        }
    }
}

/// The event correlation engine.
///
/// [`EventEngine`] observes messages from a routing substrate, buffers each
/// source's recent messages in a per-route windowed cache, evaluates the
/// rules bound to that source on every novel message, and notifies listeners
/// on a match. It owns the route->rules and rule->routes indices and the
/// start/stop cascade over the cache directory and every registered rule.
///
/// All operations take `&self`; the engine is shared freely across tasks.
pub struct EventEngine {
    name: String,
    cache_directory: Arc<dyn CacheDirectory>,
    registry: RuleRegistry,
    resolvers: Vec<Box<dyn RouteResolver>>,
    lifecycle: EngineLifecycle,
}

impl EventEngine {
    /// Builds an engine over the cache directory the factory produces for
    /// `implementation`.
    ///
    /// Must succeed before anything that touches caches. A factory failure
    /// is fatal to engine use.
    pub fn new(
        name: &str,
        factory: &dyn CacheDirectoryFactory,
        implementation: &str,
    ) -> Result<Self, EngineError> {
        let cache_directory = factory
            .build(implementation)
            .map_err(EngineError::CacheDirectory)?;
        debug!(
            event = events::ENGINE_CREATE,
            component = COMPONENT,
            name,
            implementation,
            "engine created"
        );

        Ok(Self {
            name: name.to_string(),
            cache_directory,
            registry: RuleRegistry::new(),
            resolvers: default_resolvers(),
            lifecycle: EngineLifecycle::new(),
        })
    }

    /// Replaces the route-resolution chain. Resolvers are tried in order
    /// during dispatch until one names a cache the directory holds.
    pub fn with_resolvers(mut self, resolvers: Vec<Box<dyn RouteResolver>>) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Requests a windowed cache for `route_id` shaped by `window`.
    ///
    /// Whether a second call for the same id returns the same handle or
    /// errors is the cache directory's contract, not the engine's.
    pub async fn add_route(
        &self,
        route_id: &str,
        window: &WindowSpec,
    ) -> Result<Arc<dyn EventCache>, EngineError> {
        let cache = self
            .cache_directory
            .get_cache(route_id, window)
            .await
            .map_err(EngineError::CacheDirectory)?;
        debug!(
            event = events::ROUTE_ADD_OK,
            component = COMPONENT,
            route_id,
            "route cache attached"
        );
        Ok(cache)
    }

    /// Discards the cache for `route_id`.
    ///
    /// Bindings are untouched: a rule may stay bound to a route whose cache
    /// is gone, and dispatch for that route is then dropped with a warning.
    pub async fn remove_route(&self, route_id: &str) {
        self.cache_directory.remove_cache(route_id).await;
        debug!(
            event = events::ROUTE_REMOVE_OK,
            component = COMPONENT,
            route_id,
            "route cache discarded"
        );
    }

    /// Registers `rule` under every route identifier it names, pairing each
    /// binding with `listener`.
    ///
    /// The identifier list comes from [`CorrelationRule::bound_route_ids`],
    /// split on commas with surrounding whitespace trimmed. Both indices are
    /// updated in one critical section.
    pub async fn add_rule(
        &self,
        rule: Arc<dyn CorrelationRule>,
        listener: Option<Arc<dyn RuleListener>>,
    ) {
        let route_ids = parse_route_ids(&rule.bound_route_ids());
        debug!(
            event = events::RULE_ADD_OK,
            component = COMPONENT,
            rule = rule.name(),
            routes = route_ids.len(),
            "rule registered"
        );
        self.registry.insert(rule, listener, route_ids).await;
    }

    /// Removes every binding of `rule`. Removing a rule that was never
    /// registered is a no-op, not an error.
    pub async fn remove_rule(&self, rule: &Arc<dyn CorrelationRule>) {
        if self.registry.remove(rule).await {
            debug!(
                event = events::RULE_REMOVE_OK,
                component = COMPONENT,
                rule = rule.name(),
                "rule removed"
            );
        } else {
            debug!(
                event = events::RULE_REMOVE_MISSING,
                component = COMPONENT,
                rule = rule.name(),
                "rule was not registered"
            );
        }
    }

    /// Routes one message: cache resolution, dedup, rule evaluation, and
    /// listener notification. Never fails; unresolvable and duplicate
    /// messages are logged and dropped.
    pub async fn dispatch(&self, message: Arc<EventMessage>) {
        MessageDispatcher::new(&self.cache_directory, &self.registry, &self.resolvers)
            .dispatch(message)
            .await;
    }

    /// Starts the cache directory, then every currently-registered rule.
    ///
    /// The directory comes first so a rule that evaluates immediately finds
    /// its caches running. A collaborator failure propagates as-is and
    /// leaves the engine in an undefined state; nothing is retried.
    pub async fn start(&self) -> Result<(), EngineError> {
        if !self.lifecycle.begin_start().await? {
            return Ok(());
        }

        self.cache_directory
            .start()
            .await
            .map_err(EngineError::CacheDirectory)?;
        for rule in self.registry.rules().await {
            rule.start().await.map_err(EngineError::Rule)?;
        }

        debug!(
            event = events::ENGINE_START_OK,
            component = COMPONENT,
            name = self.name.as_str(),
            "engine started"
        );
        Ok(())
    }

    /// Stops the cache directory, then every currently-registered rule.
    ///
    /// Rules tolerate caches disappearing mid-stop, so the directory going
    /// down first is fine. Stopping an already-stopped engine is a no-op.
    pub async fn stop(&self) -> Result<(), EngineError> {
        if !self.lifecycle.begin_stop().await {
            return Ok(());
        }

        self.cache_directory
            .stop()
            .await
            .map_err(EngineError::CacheDirectory)?;
        for rule in self.registry.rules().await {
            rule.stop().await.map_err(EngineError::Rule)?;
        }

        debug!(
            event = events::ENGINE_STOP_OK,
            component = COMPONENT,
            name = self.name.as_str(),
            "engine stopped"
        );
        Ok(())
    }
}

/// Splits a rule's comma-separated route list, trimming each identifier and
/// discarding empty segments. A whitespace-only list yields no identifiers.
fn parse_route_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
