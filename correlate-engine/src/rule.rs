/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Rule and listener collaborator seams consumed by the engine.

use crate::message::EventMessage;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A rule lifecycle failure, surfaced uncaught through engine start/stop.
#[derive(Debug)]
pub struct RuleError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl Display for RuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

/// A named predicate bound to one or more route identifiers.
///
/// The engine evaluates `is_match` against a rule's buffered windows every
/// time a novel message arrives on one of its bound routes. Rules are keyed
/// by identity: registering and removing must use the same `Arc`.
#[async_trait]
pub trait CorrelationRule: Send + Sync {
    /// Human-readable rule name, used in logs only.
    fn name(&self) -> &str;

    /// Comma-separated route identifiers this rule is bound to.
    ///
    /// Surrounding whitespace per identifier is ignored. Duplicate
    /// identifiers are honored: a rule bound to `"A,A"` is notified twice
    /// per match on route `A`. An empty or all-whitespace list yields an
    /// inert rule that is never dispatched.
    fn bound_route_ids(&self) -> String;

    /// Tests the rule's condition against its buffered windows.
    async fn is_match(&self) -> bool;

    async fn start(&self) -> Result<(), RuleError>;

    async fn stop(&self) -> Result<(), RuleError>;
}

/// Callback invoked with (rule, message) when a bound rule matches.
#[async_trait]
pub trait RuleListener: Send + Sync {
    async fn rule_fired(&self, rule: &Arc<dyn CorrelationRule>, message: &Arc<EventMessage>);
}
