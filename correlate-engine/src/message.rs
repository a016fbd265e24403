/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One message observed from the routing substrate.
///
/// A message carries an optional originating-route id plus endpoint
/// identification. The engine resolves a message to its windowed cache via
/// the route id first and falls back to the endpoint key, so a message that
/// arrived without an assigned route id can still be attributed to a known
/// endpoint.
///
/// The message id is the dedup identity used by windowed caches: dispatching
/// the same message twice within a cache window evaluates rules only once.
///
/// # Examples
///
/// ```
/// use correlate_engine::EventMessage;
///
/// let message = EventMessage::new(b"order-created".to_vec())
///     .with_route_id("orders-inbound")
///     .with_header("tenant", "acme");
///
/// assert_eq!(message.route_id(), Some("orders-inbound"));
/// assert_eq!(message.header("tenant"), Some("acme"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventMessage {
    id: Uuid,
    route_id: Option<String>,
    endpoint_uri: Option<String>,
    endpoint_key: Option<String>,
    headers: HashMap<String, String>,
    payload: Vec<u8>,
}

impl EventMessage {
    /// Creates a message with a fresh id and no routing information.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_id: None,
            endpoint_uri: None,
            endpoint_key: None,
            headers: HashMap::new(),
            payload: payload.into(),
        }
    }

    /// Sets the originating-route id.
    pub fn with_route_id(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    /// Sets the originating-endpoint URI.
    pub fn with_endpoint_uri(mut self, endpoint_uri: impl Into<String>) -> Self {
        self.endpoint_uri = Some(endpoint_uri.into());
        self
    }

    /// Sets the originating-endpoint key.
    pub fn with_endpoint_key(mut self, endpoint_key: impl Into<String>) -> Self {
        self.endpoint_key = Some(endpoint_key.into());
        self
    }

    /// Adds one header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn route_id(&self) -> Option<&str> {
        self.route_id.as_deref()
    }

    pub fn endpoint_uri(&self) -> Option<&str> {
        self.endpoint_uri.as_deref()
    }

    pub fn endpoint_key(&self) -> Option<&str> {
        self.endpoint_key.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
