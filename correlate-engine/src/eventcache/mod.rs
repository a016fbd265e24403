/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Windowed-cache collaborator seams consumed by the engine.
//!
//! The engine never inspects cache contents; it only asks the directory for
//! per-route handles and calls [`EventCache::add`] for its dedup signal.
//! Implementations live outside this crate (see `correlate-cache-memory` for
//! the default in-memory one).

mod window;
pub use window::WindowSpec;

use crate::message::EventMessage;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failures raised by cache directories and their factories.
#[derive(Debug)]
pub enum CacheError {
    /// The directory factory does not recognize the requested implementation
    /// selector. Fatal to engine construction.
    UnknownImplementation(String),
    /// A window specification could not be parsed.
    Window(String),
    /// The directory could not build or hand out a cache.
    Construction(String),
    /// A directory start/stop transition failed.
    Lifecycle(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::UnknownImplementation(selector) => {
                write!(f, "unknown cache implementation: {selector}")
            }
            CacheError::Window(reason) => write!(f, "invalid window specification: {reason}"),
            CacheError::Construction(reason) => write!(f, "unable to construct cache: {reason}"),
            CacheError::Lifecycle(reason) => {
                write!(f, "cache directory lifecycle failure: {reason}")
            }
        }
    }
}

impl Error for CacheError {}

/// Per-route store of recent messages supporting dedup-aware insertion.
#[async_trait]
pub trait EventCache: Send + Sync {
    /// Adds one message to the window.
    ///
    /// Returns `true` when the message is novel for correlation purposes and
    /// rule evaluation should run, `false` when the window has already seen
    /// it.
    async fn add(&self, message: Arc<EventMessage>) -> bool;
}

/// Creates, looks up, and discards one [`EventCache`] per route identifier.
///
/// Idempotency of `get_cache` for an already-known route id is this
/// collaborator's call, not the engine's.
#[async_trait]
pub trait CacheDirectory: Send + Sync {
    /// Returns the cache for `route_id`, creating it sized by `window` when
    /// absent.
    async fn get_cache(
        &self,
        route_id: &str,
        window: &WindowSpec,
    ) -> Result<Arc<dyn EventCache>, CacheError>;

    /// Returns the cache for `route_id` without creating one.
    async fn lookup_cache(&self, route_id: &str) -> Option<Arc<dyn EventCache>>;

    /// Discards the cache for `route_id`, if any.
    async fn remove_cache(&self, route_id: &str);

    async fn start(&self) -> Result<(), CacheError>;

    async fn stop(&self) -> Result<(), CacheError>;
}

/// Builds a [`CacheDirectory`] from an implementation selector string.
pub trait CacheDirectoryFactory: Send + Sync {
    fn build(&self, implementation: &str) -> Result<Arc<dyn CacheDirectory>, CacheError>;
}
