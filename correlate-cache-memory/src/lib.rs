/********************************************************************************
 * Copyright (c) 2026 Contributors to the Correlate project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! In-memory windowed event caches for the correlate engine.
//!
//! This crate supplies the default [`CacheDirectory`] implementation behind
//! the engine's cache seam: one [`MemoryEventCache`] per route identifier,
//! bounded by entry count and/or entry age, reporting novelty by message id.

use async_trait::async_trait;
use correlate_engine::{
    CacheDirectory, CacheDirectoryFactory, CacheError, EventCache, EventMessage, WindowSpec,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const COMPONENT: &str = "memory_cache_directory";

/// Selector recognized by [`MemoryCacheFactory`].
pub const MEMORY_IMPLEMENTATION: &str = "memory";

struct WindowEntry {
    id: Uuid,
    seen: Instant,
}

/// Windowed per-route message store.
///
/// `add` evicts entries that have aged out of the window, then reports a
/// message as novel iff its id is not currently held. The window is trimmed
/// to its count bound after insertion, oldest entries first.
pub struct MemoryEventCache {
    window: WindowSpec,
    entries: Mutex<VecDeque<WindowEntry>>,
}

impl MemoryEventCache {
    pub fn new(window: WindowSpec) -> Self {
        Self {
            window,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn window(&self) -> &WindowSpec {
        &self.window
    }

    /// Number of live entries, after age-based eviction.
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.evict_stale(&mut entries);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_stale(&self, entries: &mut VecDeque<WindowEntry>) {
        if let Some(max_age) = self.window.max_age() {
            let now = Instant::now();
            while entries
                .front()
                .is_some_and(|entry| now.duration_since(entry.seen) > max_age)
            {
                entries.pop_front();
            }
        }
    }
}

#[async_trait]
impl EventCache for MemoryEventCache {
    async fn add(&self, message: Arc<EventMessage>) -> bool {
        let mut entries = self.entries.lock().await;
        self.evict_stale(&mut entries);

        let id = message.id();
        if entries.iter().any(|entry| entry.id == id) {
            return false;
        }

        entries.push_back(WindowEntry {
            id,
            seen: Instant::now(),
        });
        if let Some(max_len) = self.window.max_len() {
            while entries.len() > max_len {
                entries.pop_front();
            }
        }
        true
    }
}

/// Directory of [`MemoryEventCache`]s keyed by route identifier.
///
/// `get_cache` hands back the existing cache for a known route id; the new
/// window specification is ignored in that case, matching the contract that
/// resizing an existing route's window is not this directory's business.
pub struct MemoryCacheDirectory {
    running: AtomicBool,
    caches: Mutex<HashMap<String, Arc<MemoryEventCache>>>,
}

impl MemoryCacheDirectory {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            caches: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for MemoryCacheDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheDirectory for MemoryCacheDirectory {
    async fn get_cache(
        &self,
        route_id: &str,
        window: &WindowSpec,
    ) -> Result<Arc<dyn EventCache>, CacheError> {
        let mut caches = self.caches.lock().await;
        let cache = caches
            .entry(route_id.to_string())
            .or_insert_with(|| {
                debug!(
                    event = "memory_cache_create",
                    component = COMPONENT,
                    route_id,
                    "creating windowed cache"
                );
                Arc::new(MemoryEventCache::new(window.clone()))
            })
            .clone();
        Ok(cache)
    }

    async fn lookup_cache(&self, route_id: &str) -> Option<Arc<dyn EventCache>> {
        self.caches
            .lock()
            .await
            .get(route_id)
            .map(|cache| cache.clone() as Arc<dyn EventCache>)
    }

    async fn remove_cache(&self, route_id: &str) {
        self.caches.lock().await.remove(route_id);
    }

    async fn start(&self) -> Result<(), CacheError> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), CacheError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory for the in-memory cache family.
///
/// Recognizes [`MEMORY_IMPLEMENTATION`] and the empty selector as the
/// default; anything else is a fatal construction failure.
pub struct MemoryCacheFactory;

impl CacheDirectoryFactory for MemoryCacheFactory {
    fn build(&self, implementation: &str) -> Result<Arc<dyn CacheDirectory>, CacheError> {
        match implementation {
            "" | MEMORY_IMPLEMENTATION => Ok(Arc::new(MemoryCacheDirectory::new())),
            other => Err(CacheError::UnknownImplementation(other.to_string())),
        }
    }
}
