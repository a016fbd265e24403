//! Per-message routing decision: resolve, dedup-check, evaluate, notify.

use crate::control_plane::rule_registry::RuleRegistry;
use crate::eventcache::{CacheDirectory, EventCache};
use crate::message::EventMessage;
use crate::observability::{events, fields};
use crate::routing::resolver::RouteResolver;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "dispatcher";

/// Coordinates one dispatch over the engine's domain owners.
pub(crate) struct MessageDispatcher<'a> {
    cache_directory: &'a Arc<dyn CacheDirectory>,
    registry: &'a RuleRegistry,
    resolvers: &'a [Box<dyn RouteResolver>],
}

impl<'a> MessageDispatcher<'a> {
    pub(crate) fn new(
        cache_directory: &'a Arc<dyn CacheDirectory>,
        registry: &'a RuleRegistry,
        resolvers: &'a [Box<dyn RouteResolver>],
    ) -> Self {
        Self {
            cache_directory,
            registry,
            resolvers,
        }
    }

    /// Runs the full routing decision for one message.
    ///
    /// Unresolvable and duplicate messages are dropped, never errors. Every
    /// binding of the hit identifier is evaluated; an earlier match does not
    /// short-circuit later rules.
    pub(crate) async fn dispatch(&self, message: Arc<EventMessage>) {
        let Some((route_id, cache)) = self.resolve_cache(&message).await else {
            return;
        };
        let msg_id = fields::format_message_id(&message);

        if !cache.add(message.clone()).await {
            debug!(
                event = events::DISPATCH_DUPLICATE,
                component = COMPONENT,
                route_id = route_id.as_str(),
                msg_id = msg_id.as_str(),
                "ignoring - already fired for this message"
            );
            return;
        }

        // Bindings are looked up under the identifier that produced the
        // cache hit, not the one the message was originally tagged with.
        let Some(bindings) = self.registry.bindings_for(&route_id) else {
            debug!(
                event = events::DISPATCH_NO_BINDINGS,
                component = COMPONENT,
                route_id = route_id.as_str(),
                msg_id = msg_id.as_str(),
                "route has a cache but no rules bound"
            );
            return;
        };

        for binding in bindings.iter() {
            if binding.rule.is_match().await {
                debug!(
                    event = events::DISPATCH_RULE_FIRED,
                    component = COMPONENT,
                    route_id = route_id.as_str(),
                    rule = binding.rule.name(),
                    msg_id = msg_id.as_str(),
                    "rule matched"
                );
                if let Some(listener) = &binding.listener {
                    listener.rule_fired(&binding.rule, &message).await;
                }
            }
        }
    }

    /// Tries each resolver in order until one names an identifier the cache
    /// directory holds a cache for.
    async fn resolve_cache(
        &self,
        message: &EventMessage,
    ) -> Option<(String, Arc<dyn EventCache>)> {
        let mut tried: Vec<String> = Vec::new();

        for resolver in self.resolvers {
            if let Some(route_id) = resolver.resolve(message) {
                if let Some(cache) = self.cache_directory.lookup_cache(&route_id).await {
                    return Some((route_id, cache));
                }
                tried.push(route_id);
            }
        }

        let msg_id = fields::format_message_id(message);
        if tried.is_empty() {
            warn!(
                event = events::DISPATCH_NO_ROUTE_INFO,
                component = COMPONENT,
                msg_id = msg_id.as_str(),
                "message carries no route or endpoint information"
            );
        } else {
            let tried_ids = tried.join(",");
            warn!(
                event = events::DISPATCH_NO_CACHE,
                component = COMPONENT,
                msg_id = msg_id.as_str(),
                tried = tried_ids.as_str(),
                "no cache for any resolved route or endpoint identifier"
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::MessageDispatcher;
    use crate::control_plane::rule_registry::RuleRegistry;
    use crate::eventcache::{CacheDirectory, CacheError, EventCache, WindowSpec};
    use crate::message::EventMessage;
    use crate::routing::resolver::default_resolvers;
    use crate::rule::{CorrelationRule, RuleError, RuleListener};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedCache {
        novel: AtomicBool,
    }

    impl ScriptedCache {
        fn arc(novel: bool) -> Arc<Self> {
            Arc::new(Self {
                novel: AtomicBool::new(novel),
            })
        }
    }

    #[async_trait]
    impl EventCache for ScriptedCache {
        async fn add(&self, _message: Arc<EventMessage>) -> bool {
            self.novel.load(Ordering::SeqCst)
        }
    }

    struct FixedDirectory {
        caches: HashMap<String, Arc<dyn EventCache>>,
    }

    impl FixedDirectory {
        fn arc(entries: Vec<(&str, Arc<dyn EventCache>)>) -> Arc<dyn CacheDirectory> {
            Arc::new(Self {
                caches: entries
                    .into_iter()
                    .map(|(route_id, cache)| (route_id.to_string(), cache))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl CacheDirectory for FixedDirectory {
        async fn get_cache(
            &self,
            route_id: &str,
            _window: &WindowSpec,
        ) -> Result<Arc<dyn EventCache>, CacheError> {
            self.caches
                .get(route_id)
                .cloned()
                .ok_or_else(|| CacheError::Construction(format!("no cache for {route_id}")))
        }

        async fn lookup_cache(&self, route_id: &str) -> Option<Arc<dyn EventCache>> {
            self.caches.get(route_id).cloned()
        }

        async fn remove_cache(&self, _route_id: &str) {}

        async fn start(&self) -> Result<(), CacheError> {
            Ok(())
        }

        async fn stop(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    struct AlwaysMatchRule {
        name: String,
    }

    impl AlwaysMatchRule {
        fn arc(name: &str) -> Arc<dyn CorrelationRule> {
            Arc::new(Self {
                name: name.to_string(),
            })
        }
    }

    #[async_trait]
    impl CorrelationRule for AlwaysMatchRule {
        fn name(&self) -> &str {
            &self.name
        }

        fn bound_route_ids(&self) -> String {
            String::new()
        }

        async fn is_match(&self) -> bool {
            true
        }

        async fn start(&self) -> Result<(), RuleError> {
            Ok(())
        }

        async fn stop(&self) -> Result<(), RuleError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingListener {
        fired: AtomicUsize,
    }

    #[async_trait]
    impl RuleListener for CountingListener {
        async fn rule_fired(
            &self,
            _rule: &Arc<dyn CorrelationRule>,
            _message: &Arc<EventMessage>,
        ) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn duplicate_message_stops_before_rule_evaluation() {
        let cache = ScriptedCache::arc(false);
        let directory = FixedDirectory::arc(vec![("route-a", cache)]);
        let registry = RuleRegistry::new();
        let listener = Arc::new(CountingListener::default());
        registry
            .insert(
                AlwaysMatchRule::arc("r1"),
                Some(listener.clone()),
                vec!["route-a".to_string()],
            )
            .await;
        let resolvers = default_resolvers();

        MessageDispatcher::new(&directory, &registry, &resolvers)
            .dispatch(Arc::new(EventMessage::new(Vec::new()).with_route_id("route-a")))
            .await;

        assert_eq!(listener.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bindings_follow_the_identifier_that_produced_the_cache_hit() {
        // Cache only under the endpoint key; the rule is bound to that key,
        // not to the message's route id.
        let cache = ScriptedCache::arc(true);
        let directory = FixedDirectory::arc(vec![("key-a", cache)]);
        let registry = RuleRegistry::new();
        let listener = Arc::new(CountingListener::default());
        registry
            .insert(
                AlwaysMatchRule::arc("r1"),
                Some(listener.clone()),
                vec!["key-a".to_string()],
            )
            .await;
        let resolvers = default_resolvers();

        MessageDispatcher::new(&directory, &registry, &resolvers)
            .dispatch(Arc::new(
                EventMessage::new(Vec::new())
                    .with_route_id("route-a")
                    .with_endpoint_key("key-a"),
            ))
            .await;

        assert_eq!(listener.fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_hit_without_bindings_is_not_an_error() {
        let cache = ScriptedCache::arc(true);
        let directory = FixedDirectory::arc(vec![("route-a", cache)]);
        let registry = RuleRegistry::new();
        let resolvers = default_resolvers();

        MessageDispatcher::new(&directory, &registry, &resolvers)
            .dispatch(Arc::new(EventMessage::new(Vec::new()).with_route_id("route-a")))
            .await;
    }

    #[tokio::test]
    async fn unresolvable_message_is_dropped() {
        let directory = FixedDirectory::arc(Vec::new());
        let registry = RuleRegistry::new();
        let resolvers = default_resolvers();
        let dispatcher = MessageDispatcher::new(&directory, &registry, &resolvers);

        // No routing information at all.
        dispatcher
            .dispatch(Arc::new(EventMessage::new(Vec::new())))
            .await;
        // Route id resolved but no cache anywhere.
        dispatcher
            .dispatch(Arc::new(
                EventMessage::new(Vec::new())
                    .with_route_id("route-a")
                    .with_endpoint_key("key-a"),
            ))
            .await;
    }
}
