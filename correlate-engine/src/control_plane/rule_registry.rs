//! Dual-index rule registry: route->bindings and rule->routes bookkeeping.

use crate::control_plane::rule_identity::RuleIdentityKey;
use crate::rule::{CorrelationRule, RuleListener};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One rule registered against one route identifier occurrence.
#[derive(Clone)]
pub(crate) struct RuleBinding {
    pub(crate) rule: Arc<dyn CorrelationRule>,
    pub(crate) listener: Option<Arc<dyn RuleListener>>,
}

type BindingSnapshot = HashMap<String, Arc<[RuleBinding]>>;

#[derive(Default)]
struct RegistryState {
    /// Route identifier -> bindings in registration order. Never holds an
    /// empty bucket.
    route_bindings: HashMap<String, Vec<RuleBinding>>,
    /// Rule identity -> route identifiers it was registered against, with
    /// duplicates preserved.
    rule_routes: HashMap<RuleIdentityKey, Vec<String>>,
}

/// Registry owning both rule indices.
///
/// Mutations are serialized behind one mutex so the two indices always
/// change together; a dispatch racing a registration sees either the full
/// pre-mutation view or the full post-mutation view, never a half-applied
/// one. Reads go through a republished [`ArcSwap`] snapshot and take no
/// lock, so dispatch can iterate a route's bindings while a removal for the
/// same route is in flight.
pub(crate) struct RuleRegistry {
    state: Mutex<RegistryState>,
    snapshot: ArcSwap<BindingSnapshot>,
}

impl RuleRegistry {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            snapshot: ArcSwap::from_pointee(BindingSnapshot::new()),
        }
    }

    /// Registers `rule` under every identifier in `route_ids`, in order.
    ///
    /// Duplicate identifiers create one binding each. An empty `route_ids`
    /// leaves the rule inert but still lifecycle-owned. Re-registering an
    /// already-known rule accretes onto its existing route list.
    pub(crate) async fn insert(
        &self,
        rule: Arc<dyn CorrelationRule>,
        listener: Option<Arc<dyn RuleListener>>,
        route_ids: Vec<String>,
    ) {
        let mut state = self.state.lock().await;
        let RegistryState {
            route_bindings,
            rule_routes,
        } = &mut *state;

        let routes = rule_routes
            .entry(RuleIdentityKey::new(rule.clone()))
            .or_default();
        for route_id in route_ids {
            routes.push(route_id.clone());
            route_bindings.entry(route_id).or_default().push(RuleBinding {
                rule: rule.clone(),
                listener: listener.clone(),
            });
        }

        self.publish(&state);
    }

    /// Removes every binding of `rule` and its rule->routes entry.
    ///
    /// Returns `false` without touching the indices when the rule was not
    /// registered.
    pub(crate) async fn remove(&self, rule: &Arc<dyn CorrelationRule>) -> bool {
        let mut state = self.state.lock().await;

        let Some(routes) = state
            .rule_routes
            .remove(&RuleIdentityKey::new(rule.clone()))
        else {
            return false;
        };

        for route_id in routes {
            // A duplicate identifier in the route list drops the key on its
            // first pass; later passes find nothing, which is fine.
            if let Some(bindings) = state.route_bindings.get_mut(&route_id) {
                bindings.retain(|binding| !Arc::ptr_eq(&binding.rule, rule));
                if bindings.is_empty() {
                    state.route_bindings.remove(&route_id);
                }
            }
        }

        self.publish(&state);
        true
    }

    /// Lock-free view of one route's bindings, in registration order.
    pub(crate) fn bindings_for(&self, route_id: &str) -> Option<Arc<[RuleBinding]>> {
        self.snapshot.load().get(route_id).cloned()
    }

    /// All registered rules, gathered from the rule->routes keys at call
    /// time. This is the ownership list the lifecycle cascade walks.
    pub(crate) async fn rules(&self) -> Vec<Arc<dyn CorrelationRule>> {
        self.state
            .lock()
            .await
            .rule_routes
            .keys()
            .map(|key| key.rule().clone())
            .collect()
    }

    fn publish(&self, state: &RegistryState) {
        let snapshot: BindingSnapshot = state
            .route_bindings
            .iter()
            .map(|(route_id, bindings)| (route_id.clone(), Arc::from(bindings.clone())))
            .collect();
        self.snapshot.store(Arc::new(snapshot));
    }
}
