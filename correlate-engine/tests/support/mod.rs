#![allow(dead_code)]

use async_trait::async_trait;
use correlate_engine::{
    CacheDirectory, CacheDirectoryFactory, CacheError, CorrelationRule, EventCache, EventEngine,
    EventMessage, RuleError, RuleListener, WindowSpec,
};
use correlate_cache_memory::MemoryCacheFactory;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use uuid::Uuid;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn make_engine(name: &str) -> EventEngine {
    init_logging();
    EventEngine::new(name, &MemoryCacheFactory, "memory").expect("memory engine")
}

/// Shared ordered record of lifecycle transitions across mocks.
pub type LifecycleLog = Arc<StdMutex<Vec<String>>>;

pub fn lifecycle_log() -> LifecycleLog {
    Arc::new(StdMutex::new(Vec::new()))
}

pub fn log_entries(log: &LifecycleLog) -> Vec<String> {
    log.lock().expect("lock lifecycle log").clone()
}

/// Scriptable rule: fixed name and bound-route list, switchable match
/// result, optional lifecycle logging and start failure.
pub struct TestRule {
    name: String,
    routes: String,
    matches: AtomicBool,
    fail_start: bool,
    log: Option<LifecycleLog>,
}

impl TestRule {
    pub fn matching(name: &str, routes: &str) -> Self {
        Self {
            name: name.to_string(),
            routes: routes.to_string(),
            matches: AtomicBool::new(true),
            fail_start: false,
            log: None,
        }
    }

    pub fn silent(name: &str, routes: &str) -> Self {
        let rule = Self::matching(name, routes);
        rule.matches.store(false, Ordering::SeqCst);
        rule
    }

    pub fn with_log(mut self, log: LifecycleLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn arc(self) -> Arc<dyn CorrelationRule> {
        Arc::new(self)
    }

    fn record(&self, transition: &str) {
        if let Some(log) = &self.log {
            log.lock()
                .expect("lock lifecycle log")
                .push(format!("{transition}:{}", self.name));
        }
    }
}

#[async_trait]
impl CorrelationRule for TestRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn bound_route_ids(&self) -> String {
        self.routes.clone()
    }

    async fn is_match(&self) -> bool {
        self.matches.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<(), RuleError> {
        self.record("rule_start");
        if self.fail_start {
            return Err(RuleError::new("scripted start failure"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), RuleError> {
        self.record("rule_stop");
        Ok(())
    }
}

/// Listener that records every (rule, message) notification.
#[derive(Default)]
pub struct RecordingListener {
    fired: StdMutex<Vec<(String, Uuid)>>,
}

impl RecordingListener {
    pub fn count(&self) -> usize {
        self.fired.lock().expect("lock fired").len()
    }

    pub fn fired_rules(&self) -> Vec<String> {
        self.fired
            .lock()
            .expect("lock fired")
            .iter()
            .map(|(rule, _)| rule.clone())
            .collect()
    }

    pub fn fired_messages(&self) -> Vec<Uuid> {
        self.fired
            .lock()
            .expect("lock fired")
            .iter()
            .map(|(_, id)| *id)
            .collect()
    }
}

#[async_trait]
impl RuleListener for RecordingListener {
    async fn rule_fired(&self, rule: &Arc<dyn CorrelationRule>, message: &Arc<EventMessage>) {
        self.fired
            .lock()
            .expect("lock fired")
            .push((rule.name().to_string(), message.id()));
    }
}

struct NullCache;

#[async_trait]
impl EventCache for NullCache {
    async fn add(&self, _message: Arc<EventMessage>) -> bool {
        true
    }
}

/// Directory that records lifecycle transitions and call counts.
#[derive(Default)]
pub struct RecordingDirectory {
    started: AtomicUsize,
    stopped: AtomicUsize,
    log: StdMutex<Option<LifecycleLog>>,
}

impl RecordingDirectory {
    pub fn with_log(log: LifecycleLog) -> Arc<Self> {
        let directory = Self::default();
        *directory.log.lock().expect("lock log slot") = Some(log);
        Arc::new(directory)
    }

    pub fn start_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    fn record(&self, transition: &str) {
        if let Some(log) = self.log.lock().expect("lock log slot").as_ref() {
            log.lock()
                .expect("lock lifecycle log")
                .push(transition.to_string());
        }
    }
}

#[async_trait]
impl CacheDirectory for RecordingDirectory {
    async fn get_cache(
        &self,
        _route_id: &str,
        _window: &WindowSpec,
    ) -> Result<Arc<dyn EventCache>, CacheError> {
        Ok(Arc::new(NullCache))
    }

    async fn lookup_cache(&self, _route_id: &str) -> Option<Arc<dyn EventCache>> {
        None
    }

    async fn remove_cache(&self, _route_id: &str) {}

    async fn start(&self) -> Result<(), CacheError> {
        self.record("directory_start");
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), CacheError> {
        self.record("directory_stop");
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out one shared, pre-built directory regardless of the
/// selector, so tests keep a handle onto the engine's directory.
pub struct SharedDirectoryFactory(pub Arc<RecordingDirectory>);

impl CacheDirectoryFactory for SharedDirectoryFactory {
    fn build(&self, _implementation: &str) -> Result<Arc<dyn CacheDirectory>, CacheError> {
        Ok(self.0.clone())
    }
}
