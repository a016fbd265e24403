//! Canonical structured event names used across `correlate-engine`.

// Dispatch events.
pub const DISPATCH_NO_ROUTE_INFO: &str = "dispatch_no_route_info";
pub const DISPATCH_NO_CACHE: &str = "dispatch_no_cache";
pub const DISPATCH_DUPLICATE: &str = "dispatch_duplicate";
pub const DISPATCH_NO_BINDINGS: &str = "dispatch_no_bindings";
pub const DISPATCH_RULE_FIRED: &str = "dispatch_rule_fired";

// Registry events.
pub const RULE_ADD_OK: &str = "rule_add_ok";
pub const RULE_REMOVE_OK: &str = "rule_remove_ok";
pub const RULE_REMOVE_MISSING: &str = "rule_remove_missing";

// Route cache passthrough events.
pub const ROUTE_ADD_OK: &str = "route_add_ok";
pub const ROUTE_REMOVE_OK: &str = "route_remove_ok";

// Engine lifecycle events.
pub const ENGINE_CREATE: &str = "engine_create";
pub const ENGINE_START_OK: &str = "engine_start_ok";
pub const ENGINE_STOP_OK: &str = "engine_stop_ok";
