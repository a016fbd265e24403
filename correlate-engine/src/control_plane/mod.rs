//! Control plane: rule registration bookkeeping and engine lifecycle.

pub(crate) mod engine_lifecycle;
pub(crate) mod rule_identity;
pub(crate) mod rule_registry;
