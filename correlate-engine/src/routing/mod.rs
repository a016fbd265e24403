//! Routing: message-to-cache identifier resolution policy.

pub(crate) mod resolver;
