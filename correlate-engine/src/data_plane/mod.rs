//! Data plane: the per-message dispatch path.

pub(crate) mod dispatcher;
