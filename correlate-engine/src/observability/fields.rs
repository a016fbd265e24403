//! Canonical structured field keys and value-format helpers.

use crate::message::EventMessage;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const ROUTE_ID: &str = "route_id";
pub const RULE: &str = "rule";
pub const MSG_ID: &str = "msg_id";

pub const NONE: &str = "none";

pub fn format_message_id(message: &EventMessage) -> String {
    message.id().hyphenated().to_string()
}

pub fn format_origin(message: &EventMessage) -> String {
    message
        .route_id()
        .or_else(|| message.endpoint_uri())
        .or_else(|| message.endpoint_key())
        .unwrap_or(NONE)
        .to_string()
}
