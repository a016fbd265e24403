//! Ordered route-identifier resolution strategies.

use crate::message::EventMessage;

/// One strategy for naming the cache a message belongs to.
///
/// The engine tries its resolvers in order and settles on the first
/// identifier under which the cache directory holds a cache. New fallback
/// strategies slot in without touching dispatch logic.
pub trait RouteResolver: Send + Sync {
    fn resolve(&self, message: &EventMessage) -> Option<String>;
}

/// Primary resolution: the originating-route id, else the endpoint URI.
pub struct OriginRouteResolver;

impl RouteResolver for OriginRouteResolver {
    fn resolve(&self, message: &EventMessage) -> Option<String> {
        message
            .route_id()
            .or_else(|| message.endpoint_uri())
            .map(str::to_string)
    }
}

/// Fallback resolution: the originating-endpoint key.
pub struct EndpointKeyResolver;

impl RouteResolver for EndpointKeyResolver {
    fn resolve(&self, message: &EventMessage) -> Option<String> {
        message.endpoint_key().map(str::to_string)
    }
}

/// The resolver chain the engine uses unless told otherwise.
pub fn default_resolvers() -> Vec<Box<dyn RouteResolver>> {
    vec![Box::new(OriginRouteResolver), Box::new(EndpointKeyResolver)]
}

#[cfg(test)]
mod tests {
    use super::{default_resolvers, EndpointKeyResolver, OriginRouteResolver, RouteResolver};
    use crate::message::EventMessage;

    #[test]
    fn origin_resolver_prefers_route_id_over_endpoint_uri() {
        let message = EventMessage::new(Vec::new())
            .with_route_id("route-a")
            .with_endpoint_uri("direct://orders");

        assert_eq!(
            OriginRouteResolver.resolve(&message),
            Some("route-a".to_string())
        );
    }

    #[test]
    fn origin_resolver_falls_back_to_endpoint_uri() {
        let message = EventMessage::new(Vec::new()).with_endpoint_uri("direct://orders");

        assert_eq!(
            OriginRouteResolver.resolve(&message),
            Some("direct://orders".to_string())
        );
    }

    #[test]
    fn endpoint_key_resolver_only_reads_the_endpoint_key() {
        let message = EventMessage::new(Vec::new()).with_route_id("route-a");
        assert_eq!(EndpointKeyResolver.resolve(&message), None);

        let message = message.with_endpoint_key("direct://orders?block=true");
        assert_eq!(
            EndpointKeyResolver.resolve(&message),
            Some("direct://orders?block=true".to_string())
        );
    }

    #[test]
    fn default_chain_is_origin_then_endpoint_key() {
        let message = EventMessage::new(Vec::new())
            .with_route_id("route-a")
            .with_endpoint_key("key-a");

        let resolved: Vec<Option<String>> = default_resolvers()
            .iter()
            .map(|resolver| resolver.resolve(&message))
            .collect();

        assert_eq!(
            resolved,
            vec![Some("route-a".to_string()), Some("key-a".to_string())]
        );
    }
}
