pub mod producer;

pub use producer::BusProducer;

/// Header names of the request/reply contract.
///
/// Shared by the inbound request consumer, the outbound directory client,
/// and every other service speaking this bus.
pub mod headers {
    /// Operation (request pattern) name.
    pub const OPERATION: &str = "operation";
    /// Correlates a reply with its request.
    pub const CORRELATION_ID: &str = "correlation-id";
    /// Topic the requester is listening on for the reply.
    pub const REPLY_TO: &str = "reply-to";
}
