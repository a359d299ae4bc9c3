// Cover-letter generation: one external client, one shared rate limiter,
// an explicit per-request state machine, and an infallible template fallback.
// All generation-service calls go through client; no direct HTTP elsewhere.

pub mod client;
pub mod generator;
pub mod prompts;
pub mod rate_limit;
pub mod template;
