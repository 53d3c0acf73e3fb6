// Resume Generation Engine
// Implements: prompt composition, structured generation, reconciliation,
// traceability guard, and the HTTP handlers that drive them.
// All LLM calls go through llm_client; nothing here talks to the service directly.

pub mod composer;
pub mod generator;
pub mod grounding;
pub mod handlers;
pub mod prompts;
pub mod reconciler;
