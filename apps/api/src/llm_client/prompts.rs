// Cross-cutting prompt fragments owned by the client itself.
// Resume-specific prompts live in generation/prompts.rs.

/// Appended to the system prompt when the service cannot enforce a schema.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

pub const CONNECTION_CHECK_SYSTEM: &str = "You are a connectivity probe. Reply with the word OK.";

pub const CONNECTION_CHECK_PROMPT: &str = "Reply with OK.";
