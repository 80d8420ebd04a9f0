// Shared prompt fragments. Each module that calls the extraction service keeps
// its own prompts.rs next to it and appends these where needed.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every extraction prompt so absent values come back uniformly.
pub const MISSING_VALUE_INSTRUCTION: &str =
    "If you cannot find a value, use \"Not found\" as the value.";
