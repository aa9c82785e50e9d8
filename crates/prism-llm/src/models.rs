//! Known-model table: output ceilings, restricted parameter handling,
//! and fallback chains

use prism_config::ProviderKind;

/// Output-token ceiling for models absent from the table
pub const DEFAULT_TOKEN_CEILING: u32 = 8000;

/// Ceiling applied to restricted reasoning models
pub const RESTRICTED_TOKEN_CEILING: u32 = 4000;

/// Model families that reject `max_tokens`, temperature, and tools
const RESTRICTED_PREFIXES: &[&str] = &["o1", "o3", "o4-mini", "gpt-5"];

struct ModelSpec {
    id: &'static str,
    token_ceiling: u32,
}

const MODEL_TABLE: &[ModelSpec] = &[
    ModelSpec { id: "gpt-4o", token_ceiling: 16000 },
    ModelSpec { id: "gpt-4o-mini", token_ceiling: 16000 },
    ModelSpec { id: "gpt-4-turbo", token_ceiling: 4096 },
    ModelSpec { id: "gpt-5", token_ceiling: RESTRICTED_TOKEN_CEILING },
    ModelSpec { id: "o1", token_ceiling: RESTRICTED_TOKEN_CEILING },
    ModelSpec { id: "o3-mini", token_ceiling: RESTRICTED_TOKEN_CEILING },
    ModelSpec { id: "claude-sonnet-4-20250514", token_ceiling: 64000 },
    ModelSpec { id: "claude-3-7-sonnet-20250219", token_ceiling: 64000 },
    ModelSpec { id: "claude-3-5-sonnet-20241022", token_ceiling: 8192 },
    ModelSpec { id: "claude-3-5-haiku-20241022", token_ceiling: 8192 },
];

/// Models tried after the named one fails with a model-unavailable error
const FALLBACK_CHAINS: &[(&str, &[&str])] = &[
    ("gpt-4o", &["gpt-4o-mini", "gpt-4-turbo"]),
    ("gpt-4o-mini", &["gpt-4-turbo"]),
    ("gpt-5", &["gpt-4o", "gpt-4o-mini"]),
    ("claude-sonnet-4-20250514", &["claude-3-7-sonnet-20250219", "claude-3-5-sonnet-20241022"]),
    ("claude-3-7-sonnet-20250219", &["claude-3-5-sonnet-20241022"]),
    ("claude-3-5-haiku-20241022", &["claude-3-5-sonnet-20241022"]),
];

/// Default model when a configuration names none
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Completions => "gpt-4o",
        ProviderKind::Messages => "claude-sonnet-4-20250514",
    }
}

/// Whether the model rejects standard sampling parameters and tools
pub fn is_restricted(model: &str) -> bool {
    RESTRICTED_PREFIXES.iter().any(|p| model.starts_with(p))
}

/// Output-token ceiling for a model
pub fn token_ceiling(model: &str) -> u32 {
    if let Some(spec) = MODEL_TABLE.iter().find(|s| s.id == model) {
        return spec.token_ceiling;
    }
    if is_restricted(model) {
        RESTRICTED_TOKEN_CEILING
    } else {
        DEFAULT_TOKEN_CEILING
    }
}

/// Clamp a requested output budget to the model's ceiling
pub fn clamp_max_tokens(model: &str, requested: u32) -> u32 {
    requested.min(token_ceiling(model))
}

/// The model itself followed by its fallback chain, deduplicated
pub fn candidates(model: &str) -> Vec<String> {
    let mut out = vec![model.to_owned()];
    if let Some((_, chain)) = FALLBACK_CHAINS.iter().find(|(id, _)| *id == model) {
        for candidate in *chain {
            if !out.iter().any(|m| m == candidate) {
                out.push((*candidate).to_owned());
            }
        }
    }
    out
}
