//! Tool identifier sanitization.
//!
//! Language-model runtimes accept tool identifiers matching
//! `^[A-Za-z0-9_-]{1,128}$`. Every source of tools (skills, remote servers,
//! peer agents) goes through [`sanitize_tool_name`] so the rule is identical
//! across sources.

/// Maximum length of a tool identifier.
pub const MAX_TOOL_NAME_LEN: usize = 128;

/// Maximum length of the peer-name portion of an `ask_agent_*` identifier.
pub const MAX_PEER_NAME_LEN: usize = 100;

/// Prefix applied to peer-invocation tools.
pub const PEER_TOOL_PREFIX: &str = "ask_agent_";

const FALLBACK_NAME: &str = "_";

/// Sanitizes a raw name into a valid tool identifier.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, runs of `_` collapse to one,
/// edge underscores are trimmed, and the result is capped at
/// [`MAX_TOOL_NAME_LEN`] characters. Applying the function twice yields the
/// same result as applying it once.
#[must_use]
pub fn sanitize_tool_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let mapped = if is_allowed(ch) { ch } else { '_' };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    let trimmed: String = out.trim_matches('_').chars().take(MAX_TOOL_NAME_LEN).collect();
    let trimmed = trimmed.trim_end_matches('_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Builds the tool identifier used to ask `peer_name` a question.
#[must_use]
pub fn peer_tool_name(peer_name: &str) -> String {
    let peer: String = sanitize_tool_name(peer_name)
        .chars()
        .take(MAX_PEER_NAME_LEN)
        .collect();
    sanitize_tool_name(&format!("{PEER_TOOL_PREFIX}{peer}"))
}

/// Returns `true` when `name` already satisfies the identifier constraint.
#[must_use]
pub fn is_valid_tool_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_TOOL_NAME_LEN).contains(&len) && name.chars().all(is_allowed)
}

const fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_worked_example() {
        assert_eq!(sanitize_tool_name("Weather Lookup!!"), "Weather_Lookup");
    }

    #[test]
    fn collapses_runs_and_keeps_dashes() {
        assert_eq!(sanitize_tool_name("a  b__c--d"), "a_b_c--d");
        assert_eq!(sanitize_tool_name("héllo wörld"), "h_llo_w_rld");
    }

    #[test]
    fn sanitization_is_idempotent() {
        let samples = [
            "Weather Lookup!!",
            "__lead",
            "!!!",
            "",
            "ok-name_1",
            "ünïcödé ☃ tool",
            &"x".repeat(300),
            &format!("{}!{}", "a".repeat(127), "b".repeat(10)),
        ];
        for raw in samples {
            let once = sanitize_tool_name(raw);
            assert_eq!(sanitize_tool_name(&once), once, "input {raw:?}");
            assert!(is_valid_tool_name(&once), "output {once:?}");
        }
    }

    #[test]
    fn truncates_to_limit() {
        let name = sanitize_tool_name(&"a".repeat(500));
        assert_eq!(name.len(), MAX_TOOL_NAME_LEN);
    }

    #[test]
    fn empty_results_fall_back() {
        assert_eq!(sanitize_tool_name("!!!"), "_");
    }

    #[test]
    fn peer_names_are_prefixed_and_capped() {
        assert_eq!(peer_tool_name("Research Bot"), "ask_agent_Research_Bot");
        let long = peer_tool_name(&"r".repeat(400));
        assert_eq!(long.len(), PEER_TOOL_PREFIX.len() + MAX_PEER_NAME_LEN);
        assert!(is_valid_tool_name(&long));
    }
}
