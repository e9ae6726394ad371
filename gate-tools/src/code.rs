//! Code skills.
//!
//! No user code is evaluated; the call acknowledges the query so the model
//! learns the skill exists and was reached.

use serde_json::{Value, json};

/// Builds the acknowledgement returned by a code skill.
#[must_use]
pub fn acknowledge(skill_name: &str, query: &str) -> Value {
    json!({
        "result": format!("Code skill \"{skill_name}\" executed with query: {query}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledgement_names_skill_and_query() {
        assert_eq!(
            acknowledge("Summarize", "latest news"),
            json!({"result": "Code skill \"Summarize\" executed with query: latest news"})
        );
    }
}
