use crate::models::profile::Profile;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder regex"))
}

/// Collapses a placeholder key to its canonical variable name:
/// trimmed, lower-cased, internal whitespace runs become single
/// underscores. `{{First Name}}` and `{{ first_name }}` resolve the
/// same; `{{FirstName}}` does not (casing boundaries are not split).
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            in_gap = true;
            continue;
        }
        if in_gap && !out.is_empty() {
            out.push('_');
        }
        in_gap = false;
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

/// Substitutes every `{{ key }}` placeholder from `vars`. Unknown keys
/// render as the empty string rather than passing through literally.
/// Output is not trimmed; callers decide.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures| {
            let key = normalize_key(&caps[1]);
            vars.get(&key).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// True when a body still carries placeholder syntax. The dispatcher
/// refuses to send anything for which this holds.
pub fn has_unresolved(body: &str) -> bool {
    body.contains("{{") || body.contains("}}")
}

/// Recruit-side variables for one render.
pub fn recruit_vars(first_name: &str, last_name: &str) -> HashMap<String, String> {
    let full = format!("{} {}", first_name, last_name).trim().to_string();
    let mut vars = HashMap::new();
    vars.insert("first_name".to_string(), first_name.to_string());
    vars.insert("last_name".to_string(), last_name.to_string());
    vars.insert("full_name".to_string(), full);
    vars
}

/// Sender-side variables, merged into `vars`. `sender_name` is a legacy
/// alias kept for existing templates: full name, else first name, else
/// the configured default display name.
pub fn add_sender_vars(
    vars: &mut HashMap<String, String>,
    profile: Option<&Profile>,
    default_sender_name: &str,
) {
    let first = profile.map(|p| p.first_name.clone()).unwrap_or_default();
    let last = profile.map(|p| p.last_name.clone()).unwrap_or_default();
    let full = format!("{} {}", first, last).trim().to_string();

    let legacy = if !full.is_empty() {
        full.clone()
    } else if !first.is_empty() {
        first.clone()
    } else {
        default_sender_name.to_string()
    };

    vars.insert("sender_first_name".to_string(), first);
    vars.insert("sender_last_name".to_string(), last);
    vars.insert("sender_full_name".to_string(), full);
    vars.insert("sender_name".to_string(), legacy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn key_normalization_equivalence() {
        let v = vars(&[("first_name", "Ana")]);
        assert_eq!(render("{{First Name}}", &v), "Ana");
        assert_eq!(render("{{ first_name }}", &v), "Ana");
        assert_eq!(render("{{FIRST   NAME}}", &v), "Ana");
    }

    #[test]
    fn casing_boundaries_are_not_split() {
        // "FirstName" normalizes to "firstname", a distinct key.
        let v = vars(&[("first_name", "Ana")]);
        assert_eq!(render("{{FirstName}}", &v), "");
    }

    #[test]
    fn unknown_key_renders_empty() {
        assert_eq!(render("Hi {{nickname}}", &HashMap::new()), "Hi ");
    }

    #[test]
    fn render_is_idempotent_once_fully_substituted() {
        let v = vars(&[("first_name", "Ana"), ("sender_name", "Bob")]);
        let once = render("Hi {{first_name}}, this is {{sender_name}}.", &v);
        assert!(!has_unresolved(&once));
        assert_eq!(render(&once, &v), once);
    }

    #[test]
    fn recruit_full_name_trims() {
        let v = recruit_vars("Ana", "");
        assert_eq!(v["full_name"], "Ana");
        let v = recruit_vars("Ana", "Silva");
        assert_eq!(v["full_name"], "Ana Silva");
    }

    #[test]
    fn sender_name_fallback_chain() {
        let mut v = HashMap::new();
        add_sender_vars(&mut v, None, "The team");
        assert_eq!(v["sender_name"], "The team");
        assert_eq!(v["sender_full_name"], "");

        let profile = Profile {
            user_id: Uuid::new_v4(),
            first_name: "Kim".to_string(),
            last_name: "".to_string(),
            created_at: Utc::now(),
        };
        let mut v = HashMap::new();
        add_sender_vars(&mut v, Some(&profile), "The team");
        assert_eq!(v["sender_name"], "Kim");
        assert_eq!(v["sender_full_name"], "Kim");
    }

    #[test]
    fn detects_unresolved_placeholders() {
        assert!(has_unresolved("Hello {{name"));
        assert!(has_unresolved("name}} hello"));
        assert!(!has_unresolved("Hello Ana"));
    }
}
