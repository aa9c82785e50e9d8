use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback is supported via `{{ env.VAR | default("value") }}`.
/// Expansion happens before deserialization so config structs hold plain
/// `String`/`SecretString` values. TOML comment lines pass through unchanged.
pub fn expand_env(input: &str) -> Result<String, String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    });

    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for captures in re.captures_iter(line) {
            let whole = captures.get(0).expect("match exists");
            let var_name = captures.get(1).expect("group 1 exists").as_str();
            let fallback = captures.get(2).map(|m| m.as_str());

            output.push_str(&line[last_end..whole.start()]);

            match std::env::var(var_name) {
                Ok(value) => output.push_str(&value),
                Err(_) => match fallback {
                    Some(value) => output.push_str(value),
                    None => return Err(format!("environment variable not found: `{var_name}`")),
                },
            }

            last_end = whole.end();
        }
        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_placeholders() {
        let input = "key = \"value\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("PRISM_TEST_KEY", Some("sk-123"), || {
            let result = expand_env("api_key = \"{{ env.PRISM_TEST_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn missing_variable_errors() {
        temp_env::with_var_unset("PRISM_MISSING", || {
            let err = expand_env("key = \"{{ env.PRISM_MISSING }}\"").unwrap_err();
            assert!(err.contains("PRISM_MISSING"));
        });
    }

    #[test]
    fn default_applies_when_unset() {
        temp_env::with_var_unset("PRISM_OPTIONAL", || {
            let result = expand_env("key = \"{{ env.PRISM_OPTIONAL | default(\"none\") }}\"").unwrap();
            assert_eq!(result, "key = \"none\"");
        });
    }

    #[test]
    fn default_ignored_when_set() {
        temp_env::with_var("PRISM_OPTIONAL2", Some("real"), || {
            let result = expand_env("key = \"{{ env.PRISM_OPTIONAL2 | default(\"none\") }}\"").unwrap();
            assert_eq!(result, "key = \"real\"");
        });
    }

    #[test]
    fn comment_lines_skip_expansion() {
        temp_env::with_var_unset("PRISM_MISSING", || {
            let input = "# key = \"{{ env.PRISM_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
