//! Configuration templates for `scout init`.
//!
//! Templates are stored as valid TOML files. They are written out with every value commented,
//! so a fresh config changes nothing until the user opts in to a setting.

/// Default local configuration template (valid TOML).
const LOCAL_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Global configuration template (valid TOML).
const GLOBAL_TEMPLATE: &str = include_str!("../templates/config-global.toml");

/// Returns the local configuration template with its values commented out.
pub fn local_template() -> String {
    comment_values(LOCAL_TEMPLATE)
}

/// Returns the global configuration template with its values commented out.
pub fn global_template() -> String {
    comment_values(GLOBAL_TEMPLATE)
}

/// Comments out every `key = value` line.
///
/// Section headers stay active: an empty table parses to the same config as a missing one, and
/// keeping them makes the file easier to edit.
fn comment_values(template: &str) -> String {
    let mut result = String::with_capacity(template.len() + template.lines().count() * 2);
    for line in template.lines() {
        let trimmed = line.trim_start();
        if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with('[') {
            result.push_str("# ");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_config;

    #[test]
    fn local_template_parses_as_valid_toml() {
        let result = parse_config(LOCAL_TEMPLATE);
        assert!(result.is_ok(), "local template failed to parse: {result:?}");
    }

    #[test]
    fn global_template_parses_as_valid_toml() {
        let result = parse_config(GLOBAL_TEMPLATE);
        assert!(
            result.is_ok(),
            "global template failed to parse: {result:?}"
        );
    }

    #[test]
    fn commented_template_sets_nothing() {
        let config = parse_config(&local_template()).unwrap();
        let endpoints = config.endpoints.unwrap();
        assert!(endpoints.database_url.is_none());
        let search = config.search.unwrap();
        assert!(search.request_timeout.is_none());
        assert!(search.return_type.is_none());
    }

    #[test]
    fn comment_values_keeps_headers_and_comments() {
        let input = "# note\n[search]\nlimit = 5\n\n";
        assert_eq!(comment_values(input), "# note\n[search]\n# limit = 5\n\n");
    }
}
