use sift_config::SiftConfig;

/// Emit warnings for likely mistyped env var keys and for sources that
/// degrade without credentials.
pub fn warn_unconfigured(config: &SiftConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &SiftConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.generator.is_configured() && has_env_prefix(&env_keys, "SIFT_GENERATOR") {
        warnings.push(
            "Generator config appears default while SIFT_GENERATOR* env vars exist. Use double underscores (example: SIFT_GENERATOR__API_KEY)."
                .to_string(),
        );
    }

    if !config.sources.has_contact_email() && has_env_prefix(&env_keys, "SIFT_SOURCES") {
        warnings.push(
            "No contact email configured while SIFT_SOURCES* env vars exist. Use double underscores (example: SIFT_SOURCES__CONTACT_EMAIL)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use sift_config::SiftConfig;

    use super::collect_unconfigured_warnings;

    #[test]
    fn warns_for_unconfigured_sections_with_env_prefixes() {
        let config = SiftConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("SIFT_GENERATOR_API_KEY".to_string(), "gsk_demo".to_string()),
                ("SIFT_SOURCES_CONTACT_EMAIL".to_string(), "a@b.org".to_string()),
            ],
        );

        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn does_not_warn_without_matching_env_vars() {
        let config = SiftConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![("HOME".to_string(), "/home/demo".to_string())],
        );

        assert!(warnings.is_empty());
    }
}
