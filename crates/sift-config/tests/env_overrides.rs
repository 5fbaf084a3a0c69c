use figment::Jail;
use sift_config::{ConfigError, SiftConfig};

#[test]
fn env_overrides_nested_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("SIFT_SOURCES__TIMEOUT_SECS", "7");
        jail.set_env("SIFT_GENERATOR__API_KEY", "gsk_from_env");

        let config = SiftConfig::load().expect("config loads");
        assert_eq!(config.sources.timeout_secs, 7);
        assert!(config.generator.is_configured());
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".sift")?;
        jail.create_file(".sift/config.toml", "[store]\npath = \"from-toml.db\"\n")?;
        jail.set_env("SIFT_STORE__PATH", "from-env.db");

        let config = SiftConfig::load().expect("config loads");
        assert_eq!(config.store.path, "from-env.db");
        Ok(())
    });
}

#[test]
fn invalid_env_value_is_reported() {
    Jail::expect_with(|jail| {
        jail.set_env("SIFT_SEARCH__YEAR_FROM", "2030");
        jail.set_env("SIFT_SEARCH__YEAR_TO", "2020");

        let err = SiftConfig::load().expect_err("inverted range");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
