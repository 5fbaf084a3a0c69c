use serde::de::DeserializeOwned;
use sift_core::enums::SourceId;

/// Parse a `snake_case` enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse source names, accepting the short aliases (`s2`, `pm`, `cr`, `epmc`).
pub fn parse_sources(raw: &[String]) -> anyhow::Result<Vec<SourceId>> {
    raw.iter()
        .map(|name| {
            name.parse::<SourceId>()
                .map_err(|error| anyhow::anyhow!("invalid source '{name}': {error}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sift_core::enums::{ScreeningStatus, SourceId};

    use super::{parse_enum, parse_sources};

    #[test]
    fn parses_snake_case_enum() {
        let status: ScreeningStatus =
            parse_enum("Included", "status").expect("status should parse");
        assert_eq!(status, ScreeningStatus::Included);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<ScreeningStatus>("maybe", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'maybe'"));
    }

    #[test]
    fn parses_source_aliases() {
        let sources = parse_sources(&["pm".to_string(), "europe-pmc".to_string()])
            .expect("sources should parse");
        assert_eq!(sources, vec![SourceId::PubMed, SourceId::EuropePmc]);
        assert!(parse_sources(&["scopus".to_string()]).is_err());
    }
}
