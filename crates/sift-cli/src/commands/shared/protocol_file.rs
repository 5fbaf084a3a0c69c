use std::path::Path;

use anyhow::Context;
use sift_core::entities::Protocol;

/// Read a review protocol from a `.toml` file, or JSON otherwise.
pub fn read_protocol(path: &Path) -> anyhow::Result<Protocol> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read protocol file {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let protocol: Protocol = if is_toml {
        toml::from_str(&text)
            .with_context(|| format!("invalid TOML protocol in {}", path.display()))?
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON protocol in {}", path.display()))?
    };

    if protocol.display_question().trim().is_empty() {
        anyhow::bail!(
            "protocol in {} has neither a main question nor a project name",
            path.display()
        );
    }
    Ok(protocol)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::read_protocol;

    #[test]
    fn reads_json_protocol() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("protocol.json");
        std::fs::write(
            &path,
            r#"{"main_question":"Does gamification improve learning?","subquestions":["Effect on grades"],"pico":{"population":"students"}}"#,
        )
        .expect("write protocol");

        let protocol = read_protocol(&path).expect("protocol should parse");
        assert_eq!(protocol.main_question, "Does gamification improve learning?");
        assert_eq!(protocol.subquestions, vec!["Effect on grades".to_string()]);
        assert_eq!(protocol.pico.population, "students");
        assert_eq!(protocol.pico.outcome, "");
    }

    #[test]
    fn reads_toml_protocol() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("protocol.toml");
        std::fs::write(
            &path,
            "project_name = \"Gamification\"\nsubquestions = [\"A\", \"B\"]\n\n[pico]\nintervention = \"gamification\"\n",
        )
        .expect("write protocol");

        let protocol = read_protocol(&path).expect("protocol should parse");
        assert_eq!(protocol.display_question(), "Gamification");
        assert_eq!(protocol.subquestions.len(), 2);
        assert_eq!(protocol.pico.intervention, "gamification");
    }

    #[test]
    fn rejects_protocol_without_a_question() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("protocol.json");
        std::fs::write(&path, "{}").expect("write protocol");

        let err = read_protocol(&path).expect_err("empty protocol should fail");
        assert!(err.to_string().contains("neither a main question"));
    }
}
