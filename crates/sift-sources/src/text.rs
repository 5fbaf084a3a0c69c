//! Small text helpers shared by the response mappers.

/// Drop markup tags (JATS/HTML) and collapse whitespace.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First run of four ASCII digits, read as a year (`"2021 Mar 4"` → 2021).
pub fn leading_year(input: &str) -> Option<i32> {
    let bytes = input.as_bytes();
    bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|start| input[start..start + 4].parse().ok())
}

/// `None` for blank strings, trimmed otherwise.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jats_tags() {
        assert_eq!(
            strip_markup("<jats:p>Background:  gamified <jats:italic>learning</jats:italic></jats:p>"),
            "Background: gamified learning"
        );
    }

    #[test]
    fn reads_leading_year() {
        assert_eq!(leading_year("2021 Mar 4"), Some(2021));
        assert_eq!(leading_year("Spring 1999"), Some(1999));
        assert_eq!(leading_year("n.d."), None);
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" 10.1/x ".into())), Some("10.1/x".into()));
        assert_eq!(non_blank(None), None);
    }
}
