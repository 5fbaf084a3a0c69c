/// Row limit for listing commands: the command's own default unless
/// `--limit` was given.
pub fn effective_limit(global_limit: Option<u32>, default_limit: u32) -> usize {
    usize::try_from(global_limit.unwrap_or(default_limit)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn global_limit_overrides_default() {
        assert_eq!(effective_limit(Some(5), 50), 5);
        assert_eq!(effective_limit(None, 50), 50);
    }
}
