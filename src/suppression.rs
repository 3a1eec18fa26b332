use std::sync::OnceLock;

/// Query key that disables the widget when set to `0`.
pub const QUERY_KEY: &str = "floating-ball";

const DISABLE_VALUE: &str = "0";

static LAUNCH_QUERY: OnceLock<String> = OnceLock::new();

/// Stores the process launch query (from `--query`). First caller wins.
pub fn set_launch_query(query: impl Into<String>) {
    if LAUNCH_QUERY.set(query.into()).is_err() {
        log::warn!("launch query already set, ignoring");
    }
}

/// True when the query string carries `floating-ball=0`.
pub fn query_disables(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split(['&', ';'])
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key.trim() == QUERY_KEY && value.trim() == DISABLE_VALUE)
}

/// Checked independently by widget creation and loader auto-initialization.
pub fn is_suppressed() -> bool {
    if LAUNCH_QUERY.get().is_some_and(|query| query_disables(query)) {
        return true;
    }
    std::env::var("FLOATING_BALL").is_ok_and(|value| value == DISABLE_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_disables() {
        assert!(query_disables("floating-ball=0"));
        assert!(query_disables("?floating-ball=0"));
        assert!(query_disables("theme=dark&floating-ball=0"));
        assert!(query_disables("floating-ball=0;other=1"));
    }

    #[test]
    fn test_query_allows() {
        assert!(!query_disables(""));
        assert!(!query_disables("floating-ball=1"));
        assert!(!query_disables("floating-ball"));
        assert!(!query_disables("other=0"));
        assert!(!query_disables("floating-ball-extra=0"));
    }
}
