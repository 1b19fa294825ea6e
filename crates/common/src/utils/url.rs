/// Join `base` and `path` with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn exactly_one_slash() {
        assert_eq!(join_url("http://a:1", "/ready"), "http://a:1/ready");
        assert_eq!(join_url("http://a:1/", "/ready"), "http://a:1/ready");
        assert_eq!(join_url("http://a:1/", "ready"), "http://a:1/ready");
        assert_eq!(join_url("http://a:1", "ready"), "http://a:1/ready");
    }
}
