//! Shell escaping for remote command templates
//!
//! Container names and key lines are interpolated into fixed shell
//! templates; both go through single-quote escaping first.

/// Escape a string for use inside a single-quoted shell string.
///
/// Replaces each single quote with `'"'"'`: end the quoted string, emit a
/// literal quote inside double quotes, reopen the quoted string.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\'', "'\"'\"'")
}

/// Wrap a value as a single-quoted shell argument.
pub fn quote_arg(s: &str) -> String {
    format!("'{}'", escape_single_quoted(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_no_quotes() {
        assert_eq!(escape_single_quoted("web-frontend"), "web-frontend");
    }

    #[test]
    fn test_escape_with_quotes() {
        assert_eq!(escape_single_quoted("it's"), "it'\"'\"'s");
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("db"), "'db'");
        assert_eq!(quote_arg("a'b"), "'a'\"'\"'b'");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape_single_quoted(""), "");
        assert_eq!(quote_arg(""), "''");
    }
}
