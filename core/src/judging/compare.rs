//! Output comparison and input normalization. Pure functions only.

/// Strict textual equality after trimming leading/trailing whitespace on
/// both sides. Internal structure is preserved: no token splitting, no
/// numeric tolerance.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

/// Normalizes authored test-case input for line-by-line readers:
/// CRLF becomes LF and a trailing newline is guaranteed.
pub fn normalize_input(input: &str) -> String {
    let mut s = input.replace("\r\n", "\n");
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_ignore_trailing_newline_differences() {
        assert!(outputs_match("5\n", "5"));
        assert!(outputs_match("5", "5\n"));
        assert!(outputs_match("  5  \n", "5"));
    }

    #[test]
    fn should_preserve_internal_structure() {
        assert!(outputs_match("1\n2\n", "1\n2"));
        assert!(!outputs_match("1 2", "1  2"));
        assert!(!outputs_match("1\n2", "1 2"));
    }

    #[test]
    fn empty_outputs_should_compare_equal() {
        assert!(outputs_match("", ""));
        assert!(outputs_match("\n", "  "));
    }

    #[test]
    fn mismatch_should_be_detected() {
        assert!(!outputs_match("6", "5"));
    }

    #[test]
    fn normalize_input_should_fix_crlf_and_trailing_newline() {
        assert_eq!(normalize_input("2 3"), "2 3\n");
        assert_eq!(normalize_input("a\r\nb\r\n"), "a\nb\n");
        assert_eq!(normalize_input("x\n"), "x\n");
    }
}
