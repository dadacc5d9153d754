//! Text payload helpers.

/// Prepare edited text for insertion into source as a single literal.
///
/// Text with newlines becomes `` {`line one\nline two`} `` with each newline
/// written as the two characters `\n`; single-line text is unchanged.
pub fn wrap_multiline(text: &str) -> String {
    if text.contains('\n') {
        let escaped = text.replace('\n', "\\n");
        return format!("{{`{escaped}`}}");
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_unchanged() {
        assert_eq!(wrap_multiline("Hello world"), "Hello world");
    }

    #[test]
    fn multiline_is_escaped_and_wrapped() {
        assert_eq!(wrap_multiline("a\nb"), "{`a\\nb`}");
        assert_eq!(wrap_multiline("\n"), "{`\\n`}");
    }
}
