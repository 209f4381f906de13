//! Small text helpers shared by the emitters.

/// Pad `text` with trailing spaces to reach `spacing` characters.
pub fn spaced_string(text: &str, spacing: usize) -> String {
    let mut output = text.to_string();
    while output.chars().count() < spacing {
        output.push(' ');
    }
    output
}

/// Reflow a potentially long comment onto lines of at most 80 characters,
/// each starting with `prefix` and a space. Returns the text without a
/// trailing linefeed; an empty comment yields just the prefix.
pub fn output_long_comment(prefix: &str, comment: &str) -> String {
    let words: Vec<&str> = comment.split_whitespace().collect();
    if words.is_empty() {
        return prefix.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = prefix.to_string();

    for word in words {
        if line.len() + 1 + word.len() > 80 && line.len() > prefix.len() {
            lines.push(std::mem::replace(&mut line, prefix.to_string()));
        }
        line.push(' ');
        line.push_str(word);
    }
    lines.push(line);

    lines.join("\n")
}

/// Ensure `output` ends with exactly one blank line, unless it is empty.
pub fn make_line_separator(output: &mut String) {
    if output.is_empty() {
        return;
    }
    while output.ends_with('\n') {
        output.pop();
    }
    output.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaced_string_pads_to_width() {
        assert_eq!(spaced_string("ab", 4), "ab  ");
        assert_eq!(spaced_string("abcd", 2), "abcd");
    }

    #[test]
    fn long_comments_wrap_at_eighty() {
        let comment = "word ".repeat(30);
        let wrapped = output_long_comment(" *", &comment);
        for line in wrapped.lines() {
            assert!(line.len() <= 80, "line too long: {}", line);
            assert!(line.starts_with(" *"));
        }
    }

    #[test]
    fn line_separator_leaves_one_blank_line() {
        let mut text = String::from("int a;\n\n\n\n");
        make_line_separator(&mut text);
        assert_eq!(text, "int a;\n\n");

        make_line_separator(&mut text);
        assert_eq!(text, "int a;\n\n");

        let mut empty = String::new();
        make_line_separator(&mut empty);
        assert!(empty.is_empty());
    }
}
