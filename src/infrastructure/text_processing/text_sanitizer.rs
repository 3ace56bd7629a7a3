use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HYPHEN_NEWLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<prefix>\w)-[ \t]*\r?\n[ \t]*(?P<suffix>\w)").expect("valid hyphenation regex")
});

/// Normalizes text pulled out of one PDF page: NFKC, words re-joined across
/// hyphenated line breaks, runs of blank lines reduced to one, whitespace
/// inside a line collapsed to single spaces and control characters dropped.
pub fn normalize_page_text(raw: &str) -> String {
    let normalized: String = raw
        .nfkc()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    let de_hyphenated = HYPHEN_NEWLINE.replace_all(&normalized, "$prefix$suffix");

    let mut result = String::with_capacity(de_hyphenated.len());
    let mut pending_blank = false;

    for line in de_hyphenated.lines().map(str::trim) {
        if line.is_empty() {
            pending_blank = !result.is_empty();
            continue;
        }

        if !result.is_empty() {
            result.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        push_collapsed(line, &mut result);
        pending_blank = false;
    }

    result
}

fn push_collapsed(line: &str, out: &mut String) {
    let mut prev_was_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                out.push(' ');
            }
            prev_was_space = true;
        } else {
            out.push(ch);
            prev_was_space = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_words_split_by_hyphenated_line_breaks() {
        assert_eq!(normalize_page_text("retrie-\nval works"), "retrieval works");
    }

    #[test]
    fn collapses_blank_line_runs_and_inner_whitespace() {
        let raw = "  first   line \n\n\n\nsecond\tline\n";
        assert_eq!(normalize_page_text(raw), "first line\n\nsecond line");
    }

    #[test]
    fn drops_control_characters() {
        assert_eq!(normalize_page_text("a\u{0000}b\u{000C}c"), "abc");
    }

    #[test]
    fn blank_input_yields_empty_string() {
        assert_eq!(normalize_page_text(" \n\t \n"), "");
    }
}
