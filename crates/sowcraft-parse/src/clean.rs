//! Strip model reasoning and tool traffic from a raw response before parsing.

use std::sync::LazyLock;

use regex::Regex;

static REASONING_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<ai_think>.*?</ai_think>|<thinking>.*?</thinking>|",
        r"<think>.*?</think>|<tool_call>.*?</tool_call>",
    ))
    .expect("reasoning block pattern")
});

static ORPHAN_THINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?think>").expect("orphan think pattern"));

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--.*?-->").expect("comment pattern"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));

/// Remove `<think>`/`<thinking>`/`<AI_THINK>`/`<tool_call>` blocks, orphan think
/// tags and single-line HTML comments. Line endings become `\n`, runs of blank
/// lines collapse to one, and the result is trimmed.
pub fn clean_content(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = REASONING_BLOCKS.replace_all(&text, "");
    let text = ORPHAN_THINK.replace_all(&text, "");
    let text = HTML_COMMENT.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_blocks_across_lines() {
        let raw = "<think>\nplan the\nSOW\n</think>\n# Title\n<AI_THINK>x</AI_THINK>Body";
        assert_eq!(clean_content(raw), "# Title\nBody");
    }

    #[test]
    fn strips_tool_calls_and_comments() {
        let raw = r#"Intro <!-- internal note -->
<tool_call>{"name":"search"}</tool_call>
Outro"#;
        assert_eq!(clean_content(raw), "Intro \n\nOutro");
    }

    #[test]
    fn strips_orphan_tags_case_insensitively() {
        assert_eq!(clean_content("</THINK>Hello<think>"), "Hello");
    }

    #[test]
    fn collapses_blank_runs_and_crlf() {
        assert_eq!(clean_content("a\r\n\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn leaves_plain_text_alone() {
        let text = "# Heading\n\n- item\n";
        assert_eq!(clean_content(text), "# Heading\n\n- item");
    }
}
