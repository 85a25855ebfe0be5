//! Inline formatting: `**bold**`, `*italic*`, `_italic_`.
//!
//! A marker only opens a span when a matching closer exists later in the line
//! with non-blank text between them; otherwise it is kept as literal text.
//! Output never contains empty runs, and adjacent runs with the same marks are
//! merged.

use sowcraft_core::Inline;

pub fn parse_inline(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    parse_span(&chars, false, false, &mut runs);
    merge_runs(runs)
}

fn parse_span(chars: &[char], bold: bool, italic: bool, out: &mut Vec<Inline>) {
    let mut buf = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '*' && chars.get(i + 1) == Some(&'*') {
            if !bold && let Some(end) = find_double_star(chars, i + 2) {
                flush(&mut buf, bold, italic, out);
                parse_span(&chars[i + 2..end], true, italic, out);
                i = end + 2;
                continue;
            }
            buf.push_str("**");
            i += 2;
            continue;
        }

        if c == '*' && !italic && let Some(end) = find_single_star(chars, i + 1) {
            flush(&mut buf, bold, italic, out);
            parse_span(&chars[i + 1..end], bold, true, out);
            i = end + 1;
            continue;
        }

        if c == '_'
            && !italic
            && (i == 0 || !chars[i - 1].is_alphanumeric())
            && let Some(end) = find_underscore(chars, i + 1)
        {
            flush(&mut buf, bold, italic, out);
            parse_span(&chars[i + 1..end], bold, true, out);
            i = end + 1;
            continue;
        }

        buf.push(c);
        i += 1;
    }

    flush(&mut buf, bold, italic, out);
}

fn flush(buf: &mut String, bold: bool, italic: bool, out: &mut Vec<Inline>) {
    if !buf.is_empty() {
        out.push(Inline::styled(std::mem::take(buf), bold, italic));
    }
}

fn has_text(chars: &[char]) -> bool {
    chars.iter().any(|c| !c.is_whitespace())
}

/// Closing `**` for a span starting at `from`. In a run of three or more stars
/// the last pair closes, so `***x***` reads as bold around `*x*`.
fn find_double_star(chars: &[char], from: usize) -> Option<usize> {
    let mut j = from;
    while j + 1 < chars.len() {
        if chars[j] == '*'
            && chars[j + 1] == '*'
            && chars.get(j + 2) != Some(&'*')
            && has_text(&chars[from..j])
        {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// Closing `*` that is not part of a `**` pair.
fn find_single_star(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len()).find(|&j| {
        chars[j] == '*'
            && chars.get(j + 1) != Some(&'*')
            && (j == 0 || chars[j - 1] != '*')
            && has_text(&chars[from..j])
    })
}

/// Closing `_` followed by a non-word character or the end of the text.
fn find_underscore(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len()).find(|&j| {
        chars[j] == '_'
            && chars.get(j + 1).is_none_or(|c| !c.is_alphanumeric())
            && has_text(&chars[from..j])
    })
}

fn merge_runs(runs: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.bold == run.bold && last.italic == run.italic => {
                last.text.push_str(&run.text)
            }
            _ => merged.push(run),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(t: &str) -> Inline {
        Inline::plain(t)
    }

    fn bold(t: &str) -> Inline {
        Inline::styled(t, true, false)
    }

    fn italic(t: &str) -> Inline {
        Inline::styled(t, false, true)
    }

    #[test]
    fn plain_text_is_one_run() {
        assert_eq!(parse_inline("just words"), vec![plain("just words")]);
    }

    #[test]
    fn empty_text_has_no_runs() {
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn bold_and_italic_spans() {
        assert_eq!(
            parse_inline("a **b** c *d* e _f_"),
            vec![plain("a "), bold("b"), plain(" c "), italic("d"), plain(" e "), italic("f")]
        );
    }

    #[test]
    fn nested_italic_inside_bold() {
        assert_eq!(
            parse_inline("**x *y* z**"),
            vec![bold("x "), Inline::styled("y", true, true), bold(" z")]
        );
    }

    #[test]
    fn triple_star_is_bold_italic() {
        assert_eq!(parse_inline("***x***"), vec![Inline::styled("x", true, true)]);
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("**open"), vec![plain("**open")]);
        assert_eq!(parse_inline("5 * 3"), vec![plain("5 * 3")]);
        assert_eq!(parse_inline("a ** ** b"), vec![plain("a ** ** b")]);
    }

    #[test]
    fn underscores_inside_words_are_literal() {
        assert_eq!(parse_inline("snake_case_name"), vec![plain("snake_case_name")]);
    }

    #[test]
    fn label_style_bold_prefix() {
        assert_eq!(
            parse_inline("**Client:** Acme Pty Ltd"),
            vec![bold("Client:"), plain(" Acme Pty Ltd")]
        );
    }

    #[test]
    fn never_emits_empty_runs() {
        for text in ["****", "**a**", "*", "__", "_a_b", "**a****b**"] {
            assert!(
                parse_inline(text).iter().all(|r| !r.text.is_empty()),
                "empty run for {text:?}"
            );
        }
    }
}
