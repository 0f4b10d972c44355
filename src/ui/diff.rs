//! Line diffs for reviewing destination conflicts.
//!
//! Lines are prefixed with `+`, `-` or a space. Long runs of unchanged lines
//! are collapsed to [`CONTEXT_LINES`] lines on each side of a change and a
//! marker such as `@@ <...> (12 more lines) @@`.

use similar::{ChangeTag, TextDiff};

use super::theme::StencilTheme;

/// Unchanged lines kept around each change.
pub const CONTEXT_LINES: usize = 2;

/// Render a diff from `old` to `new` for the current terminal.
pub fn render_diff(old: &str, new: &str) -> String {
    render_diff_with_theme(old, new, &StencilTheme::detect())
}

/// Render a diff from `old` to `new` using `theme`.
pub fn render_diff_with_theme(old: &str, new: &str, theme: &StencilTheme) -> String {
    let diff = TextDiff::from_lines(old, new);

    // Group consecutive changes of the same kind into runs.
    let mut runs: Vec<(ChangeTag, Vec<String>)> = Vec::new();
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches(['\n', '\r']).to_string();
        match runs.last_mut() {
            Some((tag, lines)) if *tag == change.tag() => lines.push(line),
            _ => runs.push((change.tag(), vec![line])),
        }
    }

    let last = runs.len().saturating_sub(1);
    let mut output = Vec::new();
    for (idx, (tag, lines)) in runs.iter().enumerate() {
        if *tag == ChangeTag::Equal && lines.len() > CONTEXT_LINES * 2 + 1 {
            collapse_run(lines, idx == 0, idx == last, theme, &mut output);
        } else {
            output.extend(lines.iter().map(|line| render_line(*tag, line, theme)));
        }
    }

    output.join("\n")
}

fn collapse_run(
    lines: &[String],
    is_first: bool,
    is_last: bool,
    theme: &StencilTheme,
    output: &mut Vec<String>,
) {
    let mut hidden = lines.len();

    if !is_first {
        for line in &lines[..CONTEXT_LINES] {
            output.push(render_line(ChangeTag::Equal, line, theme));
        }
        hidden -= CONTEXT_LINES;
    }

    let marker_idx = output.len();
    output.push(String::new());

    if !is_last {
        for line in &lines[lines.len() - CONTEXT_LINES..] {
            output.push(render_line(ChangeTag::Equal, line, theme));
        }
        hidden -= CONTEXT_LINES;
    }

    output[marker_idx] = theme
        .hunk
        .apply_to(format!("@@ <...> ({hidden} more lines) @@"))
        .to_string();
}

fn render_line(tag: ChangeTag, text: &str, theme: &StencilTheme) -> String {
    match tag {
        ChangeTag::Insert => theme.added.apply_to(format!("+    {text}")).to_string(),
        ChangeTag::Delete => theme.removed.apply_to(format!("-    {text}")).to_string(),
        ChangeTag::Equal => format!("     {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(old: &str, new: &str) -> String {
        render_diff_with_theme(old, new, &StencilTheme::plain())
    }

    fn numbered(range: std::ops::Range<usize>) -> String {
        range.map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn identical_short_files_render_unchanged_lines() {
        assert_eq!(plain("a\nb\n", "a\nb\n"), "     a\n     b");
    }

    #[test]
    fn changed_line_is_marked() {
        let out = plain("a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(out, "     a\n-    b\n+    B\n     c");
    }

    #[test]
    fn long_leading_run_keeps_trailing_context() {
        let old = numbered(0..10) + "old\n";
        let new = numbered(0..10) + "new\n";
        let out = plain(&old, &new);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "@@ <...> (8 more lines) @@",
                "     line 8",
                "     line 9",
                "-    old",
                "+    new",
            ]
        );
    }

    #[test]
    fn long_middle_run_keeps_context_on_both_sides() {
        let old = format!("a\n{}b\n", numbered(0..10));
        let new = format!("A\n{}B\n", numbered(0..10));
        let out = plain(&old, &new);
        assert!(out.contains("     line 0\n     line 1\n@@ <...> (6 more lines) @@\n     line 8\n     line 9"));
        assert!(out.starts_with("-    a\n+    A"));
        assert!(out.ends_with("-    b\n+    B"));
    }

    #[test]
    fn long_trailing_run_keeps_leading_context() {
        let old = format!("x\n{}", numbered(0..6));
        let new = format!("y\n{}", numbered(0..6));
        let out = plain(&old, &new);
        assert!(out.ends_with("     line 0\n     line 1\n@@ <...> (4 more lines) @@"));
    }

    #[test]
    fn runs_at_threshold_are_not_collapsed() {
        let old = format!("x\n{}", numbered(0..5));
        let new = format!("y\n{}", numbered(0..5));
        assert!(!plain(&old, &new).contains("@@"));
    }

    #[test]
    fn missing_trailing_newline_is_handled() {
        let out = plain("a\nb", "a\nc");
        assert_eq!(out, "     a\n-    b\n+    c");
    }
}
