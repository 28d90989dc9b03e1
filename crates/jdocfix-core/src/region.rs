//! Text region extraction: locating a declaration's Javadoc block in the
//! file's lines and slicing it into its parts.

use std::sync::LazyLock;

use regex::Regex;

pub const START_JAVADOC: &str = "/**";
pub const END_JAVADOC: &str = "*/";

static RE_LEADING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*").unwrap());

/// Where a Javadoc block sits in a file, as 0-based line indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRegion {
    /// Line holding `/**`.
    pub start: usize,
    /// Line holding the closing `*/`.
    pub end: usize,
    /// The block from `/**` through `*/`, lines right-trimmed.
    pub raw: String,
    /// Non-blank text following `*/` on the end line.
    pub remainder: Option<String>,
}

impl CommentRegion {
    pub fn is_single_line(&self) -> bool {
        self.start == self.end
    }

    /// Whether `comment` reproduces this block line for line, trailing
    /// whitespace aside.
    pub fn holds(&self, comment: &[String]) -> bool {
        comment.iter().map(|l| l.trim_end()).eq(self.raw.lines())
    }
}

/// The raw Javadoc block directly above `decl_line` (1-based): every line
/// from the nearest line that starts with `/**` down to the line before
/// the declaration. Empty when no such line exists.
pub fn extract_preceding_comment(lines: &[&str], decl_line: usize) -> String {
    let Some(start) = find_start(lines, decl_line) else {
        return String::new();
    };
    lines[start..decl_line - 1]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Locate the block above `decl_line` (1-based) together with the line that
/// closes it.
pub fn locate_comment(lines: &[&str], decl_line: usize) -> Option<CommentRegion> {
    let start = find_start(lines, decl_line)?;
    let open = lines[start].find(START_JAVADOC)? + START_JAVADOC.len();
    for (idx, line) in lines.iter().enumerate().take(decl_line - 1).skip(start) {
        let from = if idx == start { open } else { 0 };
        let Some(pos) = line[from..].find(END_JAVADOC) else {
            continue;
        };
        let close = from + pos + END_JAVADOC.len();
        let mut block: Vec<&str> = lines[start..idx].iter().map(|l| l.trim_end()).collect();
        block.push(line[..close].trim_end());
        let rest = line[close..].trim();
        return Some(CommentRegion {
            start,
            end: idx,
            raw: block.join("\n"),
            remainder: (!rest.is_empty()).then(|| rest.to_string()),
        });
    }
    None
}

fn find_start(lines: &[&str], decl_line: usize) -> Option<usize> {
    if decl_line < 2 || decl_line - 1 > lines.len() {
        return None;
    }
    (0..decl_line - 1)
        .rev()
        .find(|&i| opens_javadoc(lines[i]))
}

/// `/**/` and `/*****` rulers open plain block comments.
fn opens_javadoc(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with(START_JAVADOC) && !t.starts_with("/**/") && !t.starts_with("/***")
}

/// Content between `/**` and the first following `*/`, with a single
/// leading line break dropped and trailing whitespace trimmed.
pub fn extract_comment_body(raw: &str) -> String {
    let Some(open) = raw.find(START_JAVADOC) else {
        return String::new();
    };
    let rest = &raw[open + START_JAVADOC.len()..];
    let inner = match rest.find(END_JAVADOC) {
        Some(close) => &rest[..close],
        None => rest,
    };
    let inner = inner
        .strip_prefix("\r\n")
        .or_else(|| inner.strip_prefix('\n'))
        .unwrap_or(inner);
    inner.trim_end().to_string()
}

/// Leading whitespace of `line`.
pub fn detect_indentation(line: &str) -> &str {
    RE_LEADING_WS.find(line).map(|m| m.as_str()).unwrap_or("")
}

/// Drop trailing lines that are empty or hold only a `*`.
pub fn remove_last_empty_lines(content: &str) -> String {
    let mut lines: Vec<&str> = content.lines().collect();
    while let Some(last) = lines.last() {
        let t = last.trim();
        if t.is_empty() || t == "*" {
            lines.pop();
        } else {
            break;
        }
    }
    lines.join("\n")
}

/// Re-indent comment lines: a missing leading `*` is added and each line
/// becomes `indent + " " + line`, whitespace after the `*` kept.
pub fn align_lines(content: &str, indent: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            let t = line.trim();
            let starred = if t.starts_with('*') {
                t.to_string()
            } else if t.is_empty() {
                "*".to_string()
            } else {
                format!("* {}", t)
            };
            format!("{} {}", indent, starred.trim_end())
        })
        .collect()
}

/// Strip one comment-line decoration: leading whitespace then one `*`
/// unless it starts `*/`.
pub fn strip_star(line: &str) -> &str {
    let t = line.trim_start();
    match t.strip_prefix('*') {
        Some(rest) if !rest.starts_with('/') => rest,
        _ => t,
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<&str> {
        src.lines().collect()
    }

    #[test]
    fn preceding_comment_multiline() {
        let src = "class A {\n    /**\n     * Does it.   \n     */\n    void m() {}\n}";
        let l = lines(src);
        assert_eq!(
            extract_preceding_comment(&l, 5),
            "    /**\n     * Does it.\n     */"
        );
    }

    #[test]
    fn preceding_comment_missing() {
        let l = lines("class A {\n    void m() {}\n}");
        assert_eq!(extract_preceding_comment(&l, 2), "");
        assert_eq!(extract_preceding_comment(&l, 1), "");
    }

    #[test]
    fn locate_with_annotation_between() {
        let src = "/**\n * Doc.\n */\n@Deprecated\npublic class A {}";
        let l = lines(src);
        let region = locate_comment(&l, 4).unwrap();
        assert_eq!(region.start, 0);
        assert_eq!(region.end, 2);
        assert_eq!(region.remainder, None);
    }

    #[test]
    fn locate_single_line_with_remainder() {
        let l = lines("  /** Doc. */ // trailing\n  int x;");
        let region = locate_comment(&l, 2).unwrap();
        assert!(region.is_single_line());
        assert_eq!(region.raw, "  /** Doc. */");
        assert_eq!(region.remainder.as_deref(), Some("// trailing"));
    }

    #[test]
    fn rulers_are_not_javadoc() {
        let l = lines("/** Doc. */\n/*******/\n/**/\nint x;");
        let region = locate_comment(&l, 4).unwrap();
        assert_eq!(region.start, 0);
        assert_eq!(region.raw, "/** Doc. */");
    }

    #[test]
    fn holds_compares_block_lines() {
        let l = lines("  /**\n   * Doc.  \n   */ // note\n  int x;");
        let region = locate_comment(&l, 4).unwrap();
        assert!(region.holds(&["  /**".into(), "   * Doc.".into(), "   */".into()]));
        assert!(!region.holds(&["  /** Doc. */".into()]));
    }

    #[test]
    fn locate_unclosed_block() {
        let l = lines("/** never closed\n int x;");
        assert_eq!(locate_comment(&l, 2), None);
    }

    #[test]
    fn comment_body_strips_delimiters() {
        assert_eq!(
            extract_comment_body("    /**\n     * Does it.\n     */"),
            "     * Does it."
        );
        assert_eq!(extract_comment_body("/** Short. */"), " Short.");
        assert_eq!(extract_comment_body("/***/"), "");
    }

    #[test]
    fn indentation_detection() {
        assert_eq!(detect_indentation("    void m();"), "    ");
        assert_eq!(detect_indentation("\tint x;"), "\t");
        assert_eq!(detect_indentation("class A"), "");
    }

    #[test]
    fn trailing_empty_lines_removed() {
        assert_eq!(remove_last_empty_lines(" * Foo.\n *\n   *  \n"), " * Foo.");
        assert_eq!(remove_last_empty_lines(" *\n * Foo."), " *\n * Foo.");
    }

    #[test]
    fn alignment_adds_missing_stars() {
        let aligned = align_lines("   * First.\n     second\n\n*third", "  ");
        assert_eq!(
            aligned,
            vec!["   * First.", "   * second", "   *", "   *third"]
        );
    }

    #[test]
    fn strip_star_keeps_closer() {
        assert_eq!(strip_star("   * text"), " text");
        assert_eq!(strip_star("   */"), "*/");
        assert_eq!(strip_star("plain"), "plain");
    }
}
