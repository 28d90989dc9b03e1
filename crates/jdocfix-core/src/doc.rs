//! Splitting a raw Javadoc block into its description and block tags.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Tag;
use crate::region::{extract_comment_body, strip_star};

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*?\s*@([A-Za-z][\w.-]*)(.*)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedJavadoc {
    /// Description text, decoration removed, lines joined with `\n`.
    pub body: String,
    pub tags: Vec<Tag>,
}

/// Whether a comment line opens a block tag (`* @name ...`, `*@name`, `@name`).
pub fn is_tag_line(line: &str) -> bool {
    RE_TAG_LINE.is_match(line)
}

/// Tag name and the remaining text on a tag line.
pub fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let caps = RE_TAG_LINE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2).map_or("", |m| m.as_str())))
}

/// The description part of comment content: every line before the first
/// tag line, right-trimmed as a whole.
pub fn description_lines(content: &str) -> String {
    content
        .lines()
        .take_while(|l| !is_tag_line(l))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Description with comment decoration removed, for comparison and display.
pub fn plain_description(content: &str) -> String {
    description_lines(content)
        .lines()
        .map(|l| strip_star(l).trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn parse_javadoc(raw: &str) -> ParsedJavadoc {
    let content = extract_comment_body(raw);
    let body = plain_description(&content);

    let mut tags: Vec<(String, String)> = Vec::new();
    for line in content.lines().skip_while(|l| !is_tag_line(l)) {
        if let Some((name, rest)) = split_tag_line(line) {
            tags.push((name.to_string(), rest.trim().to_string()));
        } else if let Some((_, value)) = tags.last_mut() {
            let more = strip_star(line).trim();
            if !more.is_empty() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(more);
            }
        }
    }

    ParsedJavadoc {
        body,
        tags: tags.iter().map(|(n, v)| Tag::new(n, v)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_line_forms() {
        assert!(is_tag_line("     * @param x the x"));
        assert!(is_tag_line("*@return"));
        assert!(is_tag_line("  @since 1.0"));
        assert!(!is_tag_line("     * an email@example.com"));
        assert!(!is_tag_line("     * {@link Foo}"));
        assert!(!is_tag_line("     * @ 1"));
    }

    #[test]
    fn parse_description_and_tags() {
        let raw = "    /**\n     * Adds things.\n     *\n     * @param a first\n     *        operand\n     * @return the sum\n     */";
        let doc = parse_javadoc(raw);
        assert_eq!(doc.body, "Adds things.");
        assert_eq!(
            doc.tags,
            vec![
                Tag::new("param", "a first operand"),
                Tag::new("return", "the sum"),
            ]
        );
    }

    #[test]
    fn parse_single_line() {
        let doc = parse_javadoc("/** Short one. */");
        assert_eq!(doc.body, "Short one.");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn parse_tags_only() {
        let doc = parse_javadoc("/**\n * @deprecated\n */");
        assert_eq!(doc.body, "");
        assert_eq!(doc.tags, vec![Tag::new("deprecated", "")]);
    }

    #[test]
    fn description_keeps_multiline_paragraphs() {
        let content = " * First.\n *\n * Second.\n * @since 2";
        assert_eq!(description_lines(content), " * First.\n *\n * Second.");
        assert_eq!(plain_description(content), "First.\n\nSecond.");
    }
}
