//! Qualifying the class part of inline `{@link ...}` tags.

use std::sync::LazyLock;

use regex::Regex;

static RE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{@link\s").unwrap());

/// Rewrite every `{@link Name#member}` in `text` so that `Name` is the
/// qualified name returned by `resolve`. Names that do not resolve are kept
/// (trimmed); member references are kept; a link with no closing brace is
/// left as is.
pub fn replace_link_tags(text: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    for m in RE_LINK.find_iter(text) {
        if m.start() < start {
            continue;
        }
        let name_start = m.end();
        out.push_str(&text[start..name_start]);
        let Some(rel) = text[name_start..].find('}') else {
            start = name_start;
            continue;
        };
        let end = name_start + rel;
        let link = &text[name_start..end];
        let (name, member) = match link.find('#') {
            Some(hash) => (&link[..hash], Some(&link[hash..])),
            None => (link, None),
        };
        let name = name.trim();
        if !name.is_empty() {
            match resolve(name) {
                Some(qualified) => out.push_str(&qualified.replace('$', ".")),
                None => out.push_str(name),
            }
        }
        if let Some(member) = member {
            out.push_str(member.trim());
        }
        start = end;
    }
    out.push_str(&text[start..]);
    out
}
