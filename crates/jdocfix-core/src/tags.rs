//! Tag parsing: pair each block tag reported for a declaration with its
//! verbatim text in the comment, keyed for reconciliation.

use crate::doc::split_tag_line;
use crate::error::Issue;
use crate::model::{Declaration, Tag};
use crate::region::remove_last_empty_lines;

pub const PARAM: &str = "param";
pub const RETURN: &str = "return";
pub const THROWS: &str = "throws";
pub const AUTHOR: &str = "author";
pub const VERSION: &str = "version";
pub const SINCE: &str = "since";

/// What an existing tag is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSlot {
    Param(String),
    Return,
    Throws(String),
    /// Any tag the engine does not reconcile; emitted verbatim.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub slot: TagSlot,
    pub name: String,
    pub params: Vec<String>,
    /// Verbatim comment lines of the tag, trailing blank lines removed.
    pub text: String,
}

/// Existing tags of one declaration, in comment order.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    /// Every tag name reported, duplicates included.
    pub names: Vec<String>,
    pub entries: Vec<TagEntry>,
    /// Reported tags whose text could not be located in the comment.
    pub unmatched: Vec<String>,
}

impl TagSet {
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(&e.slot, TagSlot::Param(k) if k == key))
    }

    pub fn has_return(&self) -> bool {
        self.entries.iter().any(|e| e.slot == TagSlot::Return)
    }

    fn has_throws(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(&e.slot, TagSlot::Throws(k) if k == key))
    }
}

/// Collapse a split generic type parameter (`<`, `T`, `>`) into `<T>`.
pub fn fix_generic_params(params: &[String]) -> Vec<String> {
    if params.len() >= 3 && params[0].trim() == "<" && params[2].trim() == ">" {
        let mut out = vec![format!("<{}>", params[1].trim())];
        out.extend(params[3..].iter().cloned());
        out
    } else {
        params.to_vec()
    }
}

struct Block {
    name: String,
    first: Option<String>,
    lines: Vec<String>,
    claimed: bool,
}

/// Segment comment content into tag blocks, each starting at a tag line.
fn blocks(content: &str) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::new();
    for line in content.lines() {
        if let Some((name, rest)) = split_tag_line(line) {
            let tokens: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            out.push(Block {
                name: name.to_string(),
                first: fix_generic_params(&tokens).into_iter().next(),
                lines: vec![line.trim_end().to_string()],
                claimed: false,
            });
        } else if let Some(block) = out.last_mut() {
            block.lines.push(line.trim_end().to_string());
        }
    }
    out
}

/// Build the tag set of `decl` from its reported tags and the comment
/// `content` (text between the delimiters). Tags whose text cannot be
/// found, duplicates, and keyless param/throws tags are reported in
/// `issues` and skipped; unfound ones are also listed in `unmatched`.
pub fn parse_tag_set(decl: &Declaration, content: &str, issues: &mut Vec<Issue>) -> TagSet {
    let is_method = decl.method().is_some();
    let mut blocks = blocks(content);
    let mut set = TagSet::default();
    let where_ = decl.display_name();

    for tag in &decl.tags {
        set.names.push(tag.name.clone());
        let params = fix_generic_params(&tag.params);

        let Some(block) = blocks.iter_mut().find(|b| {
            !b.claimed
                && b.name == tag.name
                && match (&b.first, params.first()) {
                    (Some(found), Some(wanted)) => found == wanted,
                    _ => true,
                }
        }) else {
            tracing::warn!("{}: text of @{} not found in comment", where_, tag.name);
            issues.push(Issue::new(decl.line, &where_, Some(&tag.name), "tag text not found in comment"));
            set.unmatched.push(tag.name.clone());
            continue;
        };
        block.claimed = true;
        let text = remove_last_empty_lines(&block.lines.join("\n"));

        let slot = if !is_method {
            TagSlot::Other
        } else {
            match (tag.name.as_str(), params.first()) {
                (PARAM, Some(key)) if set.has_param(key) => {
                    duplicate(decl, &where_, tag, key, issues);
                    continue;
                }
                (PARAM, Some(key)) => TagSlot::Param(key.clone()),
                (THROWS, Some(key)) if set.has_throws(key) => {
                    duplicate(decl, &where_, tag, key, issues);
                    continue;
                }
                (THROWS, Some(key)) => TagSlot::Throws(key.clone()),
                (PARAM | THROWS, None) => {
                    tracing::warn!("{}: dropping @{} without a name", where_, tag.name);
                    issues.push(Issue::new(decl.line, &where_, Some(&tag.name), "tag without a name dropped"));
                    continue;
                }
                (RETURN, _) if set.has_return() => {
                    duplicate(decl, &where_, tag, "", issues);
                    continue;
                }
                (RETURN, _) => TagSlot::Return,
                _ => TagSlot::Other,
            }
        };

        set.entries.push(TagEntry {
            slot,
            name: tag.name.clone(),
            params,
            text,
        });
    }
    set
}

fn duplicate(decl: &Declaration, where_: &str, tag: &Tag, key: &str, issues: &mut Vec<Issue>) {
    tracing::warn!("{}: duplicate @{} {} ignored", where_, tag.name, key);
    let message = if key.is_empty() {
        "duplicate tag ignored".to_string()
    } else {
        format!("duplicate tag for '{}' ignored", key)
    };
    issues.push(Issue::new(decl.line, where_, Some(&tag.name), message));
}
