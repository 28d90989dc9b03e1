//! Comment assembly and splicing of new comments into the file text.

use crate::error::FixError;
use crate::reconcile::Draft;
use crate::region::{strip_star, CommentRegion};

/// Full comment lines for `draft`: opener, description, one separator
/// before the tags when there are any, closer.
pub fn assemble(indent: &str, draft: &Draft) -> Vec<String> {
    let mut lines = vec![format!("{}/**", indent)];
    lines.extend(draft.body.iter().cloned());
    if !draft.tags.is_empty() {
        lines.push(format!("{} *", indent));
        lines.extend(draft.tags.iter().cloned());
    }
    while lines.len() > 1 && lines.last().is_some_and(|l| l.trim() == "*") {
        lines.pop();
    }
    lines.push(format!("{} */", indent));
    lines
}

/// Like [`assemble`], but a one-line original whose rewrite still has a
/// single description line and no tags stays on one line.
pub fn assemble_like(indent: &str, draft: &Draft, original: Option<&CommentRegion>) -> Vec<String> {
    let single = original.is_some_and(|r| r.is_single_line());
    if single && draft.tags.is_empty() && draft.body.len() == 1 {
        let text = strip_star(&draft.body[0]).trim();
        return vec![format!("{}/** {} */", indent, text)];
    }
    assemble(indent, draft)
}

/// Replace lines `start..end` (0-based, end exclusive) with `lines`. An
/// empty range is an insertion before `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub lines: Vec<String>,
}

impl Edit {
    /// Insert `comment` directly above the declaration at `decl_line` (1-based).
    pub fn insert(decl_line: usize, comment: Vec<String>) -> Self {
        Edit {
            start: decl_line - 1,
            end: decl_line - 1,
            lines: comment,
        }
    }

    /// Replace the comment in `region`. Text that followed `*/` on its line
    /// moves to a line of its own after the new comment.
    pub fn replace(region: &CommentRegion, indent: &str, mut comment: Vec<String>) -> Self {
        if let Some(rest) = &region.remainder {
            comment.push(format!("{}{}", indent, rest));
        }
        Edit {
            start: region.start,
            end: region.end + 1,
            lines: comment,
        }
    }

    /// Whether applying the edit would alter `lines`.
    pub fn changes(&self, lines: &[&str]) -> bool {
        let old = &lines[self.start..self.end];
        old.len() != self.lines.len() || old.iter().zip(&self.lines).any(|(a, b)| *a != b.as_str())
    }
}

/// Apply all edits in one pass, top to bottom, joining lines with `eol`.
pub fn apply_edits(lines: &[&str], edits: &[Edit], eol: &str, trailing_eol: bool) -> Result<String, FixError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.start, e.end));

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for edit in sorted {
        if edit.start < cursor || edit.end > lines.len() {
            return Err(FixError::OverlappingEdit {
                first: cursor,
                second: edit.start + 1,
            });
        }
        out.extend(&lines[cursor..edit.start]);
        out.extend(edit.lines.iter().map(String::as_str));
        cursor = edit.end;
    }
    out.extend(&lines[cursor..]);

    let mut text = out.join(eol);
    if trailing_eol {
        text.push_str(eol);
    }
    Ok(text)
}
