//! Per-file driver: walk the declarations of one file, build a new comment
//! for each one in scope, and splice the results into the text.

use crate::assemble::{apply_edits, assemble_like, Edit};
use crate::config::{FixConfig, IndentStyle};
use crate::defaults::default_field_body;
use crate::doc::{description_lines, plain_description};
use crate::error::{FixError, Issue};
use crate::inherit::{collapse_inherited, is_inherited, shorthand};
use crate::model::{DeclKind, Declaration};
use crate::oracle::Oracles;
use crate::reconcile::{Existing, Reconciler, SinceLedger};
use crate::region::{
    collapse_whitespace, detect_indentation, extract_comment_body, extract_preceding_comment, locate_comment,
    CommentRegion,
};
use crate::tags::parse_tag_set;

/// Result of fixing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub text: String,
    pub changed: bool,
    pub issues: Vec<Issue>,
    /// Display names of the declarations whose comment was rewritten.
    pub fixed: Vec<String>,
}

/// Fix the Javadoc of every in-scope declaration of one file.
///
/// `declarations` must describe `source` as it is now. The text comes back
/// unchanged, byte for byte, when nothing needed fixing. Line endings of
/// the input (`\n` or `\r\n`) are kept.
pub fn process_declarations_in_file(
    source: &str,
    declarations: &[Declaration],
    config: &FixConfig,
    oracles: &Oracles,
) -> Result<FileOutcome, FixError> {
    let eol = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let lines: Vec<&str> = source.lines().collect();
    let since = SinceLedger::build(declarations, config, oracles.api_diff);
    let reconciler = Reconciler {
        config,
        oracles: *oracles,
        declarations,
        since: &since,
    };

    let mut ordered: Vec<&Declaration> = declarations.iter().collect();
    ordered.sort_by_key(|d| d.line);

    let mut issues = Vec::new();
    let mut edits = Vec::new();
    let mut fixed = Vec::new();
    for decl in ordered {
        let Some(edit) = fix_declaration(decl, &lines, &reconciler, &mut issues)? else {
            continue;
        };
        if edit.changes(&lines) {
            tracing::debug!("fixing {}", decl.display_name());
            fixed.push(decl.display_name());
            edits.push(edit);
        }
    }

    if edits.is_empty() {
        return Ok(FileOutcome {
            text: source.to_string(),
            changed: false,
            issues,
            fixed,
        });
    }
    let text = apply_edits(&lines, &edits, eol, source.ends_with('\n'))?;
    Ok(FileOutcome {
        changed: text != source,
        text,
        issues,
        fixed,
    })
}

/// Number of enclosing types of `decl` that are among `declarations`.
fn nesting_depth(decl: &Declaration, declarations: &[Declaration]) -> usize {
    let mut depth = 0;
    let mut owner = decl.owner.as_deref();
    while let Some(name) = owner {
        depth += 1;
        owner = declarations
            .iter()
            .find(|d| matches!(d.kind, DeclKind::Type(_)) && d.qualified_name == name)
            .and_then(|d| d.owner.as_deref());
    }
    depth
}

fn in_scope(decl: &Declaration, config: &FixConfig) -> bool {
    match &decl.kind {
        DeclKind::Type(_) => config.fix_class_comment && config.in_level(&decl.modifiers),
        DeclKind::Field(f) => {
            config.fix_field_comment
                && (f.in_interface || (config.in_level(&decl.modifiers) && decl.modifiers.is_static))
        }
        DeclKind::Method(m) => config.fix_method_comment && (m.in_interface || config.in_level(&decl.modifiers)),
    }
}

/// The edit for one declaration, or `None` when it is out of scope or its
/// comment must be left alone.
fn fix_declaration(
    decl: &Declaration,
    lines: &[&str],
    r: &Reconciler,
    issues: &mut Vec<Issue>,
) -> Result<Option<Edit>, FixError> {
    if decl.line == 0 || decl.line > lines.len() {
        return Err(FixError::LineOutOfRange {
            line: decl.line,
            declaration: decl.display_name(),
            total: lines.len(),
        });
    }
    if !in_scope(decl, r.config) {
        return Ok(None);
    }

    let indent = match &r.config.indent {
        IndentStyle::Detect => detect_indentation(lines[decl.line - 1]).to_string(),
        IndentStyle::Unit(unit) => unit.repeat(nesting_depth(decl, r.declarations)),
    };
    let region = existing_region(decl, lines)?;
    let content = region.as_ref().map(|reg| extract_comment_body(&reg.raw));

    let comment = match &decl.kind {
        DeclKind::Field(f) => {
            if region.is_some() {
                return Ok(None);
            }
            vec![format!("{}/** {} */", indent, default_field_body(decl, f))]
        }
        DeclKind::Type(_) => {
            let existing = match content.as_deref() {
                Some(c) => match parse_existing(decl, c, issues) {
                    Some(e) => Some(e),
                    None => return Ok(None),
                },
                None => None,
            };
            let draft = r.type_comment(decl, &indent, existing.as_ref());
            assemble_like(&indent, &draft, region.as_ref())
        }
        DeclKind::Method(m) => {
            let inherited = is_inherited(decl, m, r.oracles.types, r.config.inherit_match);
            let existing = match content.as_deref() {
                Some(c) => match parse_existing(decl, c, issues) {
                    Some(e) => Some(e),
                    None => return Ok(None),
                },
                None => None,
            };
            match (inherited, existing) {
                (true, None) => shorthand(&indent),
                (true, Some(e)) => collapse_inherited(&indent, &description_lines(e.content), &e.tags),
                (false, existing) => {
                    let draft = r.method_comment(decl, m, &indent, existing.as_ref(), issues);
                    assemble_like(&indent, &draft, region.as_ref())
                }
            }
        }
    };

    Ok(Some(match &region {
        // Text after `*/` only moves when the block itself changes.
        Some(region) if region.remainder.is_some() && region.holds(&comment) => return Ok(None),
        Some(region) => Edit::replace(region, &indent, comment),
        None => Edit::insert(decl.line, comment),
    }))
}

/// Locate the comment the front end reported and check that it is the
/// block directly above the declaration.
fn existing_region(decl: &Declaration, lines: &[&str]) -> Result<Option<CommentRegion>, FixError> {
    let Some(comment) = &decl.comment else {
        return Ok(None);
    };
    let region = locate_comment(lines, decl.line).ok_or_else(|| FixError::CommentNotFound {
        line: decl.line,
        declaration: decl.display_name(),
    })?;
    let found = plain_description(&extract_comment_body(&extract_preceding_comment(lines, decl.line)));
    if collapse_whitespace(&found) != collapse_whitespace(comment) {
        return Err(FixError::CommentMismatch {
            line: decl.line,
            declaration: decl.display_name(),
        });
    }
    Ok(Some(region))
}

/// Parse the existing tags; `None` when some tag text could not be found,
/// in which case the comment is kept as is.
fn parse_existing<'c>(decl: &Declaration, content: &'c str, issues: &mut Vec<Issue>) -> Option<Existing<'c>> {
    let tags = parse_tag_set(decl, content, issues);
    if !tags.unmatched.is_empty() {
        tracing::warn!("{}: comment left unchanged", decl.display_name());
        return None;
    }
    Some(Existing { content, tags })
}
