//! Tag reconciliation: decide the description and block tags of a type or
//! method comment from what the comment already says and what the
//! signature requires.
//!
//! A declaration starts in one of three states: no comment, a comment
//! without tags, or a comment with tags. The first two get the full default
//! tag set; the last keeps its tags in their original order, fixes each
//! one, then appends whatever is missing.

use std::collections::HashSet;

use crate::config::{FixConfig, TagKind};
use crate::defaults::{default_body_for, default_value_for};
use crate::doc::{description_lines, plain_description};
use crate::error::Issue;
use crate::links::replace_link_tags;
use crate::model::{DeclKind, Declaration, MethodDecl, TypeRef};
use crate::oracle::{is_throwable, is_unchecked, ApiDiff, MethodSignature, Oracles};
use crate::region::{align_lines, collapse_whitespace, remove_last_empty_lines};
use crate::tags::{TagEntry, TagSet, TagSlot, AUTHOR, PARAM, RETURN, SINCE, THROWS, VERSION};

/// Where a declaration's reconciliation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentState {
    NoComment,
    NoTags,
    WithTags,
}

/// An existing comment: its content between the delimiters plus the
/// parsed tag set.
pub struct Existing<'c> {
    pub content: &'c str,
    pub tags: TagSet,
}

impl Existing<'_> {
    pub fn state(existing: Option<&Existing>) -> CommentState {
        match existing {
            None => CommentState::NoComment,
            Some(e) if e.tags.names.is_empty() => CommentState::NoTags,
            Some(_) => CommentState::WithTags,
        }
    }
}

/// Description and tag lines of a comment, fully indented, without the
/// delimiters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub body: Vec<String>,
    pub tags: Vec<String>,
}

/// Types whose `@since` also covers their members: those that already
/// carry one and those about to be stamped in this run.
#[derive(Debug, Clone, Default)]
pub struct SinceLedger {
    covered: HashSet<String>,
}

impl SinceLedger {
    pub fn build(declarations: &[Declaration], config: &FixConfig, api_diff: Option<&dyn ApiDiff>) -> Self {
        let mut covered = HashSet::new();
        for decl in declarations {
            if !matches!(decl.kind, DeclKind::Type(_)) {
                continue;
            }
            let stamped = config.fix_class_comment
                && config.in_level(&decl.modifiers)
                && config.fixes(TagKind::Since)
                && api_diff.map_or(true, |d| d.is_new_type(&decl.qualified_name));
            if decl.has_tag(SINCE) || stamped {
                covered.insert(decl.qualified_name.clone());
            }
        }
        SinceLedger { covered }
    }

    pub fn covers(&self, type_name: &str) -> bool {
        self.covered.contains(type_name)
    }
}

pub struct Reconciler<'a> {
    pub config: &'a FixConfig,
    pub oracles: Oracles<'a>,
    /// Every declaration of the file being fixed.
    pub declarations: &'a [Declaration],
    pub since: &'a SinceLedger,
}

impl Reconciler<'_> {
    pub fn type_comment(&self, decl: &Declaration, indent: &str, existing: Option<&Existing>) -> Draft {
        let body = self.body(decl, indent, existing);
        let empty = TagSet::default();
        let set = match Existing::state(existing) {
            CommentState::WithTags => existing.map_or(&empty, |e| &e.tags),
            _ => &empty,
        };

        let mut tags = Vec::new();
        for entry in &set.entries {
            tags.extend(self.verbatim(decl, &entry.text, indent));
        }
        if self.config.fixes(TagKind::Author) && !set.has_name(AUTHOR) {
            tags.push(tag_line(indent, AUTHOR, &self.config.default_author));
        }
        if self.config.fixes(TagKind::Version) && !set.has_name(VERSION) {
            tags.push(tag_line(indent, VERSION, &self.config.default_version));
        }
        if self.config.fixes(TagKind::Since) && !set.has_name(SINCE) && self.type_is_new(decl) {
            tags.push(tag_line(indent, SINCE, &self.config.default_since));
        }
        Draft { body, tags }
    }

    pub fn method_comment(
        &self,
        decl: &Declaration,
        m: &MethodDecl,
        indent: &str,
        existing: Option<&Existing>,
        issues: &mut Vec<Issue>,
    ) -> Draft {
        let body = self.body(decl, indent, existing);
        let empty = TagSet::default();
        let set = match Existing::state(existing) {
            CommentState::WithTags => existing.map_or(&empty, |e| &e.tags),
            _ => &empty,
        };

        let mut tags = Vec::new();
        let mut throws_covered: HashSet<String> = HashSet::new();
        for entry in &set.entries {
            match &entry.slot {
                TagSlot::Param(key) => self.param_tag(decl, m, entry, key, indent, issues, &mut tags),
                TagSlot::Return => self.return_tag(decl, m, entry, indent, issues, &mut tags),
                TagSlot::Throws(key) => {
                    throws_covered.insert(key.clone());
                    self.throws_tag(decl, m, entry, key, indent, issues, &mut throws_covered, &mut tags)
                }
                TagSlot::Other => tags.extend(self.verbatim(decl, &entry.text, indent)),
            }
        }
        self.missing_method_tags(decl, m, set, &throws_covered, indent, &mut tags);
        Draft { body, tags }
    }

    fn missing_method_tags(
        &self,
        decl: &Declaration,
        m: &MethodDecl,
        set: &TagSet,
        throws_covered: &HashSet<String>,
        indent: &str,
        out: &mut Vec<String>,
    ) {
        let types = self.oracles.types;
        if self.config.fixes(TagKind::Param) {
            for p in &m.params {
                if !set.has_param(&p.name) {
                    let value = format!("{} {}", p.name, default_value_for(&p.ty, types));
                    out.push(tag_line(indent, PARAM, &value));
                }
            }
            for t in &m.type_params {
                let key = format!("<{}>", t);
                if !set.has_param(&key) {
                    let value = format!("{} {}", key, default_value_for(&TypeRef::type_variable(t), types));
                    out.push(tag_line(indent, PARAM, &value));
                }
            }
        }
        if self.config.fixes(TagKind::Return) && !set.has_return() {
            if let Some(rt) = &m.return_type {
                out.push(tag_line(indent, RETURN, &default_value_for(rt, types)));
            }
        }
        if self.config.fixes(TagKind::Throws) {
            for e in &m.exceptions {
                if !throws_covered.contains(&e.name) {
                    let value = format!("{} if any.", e.name.replace('$', "."));
                    out.push(tag_line(indent, THROWS, &value));
                }
            }
        }
        if self.config.fixes(TagKind::Since) && !set.has_name(SINCE) && self.method_is_new(decl) {
            out.push(tag_line(indent, SINCE, &self.config.default_since));
        }
    }

    // -- Per-tag fixing ------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn param_tag(
        &self,
        decl: &Declaration,
        m: &MethodDecl,
        entry: &TagEntry,
        key: &str,
        indent: &str,
        issues: &mut Vec<Issue>,
        out: &mut Vec<String>,
    ) {
        let mut lines = self.verbatim(decl, &entry.text, indent);
        if !self.config.fixes(TagKind::Param) {
            out.extend(lines);
            return;
        }
        let ty = if let Some(p) = m.param(key) {
            p.ty.clone()
        } else if m.has_type_param_key(key) {
            TypeRef::type_variable(key.trim_start_matches('<').trim_end_matches('>'))
        } else {
            let where_ = decl.display_name();
            tracing::warn!("{}: Fixed unknown param '{}'", where_, key);
            issues.push(Issue::new(
                decl.line,
                &where_,
                Some(PARAM),
                format!("Fixed unknown param '{}'", key),
            ));
            return;
        };
        if ends_with_stub(&lines, &format!("@{} {}", PARAM, key)) {
            append_to_last(&mut lines, &default_value_for(&ty, self.oracles.types));
        }
        out.extend(lines);
    }

    fn return_tag(
        &self,
        decl: &Declaration,
        m: &MethodDecl,
        entry: &TagEntry,
        indent: &str,
        issues: &mut Vec<Issue>,
        out: &mut Vec<String>,
    ) {
        let mut lines = self.verbatim(decl, &entry.text, indent);
        if !self.config.fixes(TagKind::Return) {
            out.extend(lines);
            return;
        }
        let Some(rt) = &m.return_type else {
            let where_ = decl.display_name();
            tracing::debug!("{}: removing @return of a method without a result", where_);
            issues.push(Issue::new(
                decl.line,
                &where_,
                Some(RETURN),
                "@return removed from a method without a result",
            ));
            return;
        };
        if ends_with_stub(&lines, &format!("@{}", RETURN)) {
            append_to_last(&mut lines, &default_value_for(rt, self.oracles.types));
        }
        out.extend(lines);
    }

    #[allow(clippy::too_many_arguments)]
    fn throws_tag(
        &self,
        decl: &Declaration,
        m: &MethodDecl,
        entry: &TagEntry,
        key: &str,
        indent: &str,
        issues: &mut Vec<Issue>,
        covered: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        let mut lines = self.verbatim(decl, &entry.text, indent);
        if !self.config.fixes(TagKind::Throws) {
            out.extend(lines);
            return;
        }

        let suffix = format!(".{}", key);
        if let Some(e) = m.exceptions.iter().find(|e| e.name == key || e.name.ends_with(&suffix)) {
            let qualified = e.name.replace('$', ".");
            replace_tag_param(&mut lines, THROWS, key, &qualified);
            if ends_with_stub(&lines, &format!("@{} {}", THROWS, qualified)) {
                append_to_last(&mut lines, "if any.");
            }
            covered.insert(e.name.clone());
            out.extend(lines);
            return;
        }

        let where_ = decl.display_name();
        let types = self.oracles.types;
        let context = decl.owner.as_deref().unwrap_or(&decl.qualified_name);
        let resolved = types.qualify(context, key).and_then(|q| types.resolve_class(&q));
        match resolved {
            Some(class) if is_unchecked(types, class) => {
                let qualified = class.name.replace('$', ".");
                replace_tag_param(&mut lines, THROWS, key, &qualified);
                covered.insert(class.name.clone());
                out.extend(lines);
            }
            Some(class) if is_throwable(types, class) => {
                tracing::debug!("{}: removing undeclared checked exception '{}'", where_, class.name);
                issues.push(Issue::new(
                    decl.line,
                    &where_,
                    Some(THROWS),
                    format!("removed undeclared checked exception '{}'", class.name),
                ));
            }
            Some(class) => {
                tracing::debug!("{}: removing '{}', not a Throwable", where_, class.name);
                issues.push(Issue::new(
                    decl.line,
                    &where_,
                    Some(THROWS),
                    format!("removed '{}', not a Throwable", class.name),
                ));
            }
            None if self.config.remove_unknown_throws => {
                tracing::warn!("{}: Removing unknown throws '{}'", where_, key);
                issues.push(Issue::new(
                    decl.line,
                    &where_,
                    Some(THROWS),
                    format!("removed unknown throws '{}'", key),
                ));
            }
            None => {
                tracing::warn!("{}: Unknown throws exception '{}'", where_, key);
                issues.push(Issue::new(
                    decl.line,
                    &where_,
                    Some(THROWS),
                    format!("unknown throws exception '{}' kept", key),
                ));
                if entry.params.len() == 1 {
                    append_to_last(&mut lines, "if any.");
                }
                out.extend(lines);
            }
        }
    }

    // -- Shared pieces -------------------------------------------------------

    fn body(&self, decl: &Declaration, indent: &str, existing: Option<&Existing>) -> Vec<String> {
        if let Some(e) = existing {
            if !plain_description(e.content).is_empty() {
                let description = remove_last_empty_lines(&description_lines(e.content));
                return align_lines(&self.link(decl, &description), indent);
            }
        }
        vec![format!("{} * {}", indent, default_body_for(decl, self.declarations))]
    }

    /// Existing tag text re-indented, with links qualified.
    fn verbatim(&self, decl: &Declaration, text: &str, indent: &str) -> Vec<String> {
        align_lines(&self.link(decl, text), indent)
    }

    fn link(&self, decl: &Declaration, text: &str) -> String {
        if !self.config.fixes(TagKind::Link) {
            return text.to_string();
        }
        let context = match decl.kind {
            DeclKind::Type(_) => decl.qualified_name.as_str(),
            _ => decl.owner.as_deref().unwrap_or(&decl.qualified_name),
        };
        replace_link_tags(text, |name| self.oracles.types.qualify(context, name))
    }

    fn type_is_new(&self, decl: &Declaration) -> bool {
        match self.oracles.api_diff {
            Some(diff) => diff.is_new_type(&decl.qualified_name),
            None => true,
        }
    }

    fn method_is_new(&self, decl: &Declaration) -> bool {
        match self.oracles.api_diff {
            Some(diff) => MethodSignature::of(decl).is_some_and(|sig| diff.is_new_method(&sig)),
            None => decl.owner.as_deref().is_some_and(|o| !self.since.covers(o)),
        }
    }
}

/// `indent * @name value`, no trailing blank for an empty value.
pub fn tag_line(indent: &str, name: &str, value: &str) -> String {
    format!("{} * @{} {}", indent, name, value).trim_end().to_string()
}

fn ends_with_stub(lines: &[String], stub: &str) -> bool {
    collapse_whitespace(&lines.join(" ")).ends_with(stub)
}

fn append_to_last(lines: &mut [String], value: &str) {
    if let Some(last) = lines.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
        last.push(' ');
        last.push_str(value);
    }
}

/// Replace the first parameter token after `@tag` with `new`.
fn replace_tag_param(lines: &mut [String], tag: &str, old: &str, new: &str) {
    if old == new {
        return;
    }
    let marker = format!("@{}", tag);
    for line in lines.iter_mut() {
        let Some(at) = line.find(&marker) else {
            continue;
        };
        let after = at + marker.len();
        if let Some(rel) = line[after..].find(old) {
            let pos = after + rel;
            line.replace_range(pos..pos + old.len(), new);
        }
        return;
    }
}
