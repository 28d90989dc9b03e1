//! Inherited-documentation handling for methods that override or implement
//! a supertype method.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::InheritMatch;
use crate::model::{Declaration, MethodDecl};
use crate::oracle::{all_interfaces, superclasses, ResolvedClass, TypeResolver};
use crate::region::{align_lines, collapse_whitespace, remove_last_empty_lines};
use crate::tags::{TagSet, TagSlot};

pub const INHERIT_DOC_TAG: &str = "{@inheritDoc}";
pub const INHERITED_JAVADOC: &str = "/** {@inheritDoc} */";

static RE_INHERITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(/\*\*)?(\s*(\*)?)*(\{)@inheritDoc\s*(\})(\s*(\*)?)*(\*/)?$").unwrap()
});

/// Whether `content` says nothing but `{@inheritDoc}`, decoration aside.
pub fn has_inherited_tag(content: &str) -> bool {
    RE_INHERITED.is_match(&collapse_whitespace(content))
}

/// Whether the method overrides or implements a supertype method. An
/// explicit `@Override` always counts. Otherwise every interface of the
/// owner is checked, then every superclass.
pub fn is_inherited(decl: &Declaration, m: &MethodDecl, types: &dyn TypeResolver, mode: InheritMatch) -> bool {
    if m.has_override {
        return true;
    }
    if m.is_constructor {
        return false;
    }
    let Some(class) = decl.owner.as_deref().and_then(|o| types.resolve_class(o)) else {
        return false;
    };
    let params: Vec<String> = m.params.iter().map(|p| p.ty.signature()).collect();
    all_interfaces(types, class)
        .into_iter()
        .chain(superclasses(types, class))
        .any(|c| declares(c, &decl.name, &params, mode))
}

fn declares(class: &ResolvedClass, name: &str, params: &[String], mode: InheritMatch) -> bool {
    match mode {
        InheritMatch::AllParameters => class
            .methods
            .iter()
            .any(|s| s.name == name && s.param_types == params),
        InheritMatch::LastParameterOnly => {
            match class
                .methods
                .iter()
                .find(|s| s.name == name && s.param_types.len() == params.len())
            {
                Some(s) => !params.is_empty() && s.param_types.last().map(String::as_str) == params.last().map(String::as_str),
                None => false,
            }
        }
    }
}

pub fn shorthand(indent: &str) -> Vec<String> {
    vec![format!("{}{}", indent, INHERITED_JAVADOC)]
}

/// Rewrite an existing comment of an inheriting method. The description is
/// kept behind a leading `{@inheritDoc}` (added when absent), tags other
/// than param/return/throws are kept, and whatever reduces to the bare
/// marker collapses to the one-line shorthand.
pub fn collapse_inherited(indent: &str, description: &str, tags: &TagSet) -> Vec<String> {
    let kept: Vec<&str> = tags
        .entries
        .iter()
        .filter(|e| e.slot == TagSlot::Other)
        .map(|e| e.text.as_str())
        .collect();
    if description.trim().is_empty() && kept.is_empty() {
        return shorthand(indent);
    }

    let separator = format!("{} *", indent);
    let mut lines = vec![format!("{}/**", indent)];
    if !description.contains(INHERIT_DOC_TAG) {
        lines.push(format!("{} * {}", indent, INHERIT_DOC_TAG));
        lines.push(separator.clone());
    }
    let body = remove_last_empty_lines(description);
    if !body.trim().is_empty() {
        lines.extend(align_lines(&body, indent));
        if !kept.is_empty() {
            lines.push(separator);
        }
    }
    for text in kept {
        lines.extend(align_lines(text, indent));
    }
    while lines.len() > 1 && lines.last().is_some_and(|l| l.trim() == "*") {
        lines.pop();
    }
    lines.push(format!("{} */", indent));

    if has_inherited_tag(&lines.join("\n")) {
        return shorthand(indent);
    }
    lines
}
