//! Default content for declarations that lack a description or a tag value.

use crate::model::{DeclKind, Declaration, FieldDecl, MethodDecl, TypeDecl, TypeRef};
use crate::oracle::TypeResolver;

/// Longest string constant shown in a default field comment.
const MAX_CONSTANT_LEN: usize = 40;

/// Default description for any declaration. `siblings` are the other
/// declarations of the file, used to recognize getters and setters.
pub fn default_body_for(decl: &Declaration, siblings: &[Declaration]) -> String {
    match &decl.kind {
        DeclKind::Type(t) => default_type_body(decl, t),
        DeclKind::Method(m) => default_method_body(decl, m, siblings),
        DeclKind::Field(f) => default_field_body(decl, f),
    }
}

pub fn default_type_body(decl: &Declaration, ty: &TypeDecl) -> String {
    let abstract_ = if decl.modifiers.is_abstract && !ty.is_interface() {
        "Abstract "
    } else {
        ""
    };
    let kind = if ty.is_interface() { "interface" } else { "class" };
    format!("<p>{}{} {}.</p>", abstract_, decl.name, kind)
}

pub fn default_method_body(decl: &Declaration, m: &MethodDecl, siblings: &[Declaration]) -> String {
    if m.is_constructor {
        return format!("<p>Constructor for {}.</p>", decl.name);
    }
    if let (Some(prefix), Some(rest)) = (decl.name.get(..3), decl.name.get(3..)) {
        let role = match prefix {
            _ if rest.is_empty() => None,
            "get" => Some("Getter"),
            "set" => Some("Setter"),
            _ => None,
        };
        if let Some(role) = role {
            let field = lowercase_first(rest);
            if has_field(siblings, decl.owner.as_deref(), &field) {
                return format!("<p>{} for the field <code>{}</code>.</p>", role, field);
            }
        }
    }
    format!("<p>{}.</p>", decl.name)
}

fn has_field(siblings: &[Declaration], owner: Option<&str>, name: &str) -> bool {
    siblings
        .iter()
        .any(|d| matches!(d.kind, DeclKind::Field(_)) && d.name == name && d.owner.as_deref() == owner)
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Constant <code>NAME=value</code>` where the value is shown for
/// primitive and string initializers.
pub fn default_field_body(decl: &Declaration, field: &FieldDecl) -> String {
    let mut body = format!("Constant <code>{}", decl.name);
    if let Some(init) = field.initializer.as_deref() {
        if field.ty.primitive && !field.ty.is_array() {
            body.push('=');
            body.push_str(&init.lines().map(str::trim).collect::<Vec<_>>().join(" "));
        } else if field.ty.name == "java.lang.String" && !field.ty.is_array() {
            body.push_str("=\"");
            body.push_str(&string_constant(init));
        }
    }
    body.push_str("</code>");
    body
}

/// Concatenate the literal pieces of a string initializer and cap its
/// length, closing the quote.
fn string_constant(init: &str) -> String {
    let mut value = String::new();
    let tokens = init.lines().flat_map(|line| line.trim().split('"')).filter(|t| !t.is_empty());
    for token in tokens {
        let trimmed = token.trim();
        if trimmed == "+" {
            continue;
        }
        value.push_str(token);
        if trimmed.ends_with('\\') {
            value.push('"');
        }
    }
    if value.chars().count() < MAX_CONSTANT_LEN {
        value.push('"');
        value
    } else {
        let mut cut: String = value.chars().take(MAX_CONSTANT_LEN - 1).collect();
        cut.push_str("\"{trunked}");
        cut
    }
}

/// Default text for a `@param` or `@return` value of type `ty`.
pub fn default_value_for(ty: &TypeRef, types: &dyn TypeResolver) -> String {
    if ty.primitive && !ty.type_variable {
        return if ty.is_array() {
            format!("an array of {}.", ty.name)
        } else {
            format!("a {}.", ty.name)
        };
    }
    let shown = if !ty.type_variable && types.resolve_class(&ty.name).is_some() {
        format!("{{@link {}}}", ty.name.replace('$', "."))
    } else {
        ty.name.clone()
    };
    if ty.is_array() {
        format!("an array of {} objects.", shown)
    } else {
        format!("a {} object.", shown)
    }
}
