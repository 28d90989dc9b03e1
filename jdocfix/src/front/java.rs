//! Java front end built on tree-sitter-java.
//!
//! Produces the declarations of one compilation unit with their existing
//! Javadoc, plus the class shapes and import scope the type index needs.
//! Type names come out as written (generics erased); [`qualify_declarations`]
//! rewrites them once the type index is complete.

use anyhow::{bail, Context, Result};
use jdocfix_core::doc::parse_javadoc;
use jdocfix_core::{
    DeclKind, Declaration, FieldDecl, MethodDecl, MethodSig, Modifiers, Param, TypeDecl, TypeKind, TypeRef,
    TypeResolver, Visibility,
};
use tree_sitter::{Node, Parser};

use crate::oracle::types::{ClassShape, Scope};

const PRIMITIVES: &[&str] = &["boolean", "byte", "char", "short", "int", "long", "float", "double"];

/// Everything extracted from one `.java` file.
#[derive(Debug, Clone, Default)]
pub struct JavaFile {
    pub scope: Scope,
    pub shapes: Vec<ClassShape>,
    pub declarations: Vec<Declaration>,
}

pub fn parse(source: &str) -> Result<JavaFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .context("failed to load the Java grammar")?;
    let tree = parser.parse(source.as_bytes(), None).context("parser returned no tree")?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map(|n| n.start_position().row + 1).unwrap_or(0);
        bail!("syntax error near line {}", line);
    }

    let mut walker = Walker {
        source: source.as_bytes(),
        file: JavaFile::default(),
    };
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => walker.file.scope.package = package_name(child, walker.source),
            "import_declaration" => walker.import(child),
            kind if type_kind(kind).is_some() => walker.type_decl(child, None),
            _ => {}
        }
    }
    Ok(walker.file)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().filter(|c| c.has_error()).find_map(first_error)
}

/// Rewrite the type names of `declarations` to qualified names where the
/// resolver knows them. Primitives and type variables are left alone.
pub fn qualify_declarations(declarations: &mut [Declaration], types: &dyn TypeResolver) {
    for decl in declarations {
        let context = decl.owner.clone().unwrap_or_default();
        let qualify = |ty: &mut TypeRef| {
            if ty.primitive || ty.type_variable {
                return;
            }
            if let Some(q) = types.qualify(&context, &ty.name) {
                ty.name = q;
            }
        };
        match &mut decl.kind {
            DeclKind::Type(_) => {}
            DeclKind::Field(f) => qualify(&mut f.ty),
            DeclKind::Method(m) => {
                m.params.iter_mut().map(|p| &mut p.ty).for_each(qualify);
                m.return_type.iter_mut().for_each(qualify);
                m.exceptions.iter_mut().for_each(qualify);
            }
        }
    }
}

// -- Helpers ---------------------------------------------------------------

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| kinds.contains(&c.kind()));
    found
}

fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        "annotation_type_declaration" => Some(TypeKind::Annotation),
        _ => None,
    }
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "annotated_type"
    )
}

fn package_name(node: Node, source: &[u8]) -> String {
    child_of_kind(node, &["scoped_identifier", "identifier"])
        .map(|n| erase_whitespace(node_text(n, source)))
        .unwrap_or_default()
}

fn erase_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Element name and array depth of a type as written, generics erased.
/// `Map<K, V>[]` gives `("Map", 1)`.
pub fn erase_type(text: &str) -> (String, usize) {
    let mut depth = 0usize;
    let mut out = String::new();
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth > 0 || c.is_whitespace() => {}
            _ => out.push(c),
        }
    }
    let mut dims = 0;
    while let Some(rest) = out.strip_suffix("[]") {
        out = rest.to_string();
        dims += 1;
    }
    (out, dims)
}

/// Number of `[]` pairs in a `dimensions` node, e.g. on `int a[][]`.
fn extra_dims(node: Node, field: &str, source: &[u8]) -> usize {
    node.child_by_field_name(field)
        .map(|d| node_text(d, source).matches('[').count())
        .unwrap_or(0)
}

/// Erased element name and dimensions of a type node.
fn type_text(node: Node, source: &[u8]) -> (String, usize) {
    if node.kind() == "annotated_type" {
        let mut cursor = node.walk();
        let inner = node.named_children(&mut cursor).filter(|c| is_type_node(c.kind())).last();
        if let Some(inner) = inner {
            return type_text(inner, source);
        }
    }
    erase_type(node_text(node, source))
}

fn type_ref(name: String, dims: usize, type_vars: &[String]) -> TypeRef {
    let ty = if PRIMITIVES.contains(&name.as_str()) {
        TypeRef::primitive(&name)
    } else if type_vars.contains(&name) {
        TypeRef::type_variable(&name)
    } else {
        TypeRef::class(&name)
    };
    ty.array(dims)
}

fn type_parameters(node: Node, source: &[u8]) -> Vec<String> {
    let Some(params) = node
        .child_by_field_name("type_parameters")
        .or_else(|| child_of_kind(node, &["type_parameters"]))
    else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let names = params
        .named_children(&mut cursor)
        .filter(|p| p.kind() == "type_parameter")
        .filter_map(|p| child_of_kind(p, &["type_identifier", "identifier"]))
        .map(|n| node_text(n, source).to_string())
        .collect();
    names
}

/// Types listed in a `throws`, `super_interfaces` or `extends_interfaces` clause.
fn listed_types(clause: Node, source: &[u8]) -> Vec<(String, usize)> {
    let list = child_of_kind(clause, &["type_list"]).unwrap_or(clause);
    let mut cursor = list.walk();
    let types = list
        .named_children(&mut cursor)
        .filter(|c| is_type_node(c.kind()))
        .map(|c| type_text(c, source))
        .collect();
    types
}

/// Modifier keywords and whether `@Override` is present.
fn modifiers(node: Node, source: &[u8]) -> (Vec<String>, bool) {
    let Some(mods) = child_of_kind(node, &["modifiers"]) else {
        return (Vec::new(), false);
    };
    let mut keywords = Vec::new();
    let mut has_override = false;
    let mut cursor = mods.walk();
    for child in mods.children(&mut cursor) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .unwrap_or("");
                if name == "Override" || name == "java.lang.Override" {
                    has_override = true;
                }
            }
            kind if !child.is_named() => keywords.push(kind.to_string()),
            _ => {}
        }
    }
    (keywords, has_override)
}

/// The Javadoc comment directly preceding `node`, skipping line comments
/// and plain block comments. `/**/` and `/***` rulers are not Javadoc.
fn javadoc<'t>(node: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        match sibling.kind() {
            "line_comment" => prev = sibling.prev_sibling(),
            "block_comment" => {
                let text = node_text(sibling, source);
                if is_javadoc(text) {
                    return Some(sibling);
                }
                prev = sibling.prev_sibling();
            }
            _ => return None,
        }
    }
    None
}

fn is_javadoc(text: &str) -> bool {
    text.starts_with("/**") && !text.starts_with("/**/") && !text.starts_with("/***")
}

// -- Walker ----------------------------------------------------------------

/// Enclosing type while walking members.
struct Owner {
    name: String,
    kind: TypeKind,
    type_vars: Vec<String>,
}

impl Owner {
    fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

/// Existing comment of a declaration, or `Err(())` when the declaration
/// shares its line with the end of its Javadoc and cannot be handled.
type Comment = std::result::Result<(Option<String>, Vec<jdocfix_core::Tag>), ()>;

struct Walker<'s> {
    source: &'s [u8],
    file: JavaFile,
}

impl<'s> Walker<'s> {
    fn import(&mut self, node: Node) {
        let text = node_text(node, self.source);
        let body = text.trim().trim_start_matches("import").trim_end_matches(';').trim();
        if body.starts_with("static ") {
            return;
        }
        let body = erase_whitespace(body);
        match body.strip_suffix(".*") {
            Some(pkg) => self.file.scope.wildcards.push(pkg.to_string()),
            None => self.file.scope.imports.push(body),
        }
    }

    fn comment(&self, node: Node) -> Comment {
        let Some(doc) = javadoc(node, self.source) else {
            return Ok((None, Vec::new()));
        };
        if doc.end_position().row == node.start_position().row {
            return Err(());
        }
        let parsed = parse_javadoc(node_text(doc, self.source));
        Ok((Some(parsed.body), parsed.tags))
    }

    fn modifiers_for(&self, node: Node, owner: Option<&Owner>, is_constructor: bool) -> (Modifiers, bool) {
        let (keywords, has_override) = modifiers(node, self.source);
        let has = |k: &str| keywords.iter().any(|w| w == k);
        let in_interface = owner.is_some_and(Owner::is_interface);
        let visibility = if has("public") {
            Visibility::Public
        } else if has("protected") {
            Visibility::Protected
        } else if has("private") {
            Visibility::Private
        } else if in_interface {
            Visibility::Public
        } else if is_constructor && owner.is_some_and(|o| o.kind == TypeKind::Enum) {
            Visibility::Private
        } else {
            Visibility::Package
        };
        let m = Modifiers {
            visibility,
            is_static: has("static"),
            is_abstract: has("abstract"),
            is_final: has("final"),
        };
        (m, has_override)
    }

    fn qualified(&self, owner: Option<&Owner>, name: &str) -> String {
        match owner {
            Some(o) => format!("{}.{}", o.name, name),
            None if self.file.scope.package.is_empty() => name.to_string(),
            None => format!("{}.{}", self.file.scope.package, name),
        }
    }

    fn type_decl(&mut self, node: Node, owner: Option<&Owner>) {
        let Some(kind) = type_kind(node.kind()) else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, self.source).to_string();
        let qualified_name = self.qualified(owner, &name);
        let (mut modifiers, _) = self.modifiers_for(node, owner, false);
        if owner.is_some_and(Owner::is_interface) {
            modifiers.is_static = true;
        }

        if let Ok((comment, tags)) = self.comment(node) {
            self.file.declarations.push(Declaration {
                name: name.clone(),
                qualified_name: qualified_name.clone(),
                owner: owner.map(|o| o.name.clone()),
                modifiers,
                line: node.start_position().row + 1,
                comment,
                tags,
                kind: DeclKind::Type(TypeDecl { kind }),
            });
        }

        let mut type_vars = owner.map(|o| o.type_vars.clone()).unwrap_or_default();
        type_vars.extend(type_parameters(node, self.source));
        let this = Owner {
            name: qualified_name.clone(),
            kind,
            type_vars,
        };

        let superclass = match kind {
            TypeKind::Class => Some(
                child_of_kind(node, &["superclass"])
                    .and_then(|s| {
                        let mut cursor = s.walk();
                        let ty = s.named_children(&mut cursor).find(|c| is_type_node(c.kind()));
                        ty
                    })
                    .map(|t| type_text(t, self.source).0)
                    .unwrap_or_else(|| "Object".to_string()),
            ),
            TypeKind::Enum => Some("Enum".to_string()),
            TypeKind::Record => Some("Record".to_string()),
            TypeKind::Interface | TypeKind::Annotation => None,
        };
        let interfaces = child_of_kind(node, &["super_interfaces", "extends_interfaces"])
            .map(|c| listed_types(c, self.source).into_iter().map(|(n, _)| n).collect())
            .unwrap_or_default();
        let shape_index = self.file.shapes.len();
        self.file.shapes.push(ClassShape {
            name: qualified_name,
            superclass,
            interfaces,
            methods: Vec::new(),
        });

        if let Some(body) = node.child_by_field_name("body") {
            self.members(body, &this, shape_index);
        }
    }

    fn members(&mut self, body: Node, owner: &Owner, shape_index: usize) {
        let mut cursor = body.walk();
        let children: Vec<Node> = body.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "field_declaration" | "constant_declaration" => self.field(child, owner),
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.method(child, owner, false, shape_index)
                }
                "constructor_declaration" => self.method(child, owner, true, shape_index),
                "enum_body_declarations" => self.members(child, owner, shape_index),
                kind if type_kind(kind).is_some() => self.type_decl(child, Some(owner)),
                _ => {}
            }
        }
    }

    fn field(&mut self, node: Node, owner: &Owner) {
        let Ok((comment, tags)) = self.comment(node) else {
            return;
        };
        let Some(ty_node) = node.child_by_field_name("type") else {
            return;
        };
        let (ty_name, ty_dims) = type_text(ty_node, self.source);
        let (mut modifiers, _) = self.modifiers_for(node, Some(owner), false);
        let in_interface = owner.is_interface();
        if in_interface {
            modifiers.is_static = true;
            modifiers.is_final = true;
        }

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "variable_declarator")
            .collect();
        for declarator in declarators {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(name_node, self.source).to_string();
            let dims = ty_dims + extra_dims(declarator, "dimensions", self.source);
            let initializer = declarator
                .child_by_field_name("value")
                .map(|v| node_text(v, self.source).to_string());
            self.file.declarations.push(Declaration {
                qualified_name: format!("{}.{}", owner.name, name),
                name,
                owner: Some(owner.name.clone()),
                modifiers: modifiers.clone(),
                line: node.start_position().row + 1,
                comment: comment.clone(),
                tags: tags.clone(),
                kind: DeclKind::Field(FieldDecl {
                    ty: type_ref(ty_name.clone(), dims, &owner.type_vars),
                    initializer,
                    in_interface,
                }),
            });
        }
    }

    fn method(&mut self, node: Node, owner: &Owner, is_constructor: bool, shape_index: usize) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, self.source).to_string();
        let (modifiers, has_override) = self.modifiers_for(node, Some(owner), is_constructor);

        let type_params = type_parameters(node, self.source);
        let mut type_vars = owner.type_vars.clone();
        type_vars.extend(type_params.iter().cloned());

        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p, &type_vars))
            .unwrap_or_default();
        let return_type = if is_constructor {
            None
        } else {
            node.child_by_field_name("type")
                .filter(|t| t.kind() != "void_type")
                .map(|t| {
                    let (n, d) = type_text(t, self.source);
                    type_ref(n, d + extra_dims(node, "dimensions", self.source), &type_vars)
                })
        };
        let exceptions = child_of_kind(node, &["throws"])
            .map(|t| {
                listed_types(t, self.source)
                    .into_iter()
                    .map(|(n, d)| type_ref(n, d, &type_vars))
                    .collect()
            })
            .unwrap_or_default();

        if !is_constructor && modifiers.visibility != Visibility::Private {
            let sig = MethodSig {
                name: name.clone(),
                param_types: params.iter().map(|p: &Param| p.ty.signature()).collect(),
            };
            self.file.shapes[shape_index].methods.push(sig);
        }

        let Ok((comment, tags)) = self.comment(node) else {
            return;
        };
        self.file.declarations.push(Declaration {
            qualified_name: format!("{}.{}", owner.name, name),
            name,
            owner: Some(owner.name.clone()),
            modifiers,
            line: node.start_position().row + 1,
            comment,
            tags,
            kind: DeclKind::Method(MethodDecl {
                params,
                type_params,
                return_type,
                exceptions,
                is_constructor,
                has_override,
                in_interface: owner.is_interface(),
            }),
        });
    }

    fn parameters(&self, node: Node, type_vars: &[String]) -> Vec<Param> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for p in node.named_children(&mut cursor) {
            match p.kind() {
                "formal_parameter" => {
                    let (Some(ty), Some(name)) = (p.child_by_field_name("type"), p.child_by_field_name("name")) else {
                        continue;
                    };
                    let (n, d) = type_text(ty, self.source);
                    let dims = d + extra_dims(p, "dimensions", self.source);
                    out.push(Param::new(node_text(name, self.source), type_ref(n, dims, type_vars)));
                }
                "spread_parameter" => {
                    let ty = child_of_kind(p, &[
                        "type_identifier",
                        "scoped_type_identifier",
                        "generic_type",
                        "array_type",
                        "integral_type",
                        "floating_point_type",
                        "boolean_type",
                        "annotated_type",
                    ]);
                    let name = child_of_kind(p, &["variable_declarator"]).and_then(|v| v.child_by_field_name("name"));
                    let (Some(ty), Some(name)) = (ty, name) else {
                        continue;
                    };
                    let (n, d) = type_text(ty, self.source);
                    out.push(Param::new(node_text(name, self.source), type_ref(n, d + 1, type_vars)));
                }
                _ => {}
            }
        }
        out
    }
}
