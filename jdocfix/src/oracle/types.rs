//! Type index: the type resolver behind throws classification, `{@link}`
//! qualification and inheritance detection.
//!
//! The index starts from an embedded inventory of common JDK types, takes
//! optional user JSON indexes, and is finally extended with every type
//! declared in the processed sources.

use anyhow::{Context, Result};
use jdocfix_core::{MethodSig, ResolvedClass, TypeResolver};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const JDK_TYPES: &str = include_str!("jdk-types.json");

/// On-disk form of a type index.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TypeIndexFile {
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl From<ClassEntry> for ResolvedClass {
    fn from(entry: ClassEntry) -> Self {
        ResolvedClass {
            name: dotted(&entry.name),
            superclass: entry.superclass.as_deref().map(dotted),
            interfaces: entry.interfaces.iter().map(|i| dotted(i)).collect(),
            methods: entry
                .methods
                .into_iter()
                .map(|m| MethodSig {
                    name: m.name,
                    param_types: m.params,
                })
                .collect(),
        }
    }
}

/// Nested class names are stored dotted; `$` binary names are accepted on input.
fn dotted(name: &str) -> String {
    name.replace('$', ".")
}

/// All known classes, keyed by dotted qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    classes: HashMap<String, ResolvedClass>,
}

impl TypeIndex {
    /// The embedded JDK inventory.
    pub fn jdk() -> Result<Self> {
        Self::from_str(JDK_TYPES).context("embedded JDK type inventory is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read type index: {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("failed to parse type index: {}", path.display()))
    }

    pub fn from_str(json: &str) -> Result<Self> {
        let file: TypeIndexFile = serde_json::from_str(json).context("failed to parse type index JSON")?;
        let mut index = TypeIndex::default();
        for entry in file.classes {
            index.insert(entry.into());
        }
        Ok(index)
    }

    /// Add or replace a class.
    pub fn insert(&mut self, class: ResolvedClass) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Add every class of `other`, replacing same-named entries.
    pub fn merge(&mut self, other: TypeIndex) {
        self.classes.extend(other.classes);
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedClass> {
        if name.contains('$') {
            self.classes.get(&dotted(name))
        } else {
            self.classes.get(name)
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

/// Names visible in one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub package: String,
    /// Single-type imports, e.g. `java.util.List`.
    pub imports: Vec<String>,
    /// On-demand imports without the `.*`, e.g. `java.util`.
    pub wildcards: Vec<String>,
}

impl Scope {
    fn in_package(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        }
    }
}

/// The type index seen through the imports of one file.
pub struct FileResolver<'a> {
    pub index: &'a TypeIndex,
    pub scope: &'a Scope,
}

impl<'a> FileResolver<'a> {
    pub fn new(index: &'a TypeIndex, scope: &'a Scope) -> Self {
        FileResolver { index, scope }
    }

    /// Lookup order: as written, single-type imports, the context type and
    /// its enclosing types, the package, on-demand imports, `java.lang`.
    fn candidates(&self, context: &str, name: &str) -> Vec<String> {
        let name = dotted(name);
        let (head, tail) = match name.split_once('.') {
            Some((h, t)) => (h, Some(t)),
            None => (name.as_str(), None),
        };
        let join = |base: &str| match tail {
            Some(t) => format!("{}.{}", base, t),
            None => base.to_string(),
        };

        let mut out = vec![name.clone()];
        for import in &self.scope.imports {
            if import.rsplit('.').next() == Some(head) {
                out.push(join(import));
            }
        }
        let mut enclosing = context;
        while !enclosing.is_empty() && enclosing != self.scope.package {
            out.push(format!("{}.{}", enclosing, name));
            enclosing = enclosing.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
        }
        out.push(self.scope.in_package(&name));
        for wildcard in &self.scope.wildcards {
            out.push(format!("{}.{}", wildcard, name));
        }
        out.push(format!("java.lang.{}", name));
        out
    }
}

impl TypeResolver for FileResolver<'_> {
    fn resolve_class(&self, name: &str) -> Option<&ResolvedClass> {
        self.index.get(name)
    }

    fn qualify(&self, context: &str, name: &str) -> Option<String> {
        self.candidates(context, name)
            .into_iter()
            .find_map(|c| self.index.get(&c).map(|r| r.name.clone()))
    }
}

/// Class-level structure of a parsed source file, before names are qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassShape {
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodSig>,
}

/// Add source-declared classes to the index. Their names are registered
/// first so that supertypes and parameter types may refer to each other
/// across files, then each shape is qualified in its own file's scope.
pub fn add_sources<'s>(index: &mut TypeIndex, files: impl IntoIterator<Item = (&'s Scope, &'s [ClassShape])> + Clone) {
    for (_, shapes) in files.clone() {
        for shape in shapes {
            index.insert(ResolvedClass {
                name: shape.name.clone(),
                ..Default::default()
            });
        }
    }

    let mut resolved = Vec::new();
    for (scope, shapes) in files {
        let resolver = FileResolver::new(index, scope);
        for shape in shapes {
            let qualify = |n: &String| resolver.qualify(&shape.name, n).unwrap_or_else(|| n.clone());
            resolved.push(ResolvedClass {
                name: shape.name.clone(),
                superclass: shape.superclass.as_ref().map(qualify),
                interfaces: shape.interfaces.iter().map(qualify).collect(),
                methods: shape
                    .methods
                    .iter()
                    .map(|m| MethodSig {
                        name: m.name.clone(),
                        param_types: m.param_types.iter().map(|p| qualify_signature(&resolver, &shape.name, p)).collect(),
                    })
                    .collect(),
            });
        }
    }
    for class in resolved {
        index.insert(class);
    }
}

/// Qualify the element type of a signature type such as `List[]`,
/// leaving primitives and unknown names as written.
pub fn qualify_signature(resolver: &FileResolver, context: &str, ty: &str) -> String {
    let element = ty.trim_end_matches("[]");
    let dims = &ty[element.len()..];
    match resolver.qualify(context, element) {
        Some(q) => format!("{}{}", q, dims),
        None => ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(package: &str, imports: &[&str], wildcards: &[&str]) -> Scope {
        Scope {
            package: package.into(),
            imports: imports.iter().map(|s| s.to_string()).collect(),
            wildcards: wildcards.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn embedded_inventory_loads() {
        let index = TypeIndex::jdk().unwrap();
        let rte = index.get("java.lang.RuntimeException").unwrap();
        assert_eq!(rte.superclass.as_deref(), Some("java.lang.Exception"));
        assert!(index.get("java.io.IOException").is_some());
        assert!(index.get("java.lang.Runnable").unwrap().methods.iter().any(|m| m.name == "run"));
    }

    #[test]
    fn user_index_accepts_binary_names() {
        let json = r#"{ "classes": [
            { "name": "p.Outer$Inner", "superclass": "java.lang.Exception" },
            { "name": "p.Api", "methods": [ { "name": "call", "params": ["int"] } ] }
        ] }"#;
        let index = TypeIndex::from_str(json).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get("p.Outer.Inner").is_some());
        assert!(index.get("p.Outer$Inner").is_some());
        assert_eq!(index.get("p.Api").unwrap().methods[0].param_types, vec!["int"]);
    }

    #[test]
    fn malformed_index_is_an_error() {
        assert!(TypeIndex::from_str("{ \"classes\": 3 }").is_err());
    }

    #[test]
    fn qualify_follows_import_order() {
        let mut index = TypeIndex::jdk().unwrap();
        index.merge(
            TypeIndex::from_str(
                r#"{ "classes": [
                    { "name": "a.List" }, { "name": "b.List" }, { "name": "p.Local" },
                    { "name": "p.Outer.Nested" }, { "name": "w.Thing" }, { "name": "x.Map" }, { "name": "x.Map.Entry" }
                ] }"#,
            )
            .unwrap(),
        );
        let s = scope("p", &["b.List", "x.Map"], &["w", "a"]);
        let r = FileResolver::new(&index, &s);
        assert_eq!(r.qualify("p.Outer", "List").as_deref(), Some("b.List"));
        assert_eq!(r.qualify("p.Outer", "Local").as_deref(), Some("p.Local"));
        assert_eq!(r.qualify("p.Outer.Inner", "Nested").as_deref(), Some("p.Outer.Nested"));
        assert_eq!(r.qualify("p.Outer", "Thing").as_deref(), Some("w.Thing"));
        assert_eq!(r.qualify("p.Outer", "Map.Entry").as_deref(), Some("x.Map.Entry"));
        assert_eq!(r.qualify("p.Outer", "Exception").as_deref(), Some("java.lang.Exception"));
        assert_eq!(r.qualify("p.Outer", "java.io.IOException").as_deref(), Some("java.io.IOException"));
        assert_eq!(r.qualify("p.Outer", "Missing"), None);
    }

    #[test]
    fn sources_are_qualified_in_their_scope() {
        let mut index = TypeIndex::jdk().unwrap();
        let s1 = scope("p", &[], &[]);
        let s2 = scope("q", &["p.Base"], &[]);
        let base = vec![ClassShape {
            name: "p.Base".into(),
            superclass: Some("Exception".into()),
            interfaces: vec!["Runnable".into()],
            methods: vec![MethodSig::new("take", &["Base[]", "int"])],
        }];
        let derived = vec![ClassShape {
            name: "q.Derived".into(),
            superclass: Some("Base".into()),
            interfaces: vec![],
            methods: vec![],
        }];
        add_sources(&mut index, vec![(&s1, base.as_slice()), (&s2, derived.as_slice())]);

        let b = index.get("p.Base").unwrap();
        assert_eq!(b.superclass.as_deref(), Some("java.lang.Exception"));
        assert_eq!(b.interfaces, vec!["java.lang.Runnable"]);
        assert_eq!(b.methods[0].param_types, vec!["p.Base[]", "int"]);
        assert_eq!(index.get("q.Derived").unwrap().superclass.as_deref(), Some("p.Base"));
    }
}
