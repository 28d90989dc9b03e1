//! Seams to the outside world: the API-diff provider and the type resolver.
//!
//! Both are queried read-only during reconciliation. The core never parses
//! a report or loads a class itself.

use std::collections::HashSet;

use crate::model::{DeclKind, Declaration};

/// Answers "is this new since the baseline release?".
pub trait ApiDiff {
    fn is_new_type(&self, qualified_name: &str) -> bool;
    fn is_new_method(&self, signature: &MethodSignature) -> bool;
}

/// A method as the API-diff provider sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub owner: String,
    pub name: String,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub param_types: Vec<String>,
}

impl MethodSignature {
    pub fn of(decl: &Declaration) -> Option<Self> {
        let DeclKind::Method(m) = &decl.kind else {
            return None;
        };
        let return_type = if m.is_constructor {
            None
        } else {
            Some(
                m.return_type
                    .as_ref()
                    .map(|t| t.signature())
                    .unwrap_or_else(|| "void".to_string()),
            )
        };
        Some(MethodSignature {
            owner: decl.owner.clone().unwrap_or_default(),
            name: decl.name.clone(),
            return_type,
            param_types: m.params.iter().map(|p| p.ty.signature()).collect(),
        })
    }
}

/// Structural facts about a class, enough to walk its hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedClass {
    /// Binary name, nested classes joined with `$`.
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodSig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub param_types: Vec<String>,
}

impl MethodSig {
    pub fn new(name: &str, param_types: &[&str]) -> Self {
        MethodSig {
            name: name.to_string(),
            param_types: param_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub trait TypeResolver {
    /// Look up a class by qualified (binary or dotted) name.
    fn resolve_class(&self, name: &str) -> Option<&ResolvedClass>;

    /// Qualify `name` as seen from inside the type `context`. The default
    /// tries the name as written, a sibling of `context`, a member of
    /// `context`, then `java.lang`.
    fn qualify(&self, context: &str, name: &str) -> Option<String> {
        qualify_candidates(context, name)
            .into_iter()
            .find_map(|c| self.resolve_class(&c).map(|r| r.name.clone()))
    }
}

/// Resolves nothing. Used when no type information is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypes;

impl TypeResolver for NoTypes {
    fn resolve_class(&self, _name: &str) -> Option<&ResolvedClass> {
        None
    }
}

/// Everything the engine may consult while fixing one file.
#[derive(Clone, Copy)]
pub struct Oracles<'a> {
    /// `None` when API-diff gating is disabled.
    pub api_diff: Option<&'a dyn ApiDiff>,
    pub types: &'a dyn TypeResolver,
}

impl<'a> Oracles<'a> {
    pub fn new(types: &'a dyn TypeResolver) -> Self {
        Oracles {
            api_diff: None,
            types,
        }
    }

    pub fn with_api_diff(mut self, diff: &'a dyn ApiDiff) -> Self {
        self.api_diff = Some(diff);
        self
    }
}

pub(crate) fn qualify_candidates(context: &str, name: &str) -> Vec<String> {
    let mut out = vec![name.to_string()];
    if !name.contains('.') {
        if let Some((parent, _)) = context.rsplit_once('.') {
            out.push(format!("{}.{}", parent, name));
        }
        if !context.is_empty() {
            out.push(format!("{}.{}", context, name));
        }
        out.push(format!("java.lang.{}", name));
    }
    out.dedup();
    out
}

// -- Hierarchy walking ------------------------------------------------------

/// Superclass chain of `class`, nearest first, excluding `class` itself.
pub fn superclasses<'r>(types: &'r dyn TypeResolver, class: &ResolvedClass) -> Vec<&'r ResolvedClass> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(class.name.clone());
    let mut next = class.superclass.clone();
    while let Some(name) = next {
        let Some(sup) = types.resolve_class(&name) else {
            break;
        };
        if !seen.insert(sup.name.clone()) {
            break;
        }
        next = sup.superclass.clone();
        out.push(sup);
    }
    out
}

/// Every interface implemented by `class` or any superclass, transitively.
/// Order: for each class in the chain, each direct interface followed by
/// its own superinterfaces.
pub fn all_interfaces<'r>(types: &'r dyn TypeResolver, class: &ResolvedClass) -> Vec<&'r ResolvedClass> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect_interfaces(types, &class.interfaces, &mut seen, &mut out);
    for sup in superclasses(types, class) {
        collect_interfaces(types, &sup.interfaces, &mut seen, &mut out);
    }
    out
}

fn collect_interfaces<'r>(
    types: &'r dyn TypeResolver,
    names: &[String],
    seen: &mut HashSet<String>,
    out: &mut Vec<&'r ResolvedClass>,
) {
    for name in names {
        let Some(iface) = types.resolve_class(name) else {
            continue;
        };
        if seen.insert(iface.name.clone()) {
            out.push(iface);
            collect_interfaces(types, &iface.interfaces, seen, out);
        }
    }
}

/// Whether `class` is `target` or has it as a superclass or interface.
pub fn is_assignable(types: &dyn TypeResolver, class: &ResolvedClass, target: &str) -> bool {
    if class.name == target {
        return true;
    }
    superclasses(types, class).iter().any(|c| c.name == target)
        || all_interfaces(types, class).iter().any(|c| c.name == target)
}

/// Unchecked exceptions: subclasses of `RuntimeException` or `Error`.
pub fn is_unchecked(types: &dyn TypeResolver, class: &ResolvedClass) -> bool {
    is_assignable(types, class, "java.lang.RuntimeException")
        || is_assignable(types, class, "java.lang.Error")
}

pub fn is_throwable(types: &dyn TypeResolver, class: &ResolvedClass) -> bool {
    is_assignable(types, class, "java.lang.Throwable")
}


#[cfg(test)]
mod tests {
    use super::testing::MapTypes;
    use super::*;

    #[test]
    fn qualify_via_java_lang() {
        let types = MapTypes::with_jdk();
        assert_eq!(
            types.qualify("com.acme.Foo", "String"),
            Some("java.lang.String".to_string())
        );
        assert_eq!(types.qualify("com.acme.Foo", "Nope"), None);
    }

    #[test]
    fn qualify_sibling_before_java_lang() {
        let mut types = MapTypes::with_jdk();
        types.add("com.acme.String", None, &[], vec![]);
        assert_eq!(
            types.qualify("com.acme.Foo", "String"),
            Some("com.acme.String".to_string())
        );
    }

    #[test]
    fn assignability_walks_superclasses() {
        let types = MapTypes::with_jdk();
        let iae = types.resolve_class("java.lang.IllegalArgumentException").unwrap();
        assert!(is_unchecked(&types, iae));
        assert!(is_throwable(&types, iae));
        let io = types.resolve_class("java.io.IOException").unwrap();
        assert!(!is_unchecked(&types, io));
        assert!(is_throwable(&types, io));
        let s = types.resolve_class("java.lang.String").unwrap();
        assert!(!is_throwable(&types, s));
    }

    #[test]
    fn interfaces_are_transitive() {
        let mut types = MapTypes::with_jdk();
        types.add("a.Base", None, &[], vec![]);
        types.add("a.Child", None, &["a.Base"], vec![]);
        types.add("a.Impl", Some("a.Parent"), &[], vec![]);
        types.add("a.Parent", Some("java.lang.Object"), &["a.Child"], vec![]);
        let class = types.resolve_class("a.Impl").unwrap();
        let names: Vec<&str> = all_interfaces(&types, class)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["a.Child", "a.Base"]);
    }

    #[test]
    fn superclass_cycle_terminates() {
        let mut types = MapTypes::default();
        types.add("a.A", Some("a.B"), &[], vec![]);
        types.add("a.B", Some("a.A"), &[], vec![]);
        let a = types.resolve_class("a.A").unwrap();
        assert_eq!(superclasses(&types, a).len(), 1);
    }
}
