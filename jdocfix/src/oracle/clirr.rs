//! Clirr text report reader: the API-diff provider.
//!
//! Report lines look like
//! `INFO: 7011: org.example.Foo: Method 'public void bar(int)' has been added`.
//! Only added classes (8000) and added methods (7011, 7012) matter.

use anyhow::{Context, Result};
use jdocfix_core::{ApiDiff, MethodSignature};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const METHOD_ADDED: u32 = 7011;
const METHOD_ADDED_TO_INTERFACE: u32 = 7012;
const CLASS_ADDED: u32 = 8000;

#[derive(Debug, Clone, Default)]
pub struct ClirrReport {
    new_classes: HashSet<String>,
    /// Class name to the added method signatures, as Clirr prints them.
    new_methods: HashMap<String, Vec<String>>,
}

impl ClirrReport {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read Clirr report: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(report: &str) -> Self {
        let mut out = ClirrReport::default();
        for line in report.lines() {
            let parts = split_nonempty(line, ':');
            if parts.len() != 4 {
                tracing::debug!("unable to parse the clirr line: {}", line);
                continue;
            }
            let Ok(code) = parts[1].trim().parse::<u32>() else {
                tracing::debug!("unable to parse the clirr line: {}", line);
                continue;
            };
            let class = parts[2].trim();
            match code {
                METHOD_ADDED | METHOD_ADDED_TO_INTERFACE => {
                    let quoted = split_nonempty(parts[3].trim(), '\'');
                    if quoted.len() != 3 {
                        continue;
                    }
                    out.new_methods
                        .entry(class.to_string())
                        .or_default()
                        .push(quoted[1].trim().to_string());
                }
                CLASS_ADDED => {
                    out.new_classes.insert(class.to_string());
                }
                _ => {}
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.new_classes.is_empty() && self.new_methods.is_empty()
    }
}

/// Split on `sep`, dropping empty pieces.
fn split_nonempty(s: &str, sep: char) -> Vec<&str> {
    s.split(sep).filter(|p| !p.is_empty()).collect()
}

impl ApiDiff for ClirrReport {
    fn is_new_type(&self, qualified_name: &str) -> bool {
        self.new_classes.contains(qualified_name)
    }

    fn is_new_method(&self, signature: &MethodSignature) -> bool {
        let Some(added) = self.new_methods.get(&signature.owner) else {
            return false;
        };
        let ret = signature.return_type.as_deref().unwrap_or("");
        let name = format!("{}(", signature.name);
        let params = format!("({})", signature.param_types.join(", "));
        added
            .iter()
            .any(|m| m.contains(&format!("{} ", ret)) && m.contains(&name) && m.contains(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
INFO: 8000: org.example.Fresh: Class org.example.Fresh added
INFO: 7011: org.example.Foo: Method 'public java.lang.String render(int, java.util.List)' has been added
INFO: 7012: org.example.Api: Method 'public void call()' has been added to an interface
INFO: 7011: org.example.Foo: Method without quotes
ERROR: 7002: org.example.Foo: Method 'public void gone()' has been removed
not a clirr line
INFO: abc: org.example.Foo: Method 'public void x()' has been added
";

    fn sig(owner: &str, ret: Option<&str>, name: &str, params: &[&str]) -> MethodSignature {
        MethodSignature {
            owner: owner.into(),
            name: name.into(),
            return_type: ret.map(str::to_string),
            param_types: params.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn new_classes_and_methods_are_read() {
        let report = ClirrReport::parse(REPORT);
        assert!(report.is_new_type("org.example.Fresh"));
        assert!(!report.is_new_type("org.example.Foo"));
        assert!(report.is_new_method(&sig(
            "org.example.Foo",
            Some("java.lang.String"),
            "render",
            &["int", "java.util.List"]
        )));
        assert!(report.is_new_method(&sig("org.example.Api", Some("void"), "call", &[])));
    }

    #[test]
    fn method_match_needs_every_part() {
        let report = ClirrReport::parse(REPORT);
        assert!(!report.is_new_method(&sig("org.example.Foo", Some("void"), "render", &["int", "java.util.List"])));
        assert!(!report.is_new_method(&sig("org.example.Foo", Some("java.lang.String"), "render", &["int"])));
        assert!(!report.is_new_method(&sig("org.example.Foo", Some("void"), "gone", &[])));
        assert!(!report.is_new_method(&sig("org.example.Foo", Some("void"), "x", &[])));
    }

    #[test]
    fn empty_report() {
        assert!(ClirrReport::parse("").is_empty());
        assert!(!ClirrReport::parse(REPORT).is_empty());
    }
}
