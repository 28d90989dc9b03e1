//! Run configuration. Immutable once a run starts.

use crate::model::{Modifiers, Visibility};

/// Block tags the engine knows how to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Author,
    Version,
    Since,
    Param,
    Return,
    Throws,
    Link,
}

impl TagKind {
    pub const ALL: [TagKind; 7] = [
        TagKind::Author,
        TagKind::Version,
        TagKind::Since,
        TagKind::Param,
        TagKind::Return,
        TagKind::Throws,
        TagKind::Link,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TagKind::Author => "author",
            TagKind::Version => "version",
            TagKind::Since => "since",
            TagKind::Param => "param",
            TagKind::Return => "return",
            TagKind::Throws => "throws",
            TagKind::Link => "link",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        TagKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// Which tags are subject to fixing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixTags {
    #[default]
    All,
    Only(Vec<TagKind>),
}

impl FixTags {
    /// Parse a comma-separated list. Returns the selection plus the entries
    /// that were not recognized, which callers warn about and ignore.
    pub fn parse(spec: &str) -> (FixTags, Vec<String>) {
        let mut kinds = Vec::new();
        let mut rejected = Vec::new();
        let mut all = false;
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry.eq_ignore_ascii_case("all") {
                all = true;
            } else if let Some(kind) = TagKind::from_name(entry) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            } else {
                rejected.push(entry.to_string());
            }
        }
        if all || kinds.is_empty() {
            (FixTags::All, rejected)
        } else {
            (FixTags::Only(kinds), rejected)
        }
    }

    pub fn enabled(&self, kind: TagKind) -> bool {
        match self {
            FixTags::All => true,
            FixTags::Only(kinds) => kinds.contains(&kind),
        }
    }
}

/// How inheritance is matched against supertypes when there is no
/// `@Override` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritMatch {
    /// Same name, arity and every parameter type.
    #[default]
    AllParameters,
    /// The first supertype method with the same name and arity decides, and
    /// only its last parameter type is compared. Zero-parameter methods never
    /// match.
    LastParameterOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndentStyle {
    /// Reuse the leading whitespace of the declaration line.
    #[default]
    Detect,
    /// One unit per enclosing type, e.g. four spaces or a tab.
    Unit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixConfig {
    pub fix_tags: FixTags,
    /// Minimum visibility a declaration needs to be processed.
    pub level: Visibility,
    pub default_author: String,
    pub default_version: String,
    pub default_since: String,
    pub fix_class_comment: bool,
    pub fix_field_comment: bool,
    pub fix_method_comment: bool,
    pub remove_unknown_throws: bool,
    pub inherit_match: InheritMatch,
    pub indent: IndentStyle,
}

impl Default for FixConfig {
    fn default() -> Self {
        FixConfig {
            fix_tags: FixTags::All,
            level: Visibility::Protected,
            default_author: String::new(),
            default_version: "$Id: $".to_string(),
            default_since: "1.0".to_string(),
            fix_class_comment: true,
            fix_field_comment: true,
            fix_method_comment: true,
            remove_unknown_throws: false,
            inherit_match: InheritMatch::AllParameters,
            indent: IndentStyle::Detect,
        }
    }
}

impl FixConfig {
    pub fn fixes(&self, kind: TagKind) -> bool {
        self.fix_tags.enabled(kind)
    }

    pub fn in_level(&self, modifiers: &Modifiers) -> bool {
        modifiers.visibility >= self.level
    }

    /// Set the default `@since` value, dropping a `-SNAPSHOT` suffix.
    pub fn with_since(mut self, since: &str) -> Self {
        self.default_since = normalize_since(since);
        self
    }
}

/// `1.2-SNAPSHOT` becomes `1.2`.
pub fn normalize_since(since: &str) -> String {
    let since = since.trim();
    since.strip_suffix("-SNAPSHOT").unwrap_or(since).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fix_tags_subset() {
        let (tags, rejected) = FixTags::parse("param, return,bogus");
        assert_eq!(tags, FixTags::Only(vec![TagKind::Param, TagKind::Return]));
        assert_eq!(rejected, vec!["bogus"]);
        assert!(tags.enabled(TagKind::Param));
        assert!(!tags.enabled(TagKind::Since));
    }

    #[test]
    fn parse_fix_tags_all() {
        assert_eq!(FixTags::parse("all").0, FixTags::All);
        assert_eq!(FixTags::parse("").0, FixTags::All);
        assert_eq!(FixTags::parse("param,all").0, FixTags::All);
    }

    #[test]
    fn parse_fix_tags_only_rejected_falls_back_to_all() {
        let (tags, rejected) = FixTags::parse("nope");
        assert_eq!(tags, FixTags::All);
        assert_eq!(rejected, vec!["nope"]);
    }

    #[test]
    fn level_filtering() {
        let config = FixConfig::default();
        let mut mods = Modifiers::public();
        assert!(config.in_level(&mods));
        mods.visibility = Visibility::Protected;
        assert!(config.in_level(&mods));
        mods.visibility = Visibility::Package;
        assert!(!config.in_level(&mods));

        let private = FixConfig {
            level: Visibility::Private,
            ..FixConfig::default()
        };
        mods.visibility = Visibility::Private;
        assert!(private.in_level(&mods));
    }

    #[test]
    fn since_drops_snapshot() {
        assert_eq!(normalize_since("2.1-SNAPSHOT"), "2.1");
        assert_eq!(normalize_since("2.1"), "2.1");
        assert_eq!(FixConfig::default().with_since("3.0-SNAPSHOT").default_since, "3.0");
    }
}
