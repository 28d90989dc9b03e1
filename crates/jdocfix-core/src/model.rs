//! Declaration model: what a front end hands to the core.
//!
//! Declarations are produced once per file and never mutated by the
//! reconciliation engine. Line numbers are 1-based and point at the first
//! line of the declaration (annotations included).

/// Access level of a declaration, ordered from least to most visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    Private,
    #[default]
    Package,
    Protected,
    Public,
}

impl Visibility {
    /// Parse a `--level` value ("public", "protected", "package", "private").
    pub fn from_level(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "package" => Some(Visibility::Package),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

impl Modifiers {
    pub fn public() -> Self {
        Modifiers {
            visibility: Visibility::Public,
            ..Default::default()
        }
    }
}

/// A type reference as it appears in a signature, erased and qualified
/// as far as the front end could.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Qualified element name (`java.lang.String`, `int`, `T`).
    pub name: String,
    /// Array dimensions; varargs count as one.
    pub dimensions: usize,
    pub primitive: bool,
    /// Generic type variable such as `T`.
    pub type_variable: bool,
}

impl TypeRef {
    pub fn class(name: &str) -> Self {
        TypeRef {
            name: name.to_string(),
            dimensions: 0,
            primitive: false,
            type_variable: false,
        }
    }

    pub fn primitive(name: &str) -> Self {
        TypeRef {
            primitive: true,
            ..TypeRef::class(name)
        }
    }

    pub fn type_variable(name: &str) -> Self {
        TypeRef {
            type_variable: true,
            ..TypeRef::class(name)
        }
    }

    pub fn array(mut self, dimensions: usize) -> Self {
        self.dimensions += dimensions;
        self
    }

    pub fn is_array(&self) -> bool {
        self.dimensions > 0
    }

    /// Name with `[]` per dimension, the form used in method signatures.
    pub fn signature(&self) -> String {
        let mut s = self.name.clone();
        for _ in 0..self.dimensions {
            s.push_str("[]");
        }
        s
    }
}

/// An existing block tag: name plus whitespace-separated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub params: Vec<String>,
}

impl Tag {
    /// Build a tag from its name and raw value text.
    pub fn new(name: &str, value: &str) -> Self {
        Tag {
            name: name.to_string(),
            params: value.split_whitespace().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Param {
            name: name.to_string(),
            ty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: TypeKind,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub ty: TypeRef,
    /// Initializer expression text, if any.
    pub initializer: Option<String>,
    /// Declared inside an interface (implicitly public static).
    pub in_interface: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub params: Vec<Param>,
    /// Method type parameter names, e.g. `T` for `<T> void m(T t)`.
    pub type_params: Vec<String>,
    /// `None` for `void` and constructors.
    pub return_type: Option<TypeRef>,
    pub exceptions: Vec<TypeRef>,
    pub is_constructor: bool,
    /// Carries an explicit `@Override` marker.
    pub has_override: bool,
    pub in_interface: bool,
}

impl MethodDecl {
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether `name` is a `<T>`-style type parameter tag key of this method.
    pub fn has_type_param_key(&self, name: &str) -> bool {
        self.type_params.iter().any(|t| format!("<{}>", t) == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Type(TypeDecl),
    Field(FieldDecl),
    Method(MethodDecl),
}

/// A named, line-numbered structural unit of a Java source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Simple name; a constructor carries its class name.
    pub name: String,
    /// `pkg.Outer.Inner` for types, `pkg.Type.member` for members.
    pub qualified_name: String,
    /// Qualified name of the enclosing type, `None` for top-level types.
    pub owner: Option<String>,
    pub modifiers: Modifiers,
    pub line: usize,
    /// Javadoc body text without tags; `None` when no Javadoc precedes the
    /// declaration, `Some("")` for a tags-only comment.
    pub comment: Option<String>,
    pub tags: Vec<Tag>,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn method(&self) -> Option<&MethodDecl> {
        match &self.kind {
            DeclKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Human-readable location used in log and issue messages,
    /// e.g. `pkg.Foo#bar(java.lang.String, int)`.
    pub fn display_name(&self) -> String {
        match &self.kind {
            DeclKind::Method(m) => {
                let owner = self.owner.as_deref().unwrap_or("");
                let params: Vec<String> = m.params.iter().map(|p| p.ty.signature()).collect();
                format!("{}#{}({})", owner, self.name, params.join(", "))
            }
            _ => self.qualified_name.clone(),
        }
    }
}
