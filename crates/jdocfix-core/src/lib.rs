//! Javadoc fixing engine.
//!
//! Given the text of a Java source file and the declarations a front end
//! found in it, [`process_declarations_in_file`] rewrites or inserts the
//! Javadoc comment of every in-scope type, field and method so that it
//! documents the current signature: missing `@param`, `@return`, `@throws`
//! tags are added, stale ones removed, inherited documentation collapsed to
//! `{@inheritDoc}`. Everything outside comments is left byte for byte.

pub mod assemble;
pub mod config;
pub mod defaults;
pub mod doc;
pub mod error;
pub mod inherit;
pub mod links;
pub mod model;
pub mod oracle;
pub mod process;
pub mod reconcile;
pub mod region;
pub mod tags;

pub use config::{FixConfig, FixTags, IndentStyle, InheritMatch, TagKind};
pub use error::{FixError, Issue};
pub use model::{
    DeclKind, Declaration, FieldDecl, MethodDecl, Modifiers, Param, Tag, TypeDecl, TypeKind, TypeRef, Visibility,
};
pub use oracle::{ApiDiff, MethodSig, MethodSignature, NoTypes, Oracles, ResolvedClass, TypeResolver};
pub use process::{process_declarations_in_file, FileOutcome};
