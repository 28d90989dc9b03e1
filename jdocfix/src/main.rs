//! jdocfix: add missing Javadoc and repair stale tags in Java sources.
//!
//! Files are fixed in place unless `-o` names an output directory:
//!
//! - `jdocfix src/main/java`
//! - `jdocfix --level public --fix-tags param,return,throws 'src/**/*.java'`
//! - `jdocfix --check src` exits non-zero when a file would change

mod front;
mod oracle;

use anyhow::{Context, Result};
use clap::Parser;
use jdocfix_core::{
    process_declarations_in_file, FixConfig, FixTags, IndentStyle, InheritMatch, Oracles, Visibility,
};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::oracle::clirr::ClirrReport;
use crate::oracle::types::{add_sources, FileResolver, TypeIndex};

#[derive(Parser)]
#[command(name = "jdocfix", about = "Add missing Javadoc comments and fix incomplete tags in Java sources")]
struct Cli {
    /// Input files, directories (searched recursively) or glob patterns.
    #[arg(required = true)]
    files: Vec<String>,

    /// Tags to fix: all, or a comma list of author,version,since,param,return,throws,link
    #[arg(long, default_value = "all")]
    fix_tags: String,

    /// Lowest visibility to document: public, protected, package or private
    #[arg(long, default_value = "protected")]
    level: String,

    /// Text for a new @author tag. Defaults to $USER.
    #[arg(long)]
    default_author: Option<String>,

    /// Text for a new @version tag
    #[arg(long, default_value = "$Id: $")]
    default_version: String,

    /// Text for a new @since tag; a -SNAPSHOT suffix is dropped
    #[arg(long, default_value = "1.0")]
    default_since: String,

    /// Leave class, interface and enum comments alone
    #[arg(long)]
    no_class_comment: bool,

    /// Leave field comments alone
    #[arg(long)]
    no_field_comment: bool,

    /// Leave method and constructor comments alone
    #[arg(long)]
    no_method_comment: bool,

    /// Drop @throws tags naming classes that cannot be resolved
    #[arg(long)]
    remove_unknown_throws: bool,

    /// How an inherited method is recognized: all (every parameter type) or last
    #[arg(long, default_value = "all")]
    inherit_match: String,

    /// Comment indentation: detect, a number of spaces per nesting level, or tab
    #[arg(long, default_value = "detect")]
    indent: String,

    /// Clirr text report; @since is only added to types and methods it lists as new
    #[arg(long)]
    api_diff: Option<PathBuf>,

    /// Extra JSON type index (repeatable)
    #[arg(long)]
    type_index: Vec<PathBuf>,

    /// Skip inputs matching this glob (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Write fixed files under this directory instead of in place
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Like --dry-run, and exit with status 1 when any file would change
    #[arg(long)]
    check: bool,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli);
    let inputs = expand_inputs(&cli.files, &cli.exclude)?;

    let mut index = TypeIndex::jdk()?;
    for path in &cli.type_index {
        index.merge(TypeIndex::from_file(path)?);
    }
    let api_diff = load_api_diff(cli.api_diff.as_deref())?;

    // First pass: parse everything so the type index knows every source type.
    let mut failed = 0;
    let mut sources = Vec::new();
    for path in &inputs {
        let content = match fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("warning: skipping {}: {:#}", path.display(), e);
                failed += 1;
                continue;
            }
        };
        match front::parse_file(path, &content) {
            Ok(java) => sources.push((path, content, java)),
            Err(e) => {
                eprintln!("warning: skipping {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }
    add_sources(&mut index, sources.iter().map(|(_, _, j)| (&j.scope, j.shapes.as_slice())));
    tracing::debug!("type index holds {} classes", index.len());

    // Second pass: fix each file against the complete index.
    let mut changed = 0;
    for (path, content, java) in &mut sources {
        let resolver = FileResolver::new(&index, &java.scope);
        front::java::qualify_declarations(&mut java.declarations, &resolver);
        let mut oracles = Oracles::new(&resolver);
        if let Some(diff) = &api_diff {
            oracles = oracles.with_api_diff(diff);
        }

        let outcome = match process_declarations_in_file(content, &java.declarations, &config, &oracles) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("warning: skipping {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };
        if !outcome.changed {
            tracing::debug!("no changes to {}", path.display());
            continue;
        }
        changed += 1;
        for name in &outcome.fixed {
            tracing::debug!("{}: fixed {}", path.display(), name);
        }

        if cli.dry_run || cli.check {
            println!("would fix {}", path.display());
            continue;
        }
        let target = match &cli.output {
            Some(dir) => dir.join(relative_output(path)),
            None => path.to_path_buf(),
        };
        if let Err(e) = write_file(&target, &outcome.text) {
            eprintln!("warning: skipping {}: {:#}", path.display(), e);
            failed += 1;
            continue;
        }
        tracing::info!("saving changes to {}", target.display());
    }

    println!("{} file(s) scanned, {} changed, {} failed", inputs.len(), changed, failed);

    if !inputs.is_empty() && failed == inputs.len() {
        return Ok(ExitCode::FAILURE);
    }
    if cli.check && changed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Log to stderr; RUST_LOG wins over the -v count.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> FixConfig {
    let (fix_tags, rejected) = FixTags::parse(&cli.fix_tags);
    for entry in rejected {
        tracing::warn!("unrecognized --fix-tags entry '{}' ignored", entry);
    }
    let level = Visibility::from_level(&cli.level).unwrap_or_else(|| {
        tracing::warn!("unrecognized --level '{}', using protected", cli.level);
        Visibility::Protected
    });
    let inherit_match = match cli.inherit_match.as_str() {
        "all" => InheritMatch::AllParameters,
        "last" => InheritMatch::LastParameterOnly,
        other => {
            tracing::warn!("unrecognized --inherit-match '{}', using all", other);
            InheritMatch::AllParameters
        }
    };
    let default_author = cli
        .default_author
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_default();

    FixConfig {
        fix_tags,
        level,
        default_author,
        default_version: cli.default_version.clone(),
        fix_class_comment: !cli.no_class_comment,
        fix_field_comment: !cli.no_field_comment,
        fix_method_comment: !cli.no_method_comment,
        remove_unknown_throws: cli.remove_unknown_throws,
        inherit_match,
        indent: parse_indent(&cli.indent),
        ..FixConfig::default()
    }
    .with_since(&cli.default_since)
}

fn parse_indent(spec: &str) -> IndentStyle {
    match spec {
        "detect" => IndentStyle::Detect,
        "tab" => IndentStyle::Unit("\t".to_string()),
        n => match n.parse::<usize>() {
            Ok(width) if width > 0 => IndentStyle::Unit(" ".repeat(width)),
            _ => {
                tracing::warn!("unrecognized --indent '{}', detecting from source", spec);
                IndentStyle::Detect
            }
        },
    }
}

/// A missing report disables API-diff gating rather than failing the run.
fn load_api_diff(path: Option<&Path>) -> Result<Option<ClirrReport>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.is_file() {
        tracing::info!("no Clirr report at {}, API diff ignored", path.display());
        return Ok(None);
    }
    let report = ClirrReport::from_file(path)?;
    if report.is_empty() {
        tracing::info!("Clirr report {} lists no new classes or methods", path.display());
    }
    Ok(Some(report))
}

/// Expand files, directories and glob patterns into `.java` paths, minus
/// anything matching an `--exclude` glob.
fn expand_inputs(patterns: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let excludes = excludes
        .iter()
        .map(|e| glob::Pattern::new(e).with_context(|| format!("invalid exclude pattern: {}", e)))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let pattern = if path.is_dir() {
            format!("{}/**/*.java", pattern.trim_end_matches('/'))
        } else {
            pattern.clone()
        };
        let matches: Vec<_> = glob::glob(&pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    files.retain(|f| !excludes.iter().any(|e| e.matches_path(f)));
    files.sort();
    files.dedup();
    Ok(files)
}

/// Path of an input below the output directory: root, `.` and `..`
/// components are dropped. "src/p/A.java" → "src/p/A.java", "/tmp/A.java" → "tmp/A.java"
fn relative_output(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

fn write_file(target: &Path, text: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(target, text).with_context(|| format!("failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_drops_root_and_dots() {
        assert_eq!(relative_output(Path::new("src/p/A.java")), PathBuf::from("src/p/A.java"));
        assert_eq!(relative_output(Path::new("./src/A.java")), PathBuf::from("src/A.java"));
        assert_eq!(relative_output(Path::new("/tmp/x/A.java")), PathBuf::from("tmp/x/A.java"));
        assert_eq!(relative_output(Path::new("../A.java")), PathBuf::from("A.java"));
    }

    #[test]
    fn indent_specs() {
        assert_eq!(parse_indent("detect"), IndentStyle::Detect);
        assert_eq!(parse_indent("tab"), IndentStyle::Unit("\t".into()));
        assert_eq!(parse_indent("2"), IndentStyle::Unit("  ".into()));
        assert_eq!(parse_indent("0"), IndentStyle::Detect);
        assert_eq!(parse_indent("wide"), IndentStyle::Detect);
    }

    #[test]
    fn config_from_flags() {
        let cli = Cli::parse_from([
            "jdocfix",
            "--fix-tags",
            "param,bogus",
            "--level",
            "secret",
            "--default-author",
            "jane",
            "--default-since",
            "2.1-SNAPSHOT",
            "--no-field-comment",
            "--inherit-match",
            "last",
            "A.java",
        ]);
        let config = build_config(&cli);
        assert_eq!(config.fix_tags, FixTags::Only(vec![jdocfix_core::TagKind::Param]));
        assert_eq!(config.level, Visibility::Protected);
        assert_eq!(config.default_author, "jane");
        assert_eq!(config.default_since, "2.1");
        assert!(!config.fix_field_comment);
        assert!(config.fix_method_comment);
        assert_eq!(config.inherit_match, InheritMatch::LastParameterOnly);
    }
}
