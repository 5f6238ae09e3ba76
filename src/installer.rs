//! Replacement application engine: mirrors a template source tree into a
//! destination, substituting resolved variable values for recorded literal
//! originals in text files and copying everything else byte for byte.
//!
//! Substitution is exact literal substring replacement, applied in list
//! order over the whole file content. It is never pattern-based, so an
//! original like `a.b` can only ever match the three characters `a.b`.

use crate::error::{Error, Result};
use crate::model::{Replacement, DEFINITION_FILE, MATCH_ALL};
use crate::resolver::ResolvedValues;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Names excluded from the walk by exact match (not glob): the definition
/// file itself, dependency/vendor directories and version-control metadata.
pub const EXCLUDED_NAMES: [&str; 4] = [DEFINITION_FILE, "node_modules", "vendor", ".git"];

/// Extensions marking a file as text, eligible for substitution.
const TEXT_EXTENSIONS: [&str; 26] = [
    "html", "htm", "css", "scss", "sass", "less", "js", "jsx", "ts", "tsx", "mjs", "cjs",
    "json", "md", "markdown", "txt", "xml", "svg", "yml", "yaml", "toml", "vue", "svelte",
    "astro", "sh", "py",
];

/// Well-known dotted filenames treated as text despite having no extension.
const TEXT_FILENAMES: [&str; 2] = [".env", ".gitignore"];

/// Counts reported by a completed install walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallStats {
    /// Total files written into the destination.
    pub files_created: usize,
    /// Files whose content changed during substitution.
    pub files_changed: usize,
}

/// A replacement compiled against a resolved value and its file patterns.
struct CompiledReplacement<'a> {
    original: &'a str,
    value: &'a str,
    /// None means the catch-all: the replacement applies to every file.
    patterns: Option<GlobSet>,
}

impl CompiledReplacement<'_> {
    fn applies_to(&self, relative_path: &str) -> bool {
        match &self.patterns {
            Some(set) => set.is_match(relative_path),
            None => true,
        }
    }
}

fn is_excluded(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_NAMES.contains(&n))
}

/// Whether a file is classified as text, by extension allow-list plus a
/// couple of well-known dotted filenames. Everything else is binary.
pub fn is_text_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(OsStr::to_str) {
        if TEXT_FILENAMES.contains(&name) {
            return true;
        }
    }
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Compiles a pattern list. The catch-all default, an empty list and a list
/// whose every pattern is invalid all degrade to None (match everything),
/// so a replacement never silently loses its file-wide minimum contract.
fn compile_patterns(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() || patterns.iter().any(|p| p == MATCH_ALL) {
        return None;
    }
    let mut builder = GlobSetBuilder::new();
    let mut added = 0;
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
                added += 1;
            }
            Err(err) => warn!("ignoring invalid file pattern '{pattern}': {err}"),
        }
    }
    if added == 0 {
        return None;
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(err) => {
            warn!("failed to build pattern set, applying file-wide: {err}");
            None
        }
    }
}

fn compile_replacements<'a>(
    replacements: &'a [Replacement],
    values: &'a ResolvedValues,
) -> Vec<CompiledReplacement<'a>> {
    replacements
        .iter()
        .filter(|r| r.is_effective())
        .filter_map(|r| {
            let Some(value) = values.get(&r.variable) else {
                debug!("skipping replacement for unresolved variable '{}'", r.variable);
                return None;
            };
            Some(CompiledReplacement {
                original: &r.original,
                value,
                patterns: compile_patterns(&r.file_patterns),
            })
        })
        .collect()
}

/// Applies every matching replacement in list order over the content.
/// `str::replace` is a literal substring replace, so regex metacharacters
/// in the original have no special meaning.
fn apply_replacements(
    content: String,
    relative_path: &str,
    replacements: &[CompiledReplacement<'_>],
) -> String {
    let mut current = content;
    for replacement in replacements {
        if !replacement.applies_to(relative_path) {
            continue;
        }
        if current.contains(replacement.original) {
            current = current.replace(replacement.original, replacement.value);
        }
    }
    current
}

/// Mirrors the template tree into `output_dir`, substituting resolved values.
///
/// Fails before any write when the source is not a directory or the
/// destination exists without `force`. Any read or write failure during the
/// walk aborts the whole operation; a partial destination tree may remain on
/// disk but the install is reported as failed.
pub fn install(
    template_dir: &Path,
    output_dir: &Path,
    replacements: &[Replacement],
    values: &ResolvedValues,
    force: bool,
) -> Result<InstallStats> {
    if !template_dir.is_dir() {
        return Err(Error::InvalidTemplate { path: template_dir.display().to_string() });
    }
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExists {
            output_dir: output_dir.display().to_string(),
        });
    }

    let compiled = compile_replacements(replacements, values);
    let mut stats = InstallStats::default();

    let walker = WalkDir::new(template_dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(|err| Error::IoError(err.into()))?;
        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .expect("walk entries live under the template root");
        let target = output_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        let bytes = fs::read(entry.path())?;
        if is_text_file(entry.path()) {
            match String::from_utf8(bytes) {
                Ok(content) => {
                    let relative_str = relative.to_string_lossy();
                    let substituted =
                        apply_replacements(content.clone(), &relative_str, &compiled);
                    if substituted != content {
                        stats.files_changed += 1;
                    }
                    fs::write(&target, substituted)?;
                }
                Err(invalid) => {
                    // Text extension but not valid UTF-8: copy untouched.
                    debug!("copying non-UTF-8 file untouched: {}", relative.display());
                    fs::write(&target, invalid.into_bytes())?;
                }
            }
        } else {
            fs::write(&target, bytes)?;
        }
        stats.files_created += 1;
    }

    Ok(stats)
}
