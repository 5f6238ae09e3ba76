//! Core entities of the template model: the Template itself, its variables,
//! groups, replacements and install steps, plus the data contracts exchanged
//! with the scanner and extraction collaborators.
//!
//! A Template is built once (by the generator from extraction candidates, or
//! by the parser from definition text), consumed once by variable resolution
//! and the replacement engine, then discarded. Nothing here is mutated
//! mid-install.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reserved definition file name inside a template directory.
pub const DEFINITION_FILE: &str = "template.stencil";

/// Variable value types recognized by the definition language.
///
/// Unknown type keywords in a definition file fall back to `Str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum VarType {
    #[default]
    Str,
    Color,
    Email,
    Phone,
    Url,
    Number,
}

impl VarType {
    /// Parses a type keyword from a `VAR` line, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "STRING" => Some(VarType::Str),
            "COLOR" => Some(VarType::Color),
            "EMAIL" => Some(VarType::Email),
            "PHONE" => Some(VarType::Phone),
            "URL" => Some(VarType::Url),
            "NUMBER" => Some(VarType::Number),
            _ => None,
        }
    }

    /// Infers a type from a variable name, used by `ASK` lines which carry
    /// no explicit type keyword.
    pub fn infer_from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("color") {
            VarType::Color
        } else if name.contains("email") {
            VarType::Email
        } else if name.contains("phone") {
            VarType::Phone
        } else if name.contains("url") {
            VarType::Url
        } else {
            VarType::Str
        }
    }

    /// The keyword emitted into definition files.
    pub fn keyword(&self) -> &'static str {
        match self {
            VarType::Str => "STRING",
            VarType::Color => "COLOR",
            VarType::Email => "EMAIL",
            VarType::Phone => "PHONE",
            VarType::Url => "URL",
            VarType::Number => "NUMBER",
        }
    }
}

/// Canonical, ordered set of known variable groups.
///
/// Free-form group names from definition files and extraction candidates are
/// resolved onto this enum; anything unrecognized lands in `Other`. The
/// declaration order here is the canonical ordering used by the generator
/// and by variable resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarGroup {
    Branding,
    Colors,
    Contact,
    Content,
    Social,
    Institution,
    Legal,
    Maps,
    Config,
    Other,
}

impl VarGroup {
    /// All groups in canonical order.
    pub const CANONICAL_ORDER: [VarGroup; 10] = [
        VarGroup::Branding,
        VarGroup::Colors,
        VarGroup::Contact,
        VarGroup::Content,
        VarGroup::Social,
        VarGroup::Institution,
        VarGroup::Legal,
        VarGroup::Maps,
        VarGroup::Config,
        VarGroup::Other,
    ];

    /// Resolves a free-form group name onto the canonical set.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "branding" => VarGroup::Branding,
            "colors" => VarGroup::Colors,
            "contact" => VarGroup::Contact,
            "content" => VarGroup::Content,
            "social" => VarGroup::Social,
            "institution" => VarGroup::Institution,
            "legal" => VarGroup::Legal,
            "maps" => VarGroup::Maps,
            "config" => VarGroup::Config,
            _ => VarGroup::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VarGroup::Branding => "branding",
            VarGroup::Colors => "colors",
            VarGroup::Contact => "contact",
            VarGroup::Content => "content",
            VarGroup::Social => "social",
            VarGroup::Institution => "institution",
            VarGroup::Legal => "legal",
            VarGroup::Maps => "maps",
            VarGroup::Config => "config",
            VarGroup::Other => "other",
        }
    }
}

/// A single template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Variable {
    /// Unique key within a Template. Must be non-empty; duplicates collapse
    /// to the first occurrence when rendering or resolving.
    pub name: String,
    pub var_type: VarType,
    /// Default value, substituted when no answer is given.
    pub default: String,
    pub required: bool,
    pub description: Option<String>,
}

/// A display and ordering bucket for variables.
///
/// Groups only affect prompt order and generated sections; they never scope
/// where a replacement is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Group {
    pub name: String,
    pub variables: Vec<String>,
}

/// Catch-all file pattern applied when a REPLACE line names none.
pub const MATCH_ALL: &str = "**/*";

/// A binding from one exact literal substring to one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    /// Exact literal text to find. May span multiple lines. An empty
    /// original makes the replacement a no-op.
    pub original: String,
    /// Name of the variable whose resolved value is substituted in.
    pub variable: String,
    /// Glob patterns limiting which files the replacement applies to.
    pub file_patterns: Vec<String>,
}

impl Default for Replacement {
    fn default() -> Self {
        Replacement {
            original: String::new(),
            variable: String::new(),
            file_patterns: vec![MATCH_ALL.to_string()],
        }
    }
}

impl Replacement {
    /// A replacement with an empty original or variable has no effect.
    pub fn is_effective(&self) -> bool {
        !self.original.is_empty() && !self.variable.is_empty()
    }
}

/// A conditional block of replacements gated on a variable.
///
/// Present in the model as an extension point only: the current parser,
/// generator and replacement engine neither populate nor consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Conditional {
    pub variable: String,
    pub replacements: Vec<Replacement>,
}

/// A shell command executed in the destination tree after installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InstallStep {
    pub command: String,
}

/// A complete template definition. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Template {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub framework: Option<String>,
    /// External packages the generated project depends on.
    pub requires: Vec<String>,
    pub variables: Vec<Variable>,
    pub groups: Vec<Group>,
    pub replacements: Vec<Replacement>,
    pub conditionals: Vec<Conditional>,
    pub install_steps: Vec<InstallStep>,
    /// Free-text hints recorded by the extraction collaborator.
    pub hints: Vec<String>,
}

impl Template {
    /// Returns variables deduplicated by name, keeping the first occurrence
    /// of each and skipping unnamed entries.
    pub fn unique_variables(&self) -> Vec<&Variable> {
        let mut seen = Vec::new();
        let mut result = Vec::new();
        for variable in &self.variables {
            if variable.name.is_empty() || seen.contains(&variable.name.as_str()) {
                continue;
            }
            seen.push(variable.name.as_str());
            result.push(variable);
        }
        result
    }

    /// Looks up a variable by name (first occurrence wins).
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Canonical group of a variable, determined by the first declared group
    /// listing it. Ungrouped variables fall into `Other`.
    pub fn group_of(&self, variable_name: &str) -> VarGroup {
        self.groups
            .iter()
            .find(|g| g.variables.iter().any(|v| v == variable_name))
            .map(|g| VarGroup::from_name(&g.name))
            .unwrap_or(VarGroup::Other)
    }
}

/// Content of a scanned source file, as reported by the scanner collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileContent {
    Text(String),
    Binary,
    Oversized,
}

/// One entry of the scanner collaborator's file listing. Treated as an
/// opaque input; the core never walks the filesystem to produce these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedFile {
    pub relative_path: String,
    pub extension: String,
    pub size: u64,
    pub content: FileContent,
}

/// One candidate produced by the extraction collaborator: a literal value
/// found in the codebase together with a suggested variable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The literal text to parameterize. Candidates with an empty value
    /// are discarded.
    pub value: String,
    /// Becomes the variable's name.
    pub suggested_name: String,
    pub var_type: VarType,
    /// Free-form group label, resolved via [`VarGroup::from_name`].
    pub group: String,
}

/// Outcome of one install invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallResult {
    pub success: bool,
    pub output_path: PathBuf,
    /// Total files written into the destination tree.
    pub files_created: usize,
    /// Files whose content actually changed during substitution.
    pub replacements_applied: usize,
    /// Non-fatal warnings, e.g. a failed post-install command.
    pub errors: Vec<String>,
}
