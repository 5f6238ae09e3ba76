//! Definition file generation: turns a [`Template`] into canonical
//! `template.stencil` text that round-trips through the parser.
//!
//! The escaping applied to quoted literals is the load-bearing contract of
//! the whole format: it must be the exact inverse of [`crate::parser::unescape`]
//! so that arbitrary originals (embedded quotes, backslashes, newlines)
//! survive a generate/parse cycle byte for byte.

use crate::model::{
    Candidate, Group, Replacement, Template, VarGroup, VarType, Variable, MATCH_ALL,
};

/// Maximum default-value length shown in a generated question comment.
/// Cosmetic only; REPLACE originals are never truncated.
const QUESTION_DEFAULT_CAP: usize = 40;

/// Escapes a literal for emission between double quotes: backslash first,
/// then quote, then newline. Exact inverse of parser unescaping.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Hand-authored question overrides for common variable names.
const QUESTION_OVERRIDES: [(&str, &str); 8] = [
    ("email", "What is your contact email?"),
    ("phone", "What is your phone number?"),
    ("address", "What is your street address?"),
    ("companyname", "What is your company called?"),
    ("sitename", "What is your site called?"),
    ("tagline", "What is your tagline?"),
    ("author", "Who is the author?"),
    ("copyright", "What copyright notice should be shown?"),
];

/// Splits a camelCase, snake_case or kebab-case name into lowercase words.
fn name_words(name: &str) -> String {
    let mut words = String::new();
    let mut previous_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            if !words.ends_with(' ') {
                words.push(' ');
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !words.ends_with(' ') {
            words.push(' ');
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        words.extend(c.to_lowercase());
    }
    words.trim().to_string()
}

/// Synthesizes the human-facing question for a variable from its name and
/// group. Cosmetic only: the question never affects round-trip of the
/// variable's identity, type, default or required flag.
pub fn synthesize_question(variable: &Variable, group: VarGroup) -> String {
    let key = variable.name.to_ascii_lowercase();
    if let Some((_, question)) = QUESTION_OVERRIDES.iter().find(|(name, _)| *name == key) {
        return (*question).to_string();
    }

    let words = name_words(&variable.name);
    match variable.var_type {
        VarType::Color => format!("Which color should be used for the {words}?"),
        VarType::Email => format!("What email address should be used for {words}?"),
        VarType::Phone => format!("What phone number should be used for {words}?"),
        VarType::Url => format!("What is the URL for {words}?"),
        VarType::Number => format!("What number should be used for {words}?"),
        VarType::Str => match group {
            VarGroup::Social => format!("What is your {words} link?"),
            VarGroup::Legal => format!("What should the {words} say?"),
            _ => format!("What is your {words}?"),
        },
    }
}

/// Synthesizes a progress message for a post-install command from simple
/// substring matches against common setup commands.
pub fn progress_message(command: &str) -> String {
    let lowered = command.to_lowercase();
    if lowered.contains("npm install")
        || lowered.contains("npm ci")
        || lowered.contains("yarn")
        || lowered.contains("pnpm install")
        || lowered.contains("pip install")
        || lowered.contains("bundle install")
        || lowered.contains("composer install")
    {
        "Installing dependencies".to_string()
    } else if lowered.contains("git init") {
        "Initializing git repository".to_string()
    } else if lowered.contains("build") {
        "Building the project".to_string()
    } else if lowered.contains("test") {
        "Running tests".to_string()
    } else {
        format!("Running {command}...")
    }
}

/// Renders a Template as canonical definition text.
pub fn generate(template: &Template) -> String {
    let mut out = String::new();
    out.push_str("# Template definition generated by stencil.\n");
    out.push_str("# REPLACE originals must match source files exactly; edit with care.\n\n");

    if !template.name.is_empty() {
        out.push_str(&format!("NAME \"{}\"\n", escape(&template.name)));
    }
    if !template.version.is_empty() {
        out.push_str(&format!("VERSION \"{}\"\n", escape(&template.version)));
    }
    if !template.author.is_empty() {
        out.push_str(&format!("AUTHOR \"{}\"\n", escape(&template.author)));
    }
    if !template.description.is_empty() {
        out.push_str(&format!("DESCRIPTION \"{}\"\n", escape(&template.description)));
    }
    if let Some(framework) = &template.framework {
        out.push_str(&format!("FRAMEWORK \"{}\"\n", escape(framework)));
    }
    if !template.requires.is_empty() {
        out.push_str(&format!("REQUIRES [{}]\n", template.requires.join(", ")));
    }

    let variables = template.unique_variables();
    for bucket in VarGroup::CANONICAL_ORDER {
        let members: Vec<&Variable> = variables
            .iter()
            .filter(|v| template.group_of(&v.name) == bucket)
            .copied()
            .collect();
        if members.is_empty() {
            continue;
        }

        out.push_str(&format!("\n# --- {} ---\n", bucket.as_str()));
        for variable in &members {
            out.push_str(&format!(
                "# {}{}\n",
                synthesize_question(variable, bucket),
                question_default_suffix(&variable.default),
            ));
            out.push_str(&format!(
                "VAR {} {} \"{}\"{}\n",
                variable.name,
                variable.var_type.keyword(),
                escape(&variable.default),
                if variable.required { " REQUIRED" } else { "" },
            ));
        }
        let names: Vec<&str> = members.iter().map(|v| v.name.as_str()).collect();
        out.push_str(&format!("GROUP {} [{}]\n", bucket.as_str(), names.join(", ")));
    }

    let effective: Vec<&Replacement> =
        template.replacements.iter().filter(|r| r.is_effective()).collect();
    if !effective.is_empty() {
        out.push('\n');
        for replacement in effective {
            // Originals are emitted in full; truncating one would break
            // matchability against source files.
            out.push_str(&format!(
                "REPLACE \"{}\" WITH {{{{ {} }}}}{}\n",
                escape(&replacement.original),
                replacement.variable,
                pattern_suffix(&replacement.file_patterns),
            ));
        }
    }

    for hint in &template.hints {
        out.push_str(&format!("AI_HINT \"{}\"\n", escape(hint)));
    }

    if !template.install_steps.is_empty() {
        out.push_str("\nON_INSTALL\n");
        for step in &template.install_steps {
            out.push_str(&format!("  # {}\n", progress_message(&step.command)));
            out.push_str(&format!("  RUN \"{}\"\n", escape(&step.command)));
        }
        out.push_str("END\n");
    }

    out
}

fn question_default_suffix(default: &str) -> String {
    if default.is_empty() {
        return String::new();
    }
    let shown: String = default.chars().take(QUESTION_DEFAULT_CAP).collect();
    if shown.len() < default.len() {
        format!(" (default: {}...)", escape(&shown))
    } else {
        format!(" (default: {})", escape(default))
    }
}

fn pattern_suffix(patterns: &[String]) -> String {
    if patterns.is_empty() || (patterns.len() == 1 && patterns[0] == MATCH_ALL) {
        return String::new();
    }
    let quoted: Vec<String> = patterns.iter().map(|p| format!("\"{}\"", escape(p))).collect();
    format!(" IN {}", quoted.join(" "))
}

/// Builds a Template from extraction candidates.
///
/// Candidates with an empty value or name are discarded; duplicate suggested
/// names keep their first occurrence. Each kept candidate contributes one
/// Variable and one catch-all Replacement, and group labels are collected in
/// encounter order.
pub fn template_from_candidates(base: Template, candidates: &[Candidate]) -> Template {
    let mut template = base;

    for candidate in candidates {
        if candidate.value.is_empty() || candidate.suggested_name.is_empty() {
            continue;
        }
        if template.variable(&candidate.suggested_name).is_some() {
            continue;
        }

        template.variables.push(Variable {
            name: candidate.suggested_name.clone(),
            var_type: candidate.var_type,
            default: candidate.value.clone(),
            required: false,
            description: None,
        });
        template.replacements.push(Replacement {
            original: candidate.value.clone(),
            variable: candidate.suggested_name.clone(),
            file_patterns: vec![MATCH_ALL.to_string()],
        });

        let group_name = VarGroup::from_name(&candidate.group).as_str();
        match template.groups.iter_mut().find(|g| g.name == group_name) {
            Some(group) => group.variables.push(candidate.suggested_name.clone()),
            None => template.groups.push(Group {
                name: group_name.to_string(),
                variables: vec![candidate.suggested_name.clone()],
            }),
        }
    }

    template
}
