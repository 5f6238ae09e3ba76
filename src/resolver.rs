//! Variable resolution: collects a value for every template variable, via
//! pre-supplied answers, interactive prompting or declared defaults, with
//! per-type validation of interactively entered values.
//!
//! Resolution order is deterministic: grouped variables in canonical group
//! order first, then any ungrouped variables in declaration order.
//! Cancellation at any prompt terminates resolution with no partial map.

use crate::error::{Error, Result};
use crate::generator::synthesize_question;
use crate::model::{Template, VarGroup, VarType, Variable};
use crate::prompt::Prompter;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Resolved variable values in resolution order.
pub type ResolvedValues = IndexMap<String, String>;

/// Parses a pre-supplied answers payload: a JSON object whose values are
/// taken as strings (non-string scalars are stringified).
pub fn answers_from_json(raw: &str) -> Result<ResolvedValues> {
    if raw.trim().is_empty() {
        return Ok(ResolvedValues::new());
    }
    let parsed: IndexMap<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(parsed
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

/// Deduplicated variables in resolution order: canonical group buckets
/// first (members in listed order), then ungrouped variables in declaration
/// order. A variable listed in several groups is visited once.
pub fn ordered_variables(template: &Template) -> Vec<&Variable> {
    let unique = template.unique_variables();
    let mut seen: Vec<&str> = Vec::new();
    let mut ordered = Vec::new();

    for bucket in VarGroup::CANONICAL_ORDER {
        for group in &template.groups {
            if VarGroup::from_name(&group.name) != bucket {
                continue;
            }
            for name in &group.variables {
                if seen.contains(&name.as_str()) {
                    continue;
                }
                if let Some(variable) = unique.iter().find(|v| &v.name == name) {
                    seen.push(name.as_str());
                    ordered.push(*variable);
                }
            }
        }
    }

    for variable in unique {
        if !seen.contains(&variable.name.as_str()) {
            seen.push(variable.name.as_str());
            ordered.push(variable);
        }
    }

    ordered
}

/// Resolves all template variables.
///
/// Pre-supplied values are trusted verbatim: no prompt, no validation. In
/// defaults mode every remaining variable takes its declared default, and a
/// required variable with an empty default is a validation error. Otherwise
/// each variable is prompted for, re-prompting on invalid input.
///
/// Returns `Ok(None)` when the user cancels a prompt; no partial map leaks
/// out and no filesystem has been touched yet at that point.
pub fn resolve(
    template: &Template,
    presupplied: &ResolvedValues,
    prompter: &dyn Prompter,
    use_defaults: bool,
) -> Result<Option<ResolvedValues>> {
    let mut values = ResolvedValues::new();

    for variable in ordered_variables(template) {
        if let Some(value) = presupplied.get(&variable.name) {
            debug!("using pre-supplied value for '{}'", variable.name);
            values.insert(variable.name.clone(), value.clone());
            continue;
        }

        if use_defaults {
            if variable.required && variable.default.is_empty() {
                return Err(Error::ValidationError(format!(
                    "variable '{}' is required but has no default value",
                    variable.name
                )));
            }
            values.insert(variable.name.clone(), variable.default.clone());
            continue;
        }

        let question = synthesize_question(variable, template.group_of(&variable.name));
        loop {
            let Some(answer) = prompter.input(&question, &variable.default)? else {
                return Ok(None);
            };
            let answer = if answer.is_empty() { variable.default.clone() } else { answer };
            match validate(variable, &answer) {
                Ok(()) => {
                    values.insert(variable.name.clone(), answer);
                    break;
                }
                Err(err) => eprintln!("{err}"),
            }
        }
    }

    Ok(Some(values))
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Validates an interactively supplied value against the variable's type.
/// Pre-supplied values never pass through here.
pub fn validate(variable: &Variable, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        if variable.required {
            return Err(Error::ValidationError(format!(
                "a value for '{}' is required",
                variable.name
            )));
        }
        return Ok(());
    }

    match variable.var_type {
        VarType::Str => Ok(()),
        VarType::Email => {
            if email_regex().is_match(value) {
                Ok(())
            } else {
                Err(Error::ValidationError(format!(
                    "'{value}' is not a valid email address"
                )))
            }
        }
        VarType::Color => {
            let digits = value.strip_prefix('#').unwrap_or("");
            if (digits.len() == 3 || digits.len() == 6)
                && digits.chars().all(|c| c.is_ascii_hexdigit())
            {
                Ok(())
            } else {
                Err(Error::ValidationError(format!(
                    "'{value}' is not a hex color like #fff or #a1b2c3"
                )))
            }
        }
        VarType::Phone => {
            if value.chars().all(|c| c.is_ascii_digit() || " -+()".contains(c)) {
                Ok(())
            } else {
                Err(Error::ValidationError(format!(
                    "'{value}' is not a valid phone number"
                )))
            }
        }
        VarType::Url => {
            // "#" is a common placeholder href and accepted as-is.
            if value == "#" || Url::parse(value).is_ok() {
                Ok(())
            } else {
                Err(Error::ValidationError(format!("'{value}' is not a valid URL")))
            }
        }
        VarType::Number => {
            if value.trim().parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err(Error::ValidationError(format!("'{value}' is not a number")))
            }
        }
    }
}
