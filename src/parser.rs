//! Definition file parsing: turns `template.stencil` text into a [`Template`].
//!
//! The parser is total: it never returns an error. Malformed lines degrade to
//! empty or default fields and unrecognized commands are skipped, so a binary
//! can always read definition files written by newer (or older) versions of
//! the format. Line position is threaded through parsing as an explicit
//! cursor value; no parser state survives a call.

use crate::model::{
    Group, InstallStep, Replacement, Template, VarType, Variable, MATCH_ALL,
};
use log::debug;

/// A single lexical token of a definition line.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Whitespace-delimited bare word.
    Word(String),
    /// Content between single or double quotes, kept verbatim including any
    /// backslash escapes.
    Quoted(String),
    /// Comma-separated items between `[` and `]`.
    Array(Vec<String>),
}

impl Token {
    fn word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }

    fn quoted(&self) -> Option<&str> {
        match self {
            Token::Quoted(q) => Some(q),
            _ => None,
        }
    }
}

/// Undoes generator escaping: `\\` becomes a backslash, `\n` a real newline
/// and an escaped quote a literal quote. Unknown escape sequences are kept
/// as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits one definition line into tokens.
///
/// Quoted strings honor backslash escaping, so an embedded escaped quote
/// does not terminate the literal early. The quoted content is returned
/// verbatim; callers decide whether to [`unescape`] it.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut content = String::new();
            let mut terminated = false;
            while let Some(inner) = chars.next() {
                if inner == '\\' {
                    content.push(inner);
                    if let Some(escaped) = chars.next() {
                        content.push(escaped);
                    }
                } else if inner == c {
                    terminated = true;
                    break;
                } else {
                    content.push(inner);
                }
            }
            if !terminated {
                debug!("unterminated quote in line: {line}");
            }
            tokens.push(Token::Quoted(content));
        } else if c == '[' {
            chars.next();
            let mut content = String::new();
            for inner in chars.by_ref() {
                if inner == ']' {
                    break;
                }
                content.push(inner);
            }
            let items = content
                .split(',')
                .map(|item| item.trim().trim_matches(|q| q == '"' || q == '\'').to_string())
                .filter(|item| !item.is_empty())
                .collect();
            tokens.push(Token::Array(items));
        } else {
            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                word.push(next);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    tokens
}

/// Parses definition text into a Template. Total; never fails.
pub fn parse(content: &str) -> Template {
    // Comment and blank lines carry no commands.
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let mut template = Template::default();
    let mut pos = 0;
    while pos < lines.len() {
        pos = parse_line(&mut template, &lines, pos);
    }
    template
}

/// Processes the line at `pos` and returns the position of the next
/// unconsumed line. Block commands consume more than one line.
fn parse_line(template: &mut Template, lines: &[&str], pos: usize) -> usize {
    let line = lines[pos];
    let tokens = tokenize(line);
    let Some(keyword) = tokens.first().and_then(Token::word) else {
        return pos + 1;
    };

    match keyword.to_ascii_uppercase().as_str() {
        "NAME" => template.name = rest_text(&tokens),
        "VERSION" => template.version = rest_text(&tokens),
        "AUTHOR" => template.author = rest_text(&tokens),
        "DESCRIPTION" => template.description = rest_text(&tokens),
        "FRAMEWORK" => {
            let framework = rest_text(&tokens);
            template.framework = (!framework.is_empty()).then_some(framework);
        }
        "REQUIRES" => {
            if let Some(Token::Array(items)) = tokens.iter().find(|t| matches!(t, Token::Array(_)))
            {
                template.requires = items.clone();
            }
        }
        "VAR" => {
            if let Some(variable) = parse_var(&tokens) {
                template.variables.push(variable);
            }
        }
        "ASK" => {
            if let Some(variable) = parse_ask(&tokens) {
                template.variables.push(variable);
            }
        }
        "GROUP" => {
            if let Some(group) = parse_group(&tokens) {
                template.groups.push(group);
            }
        }
        "REPLACE" => template.replacements.push(parse_replace(line)),
        "AI_HINT" => {
            let hint = rest_text(&tokens);
            if !hint.is_empty() {
                template.hints.push(hint);
            }
        }
        "ON" | "ON_INSTALL" => return parse_install_block(template, lines, pos + 1),
        other => debug!("ignoring unrecognized command '{other}'"),
    }

    pos + 1
}

/// Consumes the body of an ON/ON_INSTALL block up to its END line.
fn parse_install_block(template: &mut Template, lines: &[&str], mut pos: usize) -> usize {
    while pos < lines.len() {
        let line = lines[pos];
        if line.eq_ignore_ascii_case("END") {
            return pos + 1;
        }
        let tokens = tokenize(line);
        match tokens.first().and_then(Token::word).map(str::to_ascii_uppercase) {
            Some(keyword) if keyword == "RUN" => {
                let command = rest_text(&tokens);
                if !command.is_empty() {
                    template.install_steps.push(InstallStep { command });
                }
            }
            Some(keyword) if keyword == "REPLACE" => {
                template.replacements.push(parse_replace(line));
            }
            _ => {}
        }
        pos += 1;
    }
    // Unterminated block: everything up to end of input was consumed.
    pos
}

/// The free text after a command keyword: the first quoted token if present,
/// otherwise the remaining bare words joined by single spaces.
fn rest_text(tokens: &[Token]) -> String {
    if let Some(quoted) = tokens.iter().skip(1).find_map(Token::quoted) {
        return unescape(quoted);
    }
    tokens
        .iter()
        .skip(1)
        .filter_map(Token::word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `VAR <name> <TYPE> "<default>" [REQUIRED]`
fn parse_var(tokens: &[Token]) -> Option<Variable> {
    let name = match tokens.get(1)? {
        Token::Word(w) => w.clone(),
        Token::Quoted(q) => q.clone(),
        Token::Array(_) => return None,
    };
    if name.is_empty() {
        return None;
    }

    let mut variable = Variable { name, ..Variable::default() };
    for token in &tokens[2..] {
        match token {
            Token::Word(word) => {
                if word.eq_ignore_ascii_case("REQUIRED") {
                    variable.required = true;
                } else if let Some(var_type) = VarType::from_keyword(word) {
                    variable.var_type = var_type;
                }
                // Unrecognized type keywords leave the STRING default.
            }
            Token::Quoted(quoted) => {
                if variable.default.is_empty() {
                    variable.default = unescape(quoted);
                }
            }
            Token::Array(_) => {}
        }
    }
    Some(variable)
}

/// `ASK <name> "<question>" [DEFAULT "<value>"] [REQUIRED]`
///
/// The question text is parsed but not retained; the generator re-derives it
/// from the variable name. The type is inferred from the name.
fn parse_ask(tokens: &[Token]) -> Option<Variable> {
    let name = match tokens.get(1)? {
        Token::Word(w) => w.clone(),
        Token::Quoted(q) => q.clone(),
        Token::Array(_) => return None,
    };
    if name.is_empty() {
        return None;
    }

    let mut variable = Variable {
        var_type: VarType::infer_from_name(&name),
        name,
        ..Variable::default()
    };

    let mut index = 2;
    while index < tokens.len() {
        match &tokens[index] {
            Token::Word(word) if word.eq_ignore_ascii_case("DEFAULT") => {
                if let Some(quoted) = tokens.get(index + 1).and_then(Token::quoted) {
                    variable.default = unescape(quoted);
                    index += 1;
                }
            }
            Token::Word(word) if word.eq_ignore_ascii_case("REQUIRED") => {
                variable.required = true;
            }
            _ => {}
        }
        index += 1;
    }
    Some(variable)
}

/// `GROUP <name> [v1, v2, …]`
fn parse_group(tokens: &[Token]) -> Option<Group> {
    let name = match tokens.get(1)? {
        Token::Word(w) => w.clone(),
        Token::Quoted(q) => q.clone(),
        Token::Array(_) => return None,
    };
    if name.is_empty() {
        return None;
    }
    let variables = tokens
        .iter()
        .find_map(|t| match t {
            Token::Array(items) => Some(items.clone()),
            _ => None,
        })
        .unwrap_or_default();
    Some(Group { name, variables })
}

/// `REPLACE "<original>" WITH {{ <variable> }} IN "<pattern>" ["<pattern>" …]`
///
/// The original is scanned character by character honoring backslash escapes
/// so an embedded escaped quote does not end the literal early. Any format
/// deviation yields a no-op Replacement (empty original and variable) rather
/// than aborting the parse of subsequent lines.
pub fn parse_replace(line: &str) -> Replacement {
    let noop = Replacement::default();

    let rest = match strip_keyword(line, "REPLACE") {
        Some(rest) => rest.trim_start(),
        None => return noop,
    };

    let (raw_original, after_original) = match scan_quoted(rest) {
        Some(parts) => parts,
        None => {
            debug!("REPLACE without a quoted original: {line}");
            return noop;
        }
    };

    let after_with = match strip_keyword(after_original.trim_start(), "WITH") {
        Some(rest) => rest,
        None => {
            debug!("REPLACE without WITH keyword: {line}");
            return noop;
        }
    };

    let tokens = tokenize(after_with);
    let mut variable = String::new();
    let mut patterns = Vec::new();
    let mut in_patterns = false;
    for token in &tokens {
        match token {
            Token::Word(word) if word.eq_ignore_ascii_case("IN") && !in_patterns => {
                in_patterns = true;
            }
            Token::Word(word) if !in_patterns => {
                variable.push_str(word);
            }
            Token::Quoted(quoted) => {
                if in_patterns {
                    patterns.push(unescape(quoted));
                } else if variable.is_empty() {
                    // The variable reference tolerates surrounding quotes.
                    variable.push_str(quoted);
                }
            }
            _ => {}
        }
    }

    let variable = strip_braces(&variable);
    if variable.is_empty() {
        debug!("REPLACE without a variable reference: {line}");
        return noop;
    }
    if patterns.is_empty() {
        patterns.push(MATCH_ALL.to_string());
    }

    Replacement { original: unescape(&raw_original), variable, file_patterns: patterns }
}

/// Strips a case-insensitive leading keyword followed by whitespace or end
/// of input.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let text = text.trim_start();
    let prefix = text.get(..keyword.len())?;
    if !prefix.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Scans a leading quoted literal, honoring backslash escapes. Returns the
/// raw (still escaped) content and the remainder after the closing quote,
/// or None when the text does not start with a quote or the literal is
/// unterminated.
fn scan_quoted(text: &str) -> Option<(String, &str)> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }

    let mut content = String::new();
    let mut escaped = false;
    for (index, c) in chars {
        if escaped {
            content.push('\\');
            content.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some((content, &text[index + c.len_utf8()..]));
        } else {
            content.push(c);
        }
    }
    None
}

/// Removes `{{ }}` braces and surrounding quotes from a variable reference.
fn strip_braces(reference: &str) -> String {
    let trimmed = reference.trim().trim_matches(|c| c == '"' || c == '\'');
    let trimmed = trimmed.strip_prefix("{{").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("}}").unwrap_or(trimmed);
    trimmed.trim().to_string()
}
