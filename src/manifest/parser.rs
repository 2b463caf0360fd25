//! Tokenizer for the Puppetfile DSL.

use std::collections::{BTreeMap, HashSet};

use super::{Declaration, Manifest, VERSION_KEY};

const COMMENT_MARKER: char = '#';
const QUOTES: [char; 2] = ['\'', '"'];
const NAMESPACE_SEPARATORS: [char; 2] = ['-', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Mod,
    Forge,
    Moduledir,
}

impl Directive {
    const ALL: [(Self, &'static str); 3] =
        [(Self::Mod, "mod"), (Self::Forge, "forge"), (Self::Moduledir, "moduledir")];

    /// Match a directive keyword at the start of `line`, returning the
    /// directive and the rest of the line.
    fn strip_from(line: &str) -> Option<(Self, &str)> {
        let line = line.trim_start();
        Self::ALL.iter().find_map(|(directive, keyword)| {
            let rest = line.strip_prefix(keyword)?;
            let boundary = rest.chars().next().is_none_or(|c| c.is_whitespace() || c == '(');
            boundary.then_some((*directive, rest))
        })
    }
}

/// Parse Puppetfile text into a [`Manifest`].
#[must_use]
pub fn parse(text: &str) -> Manifest {
    let mut manifest = Manifest::default();
    let mut seen = HashSet::new();

    for (directive, body) in split_directives(text) {
        match directive {
            Directive::Forge => {
                manifest.forge = first_value(&body);
            }
            Directive::Moduledir => {
                manifest.moduledir = first_value(&body);
            }
            Directive::Mod => {
                let Some(declaration) = parse_declaration(&body) else {
                    tracing::debug!(target: "manifest", "Dropping mod entry without identifier: {}", body.trim());
                    continue;
                };
                if seen.insert(declaration.clone()) {
                    manifest.declarations.push(declaration);
                }
            }
        }
    }

    manifest
}

/// Parse Puppetfile text and return only the `mod` declarations.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    parse(text).declarations
}

/// Drop commented lines, then group the remaining lines into one chunk per
/// directive. Lines before the first directive belong to no chunk.
fn split_directives(text: &str) -> Vec<(Directive, String)> {
    let mut chunks: Vec<(Directive, String)> = Vec::new();

    for line in text.lines().filter(|line| !line.contains(COMMENT_MARKER)) {
        if let Some((directive, rest)) = Directive::strip_from(line) {
            chunks.push((directive, rest.to_string()));
        } else if let Some((_, body)) = chunks.last_mut() {
            body.push('\n');
            body.push_str(line);
        }
    }

    chunks.retain(|(_, body)| !body.trim().is_empty());
    chunks
}

fn parse_declaration(body: &str) -> Option<Declaration> {
    let body = strip_parens(body.trim());
    let mut tokens = split_top_level(body).into_iter();

    let identifier = strip_quotes(&tokens.next()?);
    let (namespace, name) = split_identifier(&identifier)?;

    let mut arguments = BTreeMap::new();
    for token in tokens {
        let token = strip_quotes(&token);
        if token.is_empty() {
            continue;
        }
        match split_association(&token) {
            Some((key, value)) => {
                arguments.insert(key, value);
            }
            None => {
                arguments.insert(VERSION_KEY.to_string(), token);
            }
        }
    }

    Some(Declaration {
        namespace,
        name,
        arguments,
    })
}

/// `mod('name', ...)` is valid Ruby; treat it like `mod 'name', ...`.
fn strip_parens(body: &str) -> &str {
    body.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .map_or(body, str::trim)
}

/// Split on commas that are not inside a quoted string.
fn split_top_level(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in body.chars() {
        match quote {
            Some(open) if c == open => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if QUOTES.contains(&c) => {
                quote = Some(c);
                current.push(c);
            }
            None if c == ',' => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            None => current.push(c),
        }
    }
    tokens.push(current.trim().to_string());

    tokens
}

fn strip_quotes(token: &str) -> String {
    token.replace(QUOTES, "").trim().to_string()
}

/// Split `namespace-name` / `namespace/name` at the first separator.
///
/// Identical halves (`foo-foo`) and one-sided splits carry no namespace.
fn split_identifier(identifier: &str) -> Option<(Option<String>, String)> {
    if identifier.is_empty() {
        return None;
    }

    let Some((first, second)) = identifier.split_once(NAMESPACE_SEPARATORS) else {
        return Some((None, identifier.to_string()));
    };

    match (first.is_empty(), second.is_empty()) {
        (true, true) => None,
        (true, false) => Some((None, second.to_string())),
        (false, true) => Some((None, first.to_string())),
        (false, false) if first == second => Some((None, second.to_string())),
        (false, false) => Some((Some(first.to_string()), second.to_string())),
    }
}

/// Split a `key => value` or `key: value` token.
///
/// Returns `None` unless both sides are non-empty, in which case the caller
/// stores the token as a bare version.
fn split_association(token: &str) -> Option<(String, String)> {
    let (key, value) = token.split_once("=>").or_else(|| split_symbol_key(token))?;
    let key = key.trim().trim_start_matches(':').to_lowercase();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value.to_string()))
}

/// Ruby 1.9 hash syntax (`git: url`). The key must be a bare word followed by
/// whitespace so that `https://host` or `git@host:path` never split.
fn split_symbol_key(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once(':')?;
    let bare_word = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (bare_word && value.starts_with(char::is_whitespace)).then_some((key, value))
}

fn first_value(body: &str) -> Option<String> {
    split_top_level(strip_parens(body.trim()))
        .first()
        .map(|token| strip_quotes(token))
        .filter(|value| !value.is_empty())
}
