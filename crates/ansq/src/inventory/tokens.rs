//! shell-like splitting of host lines
//!
//! `web1 ansible_host=10.0.0.1 motd="hello world" # primary` splits into
//! `["web1", "ansible_host=10.0.0.1", "motd=hello world"]`.
//!
//! - whitespace separates tokens
//! - `'...'` is taken literally
//! - `"..."` allows `\"`, `\\`, `\$` and `` \` `` escapes
//! - `\` outside quotes escapes the next character
//! - `#` at the start of a token comments out the rest of the line

/// A quote was opened but never closed
#[derive(Debug, PartialEq)]
pub(crate) struct UnterminatedQuote;

pub(crate) fn split(line: &str) -> Result<Vec<String>, UnterminatedQuote> {
    let mut tokens = vec![];
    let mut current: Option<String> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if let Some(token) = current.take() {
                    tokens.push(token);
                }
            }
            '#' if current.is_none() => break,
            '\'' => {
                let token = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => token.push(c),
                        None => return Err(UnterminatedQuote),
                    }
                }
            }
            '"' => {
                let token = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => token.push(c),
                            Some(c) => {
                                token.push('\\');
                                token.push(c);
                            }
                            None => return Err(UnterminatedQuote),
                        },
                        Some(c) => token.push(c),
                        None => return Err(UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                let token = current.get_or_insert_with(String::new);
                if let Some(c) = chars.next() {
                    token.push(c);
                }
            }
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(token) = current {
        tokens.push(token);
    }

    Ok(tokens)
}
