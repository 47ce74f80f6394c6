//! INI inventory grammar
//!
//! ```ini
//! # hosts before the first section are ungrouped
//! jumphost ansible_host=203.0.113.7
//!
//! [web]
//! web[01:03].example.com http_port=8080
//! db.example.com:2222
//!
//! [web:children]
//! nginx
//!
//! [web:vars]
//! ntp_server=ntp.example.com
//! ```
//!
//! Section kinds are `hosts` (the default), `children` and `vars`. Lines starting with `#` or
//! `;` are comments.
use super::{pattern, tokens, GroupId, Inventory, UNGROUPED};
use crate::value::Value;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InventoryError {
    #[error("line {line}: invalid section entry {text:?}")]
    InvalidSection { line: usize, text: String },
    #[error("line {line}: section [{group}:{kind}] has unknown type {kind:?}")]
    UnknownSectionType {
        line: usize,
        group: String,
        kind: String,
    },
    #[error("line {line}: invalid group name {text:?}")]
    InvalidGroupName { line: usize, text: String },
    #[error("line {line}: expected key=value, found {text:?}")]
    ExpectedKeyValue { line: usize, text: String },
    #[error("line {line}: {message}")]
    InvalidHostPattern { line: usize, message: String },
    #[error("line {line}: invalid port {port:?}")]
    InvalidPort { line: usize, port: String },
    #[error("line {line}: no closing quotation")]
    UnterminatedQuote { line: usize },
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Hosts(GroupId),
    Children(GroupId),
    Vars(GroupId),
}

pub(super) fn parse(source: &str) -> Result<Inventory, InventoryError> {
    let mut inventory = Inventory::default();
    let mut section = Section::Hosts(UNGROUPED);

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();

        if text.is_empty() || text.starts_with('#') || text.starts_with(';') {
            continue;
        }

        if let Some(header) = header(text, line) {
            let (name, kind) = header?;
            let group = inventory.get_or_insert_group(name);
            section = match kind {
                None | Some("hosts") => Section::Hosts(group),
                Some("children") => Section::Children(group),
                Some("vars") => Section::Vars(group),
                Some(kind) => {
                    return Err(InventoryError::UnknownSectionType {
                        line,
                        group: name.to_string(),
                        kind: kind.to_string(),
                    })
                }
            };
            tracing::trace!(line, ?section, "section");
            continue;
        }

        match section {
            Section::Hosts(group) => host_line(&mut inventory, group, text, line)?,
            Section::Children(group) => {
                let child = child_line(text, line)?;
                let child = inventory.get_or_insert_group(&child);
                inventory.add_child(group, child);
            }
            Section::Vars(group) => {
                let (key, value) = var_line(text, line)?;
                inventory.groups[group].vars.insert(key, value);
            }
        }
    }

    inventory.reconcile();
    Ok(inventory)
}

/// Recognizes `[name]`, `[name:kind]`, optionally followed by a comment
///
/// Lines that start with `[` but do not close the bracket at the end are host lines.
fn header(text: &str, line: usize) -> Option<Result<(&str, Option<&str>), InventoryError>> {
    let inner = text.strip_prefix('[')?;
    let close = inner.find(']')?;

    let rest = inner[close + 1..].trim_start();
    if !rest.is_empty() && !rest.starts_with('#') && !rest.starts_with(';') {
        return None;
    }

    let inner = &inner[..close];
    let (name, kind) = match inner.split_once(':') {
        Some((name, kind)) => (name, Some(kind)),
        None => (inner, None),
    };

    let invalid = name.is_empty()
        || name.contains(char::is_whitespace)
        || kind.is_some_and(|kind| kind.is_empty() || kind.contains(':'));

    if invalid {
        return Some(Err(InventoryError::InvalidSection {
            line,
            text: text.to_string(),
        }));
    }

    Some(Ok((name, kind)))
}

fn host_line(
    inventory: &mut Inventory,
    group: GroupId,
    text: &str,
    line: usize,
) -> Result<(), InventoryError> {
    let tokens = tokens::split(text).map_err(|_| InventoryError::UnterminatedQuote { line })?;
    let Some((definition, assignments)) = tokens.split_first() else {
        return Ok(());
    };

    let (pattern, port) = split_port(definition);
    let port = port
        .map(|port| {
            port.parse::<u16>().map_err(|_| InventoryError::InvalidPort {
                line,
                port: port.to_string(),
            })
        })
        .transpose()?;

    let mut vars = indexmap::IndexMap::new();
    if let Some(port) = port {
        vars.insert("ansible_port".to_string(), Value::from(port.to_string()));
    }
    for assignment in assignments {
        match assignment.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                vars.insert(key.to_string(), Value::from(value));
            }
            _ => {
                return Err(InventoryError::ExpectedKeyValue {
                    line,
                    text: assignment.clone(),
                })
            }
        }
    }

    let names = pattern::expand(pattern)
        .map_err(|message| InventoryError::InvalidHostPattern { line, message })?;

    for name in names {
        let host = inventory.get_or_insert_host(&name);
        inventory.add_member(group, host);
        for (key, value) in &vars {
            inventory.hosts[host].vars.insert(key.clone(), value.clone());
        }
    }

    Ok(())
}

/// Splits `host:port`, ignoring colons inside ranges and addresses with several colons
fn split_port(definition: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut colons = vec![];

    for (index, c) in definition.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => colons.push(index),
            _ => {}
        }
    }

    match colons.as_slice() {
        [index] => (&definition[..*index], Some(&definition[index + 1..])),
        _ => (definition, None),
    }
}

fn child_line(text: &str, line: usize) -> Result<String, InventoryError> {
    let tokens = tokens::split(text).map_err(|_| InventoryError::UnterminatedQuote { line })?;

    match tokens.as_slice() {
        [name] => Ok(name.clone()),
        _ => Err(InventoryError::InvalidGroupName {
            line,
            text: text.to_string(),
        }),
    }
}

fn var_line(text: &str, line: usize) -> Result<(String, Value), InventoryError> {
    let Some((key, value)) = text.split_once('=') else {
        return Err(InventoryError::ExpectedKeyValue {
            line,
            text: text.to_string(),
        });
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(InventoryError::ExpectedKeyValue {
            line,
            text: text.to_string(),
        });
    }

    Ok((key.to_string(), Value::from(unquote(value.trim()))))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_err(source: &str) -> InventoryError {
        parse(source).expect_err("must error")
    }

    #[test]
    fn host_lines() {
        let inventory = parse(
            r#"
            [web]
            web[1:2].example.com http_port=8080 motd="hello there"
            db.example.com:2222 # primary
            "#,
        )
        .unwrap();

        let names = inventory.host_names(inventory.hosts().map(|(id, _)| id));
        assert_eq!(
            names,
            vec!["web1.example.com", "web2.example.com", "db.example.com"]
        );

        let web1 = inventory.host(0);
        assert_eq!(web1.vars["http_port"], Value::from("8080"));
        assert_eq!(web1.vars["motd"], Value::from("hello there"));
        assert_eq!(web1.port, None);

        let db = inventory.host(2);
        assert_eq!(db.port, Some(2222));
    }

    #[test]
    fn repeated_hosts_accumulate() {
        let inventory = parse(
            "
            [a]
            h1 x=1
            [b]
            h1 y=2
            [a]
            h1 x=3
            ",
        )
        .unwrap();

        assert_eq!(inventory.hosts().count(), 1);
        let h1 = inventory.host(0);
        assert_eq!(inventory.group_names(h1.groups.iter().copied()), vec!["a", "b"]);
        assert_eq!(h1.vars["x"], Value::from("3"));
        assert_eq!(h1.vars["y"], Value::from("2"));
    }

    #[test]
    fn header_variants() {
        assert!(parse("[web] # frontends\n[web:vars] ; comment\n[web:hosts]").is_ok());
        assert_eq!(
            parse_err("[web:metadata]"),
            InventoryError::UnknownSectionType {
                line: 1,
                group: "web".into(),
                kind: "metadata".into()
            }
        );
        assert_eq!(
            parse_err("\n[]"),
            InventoryError::InvalidSection {
                line: 2,
                text: "[]".into()
            }
        );
        assert!(matches!(
            parse_err("[a:b:c]"),
            InventoryError::InvalidSection { line: 1, .. }
        ));
    }

    #[test]
    fn vars_lines() {
        let inventory = parse(
            r#"
            [all:vars]
            ansible_user = 'deploy'
            greeting="hello world"
            url=http://example.com/?a=b
            "#,
        )
        .unwrap();

        let vars = &inventory.group(crate::inventory::ALL).vars;
        assert_eq!(vars["ansible_user"], Value::from("deploy"));
        assert_eq!(vars["greeting"], Value::from("hello world"));
        assert_eq!(vars["url"], Value::from("http://example.com/?a=b"));
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(
            parse_err("[g:vars]\nnot an assignment"),
            InventoryError::ExpectedKeyValue {
                line: 2,
                text: "not an assignment".into()
            }
        );
        assert_eq!(
            parse_err("[g]\nhost stray"),
            InventoryError::ExpectedKeyValue {
                line: 2,
                text: "stray".into()
            }
        );
        assert_eq!(
            parse_err("host:ssh"),
            InventoryError::InvalidPort {
                line: 1,
                port: "ssh".into()
            }
        );
        assert_eq!(
            parse_err("[g:children]\na b"),
            InventoryError::InvalidGroupName {
                line: 2,
                text: "a b".into()
            }
        );
        assert_eq!(
            parse_err(r#"h x="open"#),
            InventoryError::UnterminatedQuote { line: 1 }
        );
        assert!(matches!(
            parse_err("web[3:1]"),
            InventoryError::InvalidHostPattern { line: 1, .. }
        ));
        assert!(matches!(
            parse_err("[g]\nh[0:99999999999]"),
            InventoryError::InvalidHostPattern { line: 2, .. }
        ));
    }

    #[test]
    fn ipv6_hosts_have_no_port() {
        let inventory = parse("fe80::1").unwrap();
        assert_eq!(inventory.host(0).name, "fe80::1");
        assert_eq!(inventory.host(0).port, None);
    }
}
