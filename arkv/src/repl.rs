//! Line-oriented collection console.
//!
//! ```text
//! _find {collection} {field} {value}
//! _insert {collection} {jsonArray}
//! _update {collection} {jsonArray}
//! help
//! exit
//! ```

use std::io::{BufRead, Write};

use arkv_collection::CollectionStore;
use arkv_result::{Error, Result};
use arkv_storage::KvStore;

/// Collection seeded at start-up so `_find test foo bar` works out of the box.
pub const SEED_COLLECTION: &str = "test";

pub const SEED_ROWS: &str = r#"[
  {"foo": "bar", "enable": true, "index": 42, "point": 123.12},
  {"foo": "bar", "ping": "PONG", "index": 2, "point": 123456789012.12345},
  {"foo": "bor", "ping": "ping", "enable": true},
  {"foo": "bor", "ping": "ping", "enable": true}
]"#;

pub const USAGE: &str = "\
Query:  _find {collection} {field} {value}
Insert: _insert {collection} {jsonArray}   (or _update)
Help:   help
Quit:   exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Find {
        collection: &'a str,
        field: &'a str,
        value: &'a str,
    },
    Upsert {
        collection: &'a str,
        json: &'a str,
    },
    Help,
    Exit,
    Empty,
}

fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], input[end..].trim_start())),
        None => Some((input, "")),
    }
}

/// Parse one console line. The find value and the JSON payload run to the
/// end of the line.
pub fn parse_command(line: &str) -> Result<Command<'_>> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(Command::Empty);
    };
    if verb.eq_ignore_ascii_case("exit") && rest.is_empty() {
        return Ok(Command::Exit);
    }
    match verb {
        "_find" => {
            let usage = || {
                Error::InvalidArgumentError("usage: _find {collection} {field} {value}".into())
            };
            let (collection, rest) = split_word(rest).ok_or_else(usage)?;
            let (field, value) = split_word(rest).ok_or_else(usage)?;
            if value.is_empty() {
                return Err(usage());
            }
            Ok(Command::Find {
                collection,
                field,
                value,
            })
        }
        "_insert" | "_update" => {
            let usage = || {
                Error::InvalidArgumentError(format!("usage: {verb} {{collection}} {{jsonArray}}"))
            };
            let (collection, json) = split_word(rest).ok_or_else(usage)?;
            if json.is_empty() {
                return Err(usage());
            }
            Ok(Command::Upsert { collection, json })
        }
        "help" | "_help" => Ok(Command::Help),
        other => Err(Error::InvalidArgumentError(format!(
            "unknown command `{other}`"
        ))),
    }
}

pub struct Repl<S: KvStore> {
    collections: CollectionStore<S>,
}

impl<S: KvStore> Repl<S> {
    pub fn new(collections: CollectionStore<S>) -> Self {
        Self { collections }
    }

    pub fn collections(&self) -> &CollectionStore<S> {
        &self.collections
    }

    /// Load the sample rows into [`SEED_COLLECTION`] unless it already exists.
    pub fn seed(&self) -> Result<()> {
        if self.collections.contains(SEED_COLLECTION)? {
            return Ok(());
        }
        self.collections.upsert_json(SEED_COLLECTION, SEED_ROWS)?;
        Ok(())
    }

    /// Run one line. Returns `false` once the session should end.
    ///
    /// Operation failures are reported on `out` and do not end the session;
    /// only failures to write to `out` are returned.
    pub fn execute<W: Write>(&self, line: &str, out: &mut W) -> Result<bool> {
        let outcome = match parse_command(line) {
            Ok(Command::Exit) => return Ok(false),
            Ok(Command::Empty) => return Ok(true),
            Ok(Command::Help) => {
                writeln!(out, "{USAGE}")?;
                Ok(())
            }
            Ok(Command::Find {
                collection,
                field,
                value,
            }) => match self.collections.find(collection, field, value) {
                Ok(rows) => {
                    for row in &rows {
                        write!(out, "{row}")?;
                        writeln!(out, "-----")?;
                    }
                    Ok(())
                }
                Err(err) => Err((Some(collection), err)),
            },
            Ok(Command::Upsert { collection, json }) => {
                match self.collections.upsert_json(collection, json) {
                    Ok(summary) => {
                        writeln!(
                            out,
                            "inserted {} rows into {collection} ({} total)",
                            summary.inserted, summary.total_rows
                        )?;
                        Ok(())
                    }
                    Err(err) => Err((Some(collection), err)),
                }
            }
            Err(err) => Err((None, err)),
        };

        match outcome {
            Ok(()) => {}
            Err((Some(collection), Error::NotFound(what))) if what.starts_with("collection") => {
                writeln!(out, "Collection not found: {collection}")?;
            }
            Err((_, err)) => {
                tracing::warn!(line, error = %err, "command failed");
                writeln!(out, "error: {err}")?;
            }
        }
        out.flush()?;
        Ok(true)
    }

    /// Read commands from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W, prompt: bool) -> Result<()> {
        if prompt {
            writeln!(out, "{USAGE}")?;
        }
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "arkv> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                return Ok(());
            };
            if !self.execute(&line?, out)? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("_find test foo bar baz").unwrap(),
            Command::Find {
                collection: "test",
                field: "foo",
                value: "bar baz"
            }
        );
        assert_eq!(
            parse_command("  _update c [{\"a\": 1}] ").unwrap(),
            Command::Upsert {
                collection: "c",
                json: "[{\"a\": 1}]"
            }
        );
        assert_eq!(parse_command("EXIT").unwrap(), Command::Exit);
        assert_eq!(parse_command("   ").unwrap(), Command::Empty);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_command("_find test foo").is_err());
        assert!(parse_command("_insert test").is_err());
        assert!(parse_command("select *").is_err());
    }
}
