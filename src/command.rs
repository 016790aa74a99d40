//! Textual command parsing for FlatDB
//!
//! Maps a command line onto the fixed set of store operations. Keywords are
//! matched case-insensitively and a trailing semicolon is stripped; help
//! text and the read loop live in the binary, not here.

use crate::error::{Error, Result};

/// A parsed command, ready to dispatch against a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateTable {
        table: String,
        /// Column names paired with their textual type tokens
        columns: Vec<(String, String)>,
    },
    Insert {
        table: String,
        values: Vec<String>,
    },
    SelectAll {
        table: String,
    },
    DeleteById {
        table: String,
        id: i32,
    },
    DropTable {
        table: String,
    },
    ShowTables,
    Help,
    Exit,
    /// Blank input, ignored by the read loop
    Empty,
}

/// Parse a single command line
pub fn parse(input: &str) -> Result<Command> {
    let input = input.trim().trim_end_matches(';').trim();
    if input.is_empty() {
        return Ok(Command::Empty);
    }

    match input.to_lowercase().as_str() {
        "help" => return Ok(Command::Help),
        "exit" | "quit" => return Ok(Command::Exit),
        "show tables" => return Ok(Command::ShowTables),
        _ => {}
    }

    if starts_with_keyword(input, "create table ") {
        return parse_create(input);
    }
    if starts_with_keyword(input, "insert into ") {
        return parse_insert(input);
    }
    if starts_with_keyword(input, "select ") {
        return parse_select(input);
    }
    if starts_with_keyword(input, "delete from ") {
        return parse_delete(input);
    }
    if starts_with_keyword(input, "drop table ") {
        return parse_drop(input);
    }

    Err(Error::ParseError(format!(
        "unrecognized command: {}",
        input
    )))
}

/// Case-insensitive check for an ASCII keyword prefix.
///
/// Matching is done byte-wise on the original input, never on a lowercased
/// copy: `to_lowercase` can change a string's byte length (e.g. 'İ'), so
/// indexes taken from the copy must not be used to slice the original. A
/// match guarantees the prefix bytes are ASCII, so slicing the input at the
/// keyword length stays on a char boundary.
fn starts_with_keyword(input: &str, keyword: &str) -> bool {
    input.len() >= keyword.len()
        && input.as_bytes()[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
}

/// Byte offset of the first case-insensitive occurrence of an ASCII keyword
fn find_keyword(input: &str, keyword: &str) -> Option<usize> {
    input
        .as_bytes()
        .windows(keyword.len())
        .position(|window| window.eq_ignore_ascii_case(keyword.as_bytes()))
}

fn parse_create(input: &str) -> Result<Command> {
    // Keywords are ASCII, so slicing by keyword length is safe whatever the case
    let def = input["create table".len()..].trim();
    let (open, close) = match (def.find('('), def.rfind(')')) {
        (Some(o), Some(c)) if o < c => (o, c),
        _ => {
            return Err(Error::ParseError(
                "usage: create table <table> (<column> <TYPE>, ...)".to_string(),
            ))
        }
    };

    let table = def[..open].trim().to_string();
    if table.is_empty() {
        return Err(Error::ParseError("missing table name".to_string()));
    }

    let mut columns = Vec::new();
    for col_def in def[open + 1..close].split(',') {
        let mut tokens = col_def.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(name), Some(type_token)) => {
                columns.push((name.to_string(), type_token.to_string()))
            }
            _ => {
                return Err(Error::ParseError(format!(
                    "invalid column definition: '{}'",
                    col_def.trim()
                )))
            }
        }
    }

    Ok(Command::CreateTable { table, columns })
}

fn parse_insert(input: &str) -> Result<Command> {
    let values_at = find_keyword(input, "values").ok_or_else(|| {
        Error::ParseError("usage: insert into <table> values (<values>)".to_string())
    })?;

    let into_part = &input[..values_at];
    let values_part = input[values_at + "values".len()..].trim();

    let mut tokens = into_part.split_whitespace();
    let table = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(_), Some(_), Some(table)) => table.to_string(),
        _ => {
            return Err(Error::ParseError(
                "usage: insert into <table> values (<values>)".to_string(),
            ))
        }
    };

    let raw = values_part
        .trim_start_matches('(')
        .trim_end_matches(')');
    Ok(Command::Insert {
        table,
        values: split_quoted(raw),
    })
}

fn parse_select(input: &str) -> Result<Command> {
    let prefix = "select * from ";
    if !starts_with_keyword(input, prefix) {
        return Err(Error::ParseError(
            "only 'select * from <table>' is supported".to_string(),
        ));
    }

    let table = input[prefix.len()..].trim().to_string();
    if table.is_empty() {
        return Err(Error::ParseError("missing table name".to_string()));
    }
    Ok(Command::SelectAll { table })
}

fn parse_delete(input: &str) -> Result<Command> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.len() != 5 || !tokens[3].eq_ignore_ascii_case("where") {
        return Err(Error::ParseError(
            "usage: delete from <table> where <id>".to_string(),
        ));
    }

    let id = tokens[4]
        .parse::<i32>()
        .map_err(|_| Error::ParseError("delete id must be an integer".to_string()))?;
    Ok(Command::DeleteById {
        table: tokens[2].to_string(),
        id,
    })
}

fn parse_drop(input: &str) -> Result<Command> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(Error::ParseError(
            "usage: drop table <table>".to_string(),
        ));
    }
    Ok(Command::DropTable {
        table: tokens[2].to_string(),
    })
}

/// Split a comma-separated value list, honoring double-quoted segments so
/// quoted values may contain commas. The quotes themselves are dropped and
/// unquoted values are trimmed.
fn split_quoted(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            ',' if !in_quotes => {
                out.push(current.trim().to_string());
                current.clear();
            }
            '"' => in_quotes = !in_quotes,
            _ => current.push(c),
        }
    }
    out.push(current.trim().to_string());
    out
}
