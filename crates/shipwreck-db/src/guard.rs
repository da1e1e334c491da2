//! Statement guard for model-generated SQL.
//!
//! The model is asked for exactly one `SELECT`, but nothing stops it from
//! emitting a second statement, a write, or a Markdown fence around the
//! query. [`normalize_select`] turns its output into a single read-only
//! statement or rejects it.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlGuardError {
    #[error("SQL statement is empty")]
    Empty,

    #[error("only a single SQL statement is allowed")]
    MultipleStatements,

    #[error("only SELECT queries are allowed, got {0}")]
    NotReadOnly(String),

    #[error("unterminated {0} in SQL statement")]
    Unterminated(&'static str),
}

/// Clean up a generated statement and check it is a single read-only query.
///
/// Returns the statement without fences, stray backticks or trailing
/// semicolons. Backticks inside literals and comments are kept.
pub fn normalize_select(raw: &str) -> Result<String, SqlGuardError> {
    let stripped = strip_fence(raw.trim());
    let (cleaned, body_start) = scan(stripped)?;

    let Some(body_start) = body_start else {
        return Err(SqlGuardError::Empty);
    };
    let keyword: String = cleaned[body_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" => Ok(cleaned.trim().to_string()),
        "" => Err(SqlGuardError::Empty),
        _ => Err(SqlGuardError::NotReadOnly(keyword)),
    }
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // An info string (```sql) only exists when a newline follows it.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Walk the statement once, copying it without backticks that sit outside
/// literals and comments.
///
/// A `;` ends the statement when only whitespace, semicolons and comments
/// follow it; anything else after it is a second statement. Returns the
/// cleaned text and the byte offset of its first token that is not a comment.
fn scan(sql: &str) -> Result<(String, Option<usize>), SqlGuardError> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut body_start = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                let end = line_comment_end(sql, i);
                out.push_str(&sql[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = block_comment_end(sql, i)?;
                out.push_str(&sql[i..end]);
                i = end;
            }
            quote @ (b'\'' | b'"') => {
                body_start.get_or_insert(out.len());
                let end = skip_quoted(bytes, i, quote)?;
                out.push_str(&sql[i..end]);
                i = end;
            }
            b'`' => i += 1,
            b';' => {
                if only_trivia(&sql[i + 1..])? {
                    break;
                }
                return Err(SqlGuardError::MultipleStatements);
            }
            _ => {
                let Some(ch) = sql[i..].chars().next() else {
                    break;
                };
                if !ch.is_whitespace() {
                    body_start.get_or_insert(out.len());
                }
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }

    Ok((out, body_start))
}

fn line_comment_end(sql: &str, start: usize) -> usize {
    match sql[start..].find('\n') {
        Some(off) => start + off + 1,
        None => sql.len(),
    }
}

fn block_comment_end(sql: &str, start: usize) -> Result<usize, SqlGuardError> {
    let off = sql[start + 2..]
        .find("*/")
        .ok_or(SqlGuardError::Unterminated("block comment"))?;
    Ok(start + off + 4)
}

/// True when `rest` holds nothing but whitespace, semicolons and comments.
fn only_trivia(rest: &str) -> Result<bool, SqlGuardError> {
    let mut i = 0;
    while i < rest.len() {
        let tail = &rest[i..];
        if tail.starts_with("--") {
            i = line_comment_end(rest, i);
        } else if tail.starts_with("/*") {
            i = block_comment_end(rest, i)?;
        } else {
            match tail.chars().next() {
                Some(c) if c == ';' || c.is_whitespace() => i += c.len_utf8(),
                _ => return Ok(false),
            }
        }
    }
    Ok(true)
}

/// Skip a quoted literal starting at `start`; a doubled quote is an escape.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> Result<usize, SqlGuardError> {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        i += 1;
    }
    Err(SqlGuardError::Unterminated(if quote == b'\'' {
        "string literal"
    } else {
        "quoted identifier"
    }))
}
