//! Raw template parser using nom.
//!
//! Splits a `?` template into the SQL fragments of a `Raw` node.
//!
//! ```text
//! a = ? and b ?? 'k' and c = ?
//! ──┬─ ───────┬─────────── ┬
//!   │         │            └── fragment 2 (empty)
//!   │         └── fragment 1, `??` becomes a literal `?`
//!   └── fragment 0
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::char,
    combinator::value,
    multi::{fold_many0, many0},
    sequence::preceded,
};

use crate::error::{OpsqlError, OpsqlResult};

/// Parse a template into `placeholders + 1` fragments.
pub fn parse_raw_template(input: &str) -> OpsqlResult<Vec<String>> {
    match parse_template(input) {
        Ok(("", fragments)) => Ok(fragments),
        Ok((remaining, _)) => Err(OpsqlError::template(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(OpsqlError::template(0, format!("Parse failed: {:?}", e))),
    }
}

fn parse_template(input: &str) -> IResult<&str, Vec<String>> {
    let (input, first) = parse_fragment(input)?;
    let (input, rest) = many0(preceded(char('?'), parse_fragment))(input)?;

    let mut fragments = Vec::with_capacity(rest.len() + 1);
    fragments.push(first);
    fragments.extend(rest);
    Ok((input, fragments))
}

/// Text up to the next lone `?`.
fn parse_fragment(input: &str) -> IResult<&str, String> {
    fold_many0(
        alt((value("?", tag("??")), is_not("?"))),
        String::new,
        |mut acc, piece: &str| {
            acc.push_str(piece);
            acc
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_placeholder() {
        assert_eq!(parse_raw_template("a = ?").unwrap(), vec!["a = ", ""]);
    }

    #[test]
    fn test_no_placeholder() {
        assert_eq!(parse_raw_template("now()").unwrap(), vec!["now()"]);
        assert_eq!(parse_raw_template("").unwrap(), vec![""]);
    }

    #[test]
    fn test_leading_and_adjacent_placeholders() {
        assert_eq!(
            parse_raw_template("?, ?").unwrap(),
            vec!["", ", ", ""]
        );
        assert_eq!(
            parse_raw_template("coalesce(?,?)").unwrap(),
            vec!["coalesce(", ",", ")"]
        );
    }

    #[test]
    fn test_escaped_question_mark() {
        assert_eq!(
            parse_raw_template("data ?? 'key' and id = ?").unwrap(),
            vec!["data ? 'key' and id = ", ""]
        );
    }
}
