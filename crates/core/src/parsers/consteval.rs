//! Integer constant folding for enumerator initializers

use std::collections::HashMap;
use tree_sitter::Node;

/// Fold an initializer expression to an integer
///
/// `known` holds the explicitly valued constants declared earlier in the same
/// enum. Anything that is not an integer constant expression yields `None`.
pub fn evaluate(node: &Node, source: &[u8], known: &HashMap<String, i64>) -> Option<i64> {
    let text = node.utf8_text(source).ok()?;

    match node.kind() {
        "number_literal" => parse_integer(text),
        "char_literal" => parse_char(text),
        "identifier" => known.get(text).copied(),
        "parenthesized_expression" => evaluate(&node.named_child(0)?, source, known),
        "cast_expression" => evaluate(&node.child_by_field_name("value")?, source, known),
        "unary_expression" => {
            let operand = evaluate(&node.child_by_field_name("argument")?, source, known)?;
            match operator(node, source)? {
                "-" => Some(operand.wrapping_neg()),
                "+" => Some(operand),
                "~" => Some(!operand),
                "!" => Some((operand == 0) as i64),
                _ => None,
            }
        }
        "binary_expression" => {
            let left = evaluate(&node.child_by_field_name("left")?, source, known)?;
            let right = evaluate(&node.child_by_field_name("right")?, source, known)?;
            binary(operator(node, source)?, left, right)
        }
        "conditional_expression" => {
            let condition = evaluate(&node.child_by_field_name("condition")?, source, known)?;
            let branch = if condition != 0 {
                node.child_by_field_name("consequence")?
            } else {
                node.child_by_field_name("alternative")?
            };
            evaluate(&branch, source, known)
        }
        _ => None,
    }
}

fn operator<'a>(node: &Node, source: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name("operator")?.utf8_text(source).ok()
}

fn binary(op: &str, left: i64, right: i64) -> Option<i64> {
    let value = match op {
        "+" => left.wrapping_add(right),
        "-" => left.wrapping_sub(right),
        "*" => left.wrapping_mul(right),
        "/" => left.checked_div(right)?,
        "%" => left.checked_rem(right)?,
        "<<" => left.checked_shl(u32::try_from(right).ok()?)?,
        ">>" => left.checked_shr(u32::try_from(right).ok()?)?,
        "&" => left & right,
        "|" => left | right,
        "^" => left ^ right,
        "&&" => (left != 0 && right != 0) as i64,
        "||" => (left != 0 || right != 0) as i64,
        "==" => (left == right) as i64,
        "!=" => (left != right) as i64,
        "<" => (left < right) as i64,
        ">" => (left > right) as i64,
        "<=" => (left <= right) as i64,
        ">=" => (left >= right) as i64,
        _ => return None,
    };
    Some(value)
}

/// Parse a C integer literal (decimal, hex, octal, binary; any u/l suffix)
pub fn parse_integer(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|&c| c != '\'').collect();
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let digits = unsigned.trim_end_matches(['u', 'U', 'l', 'L']);

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if body.is_empty() {
        return None;
    }

    // Wider than i64 literals wrap like an unsigned conversion would
    let value = u64::from_str_radix(body, radix).ok()? as i64;
    Some(if negative { value.wrapping_neg() } else { value })
}

/// Parse a character literal such as `'A'`, `'\n'` or `'\x41'`
fn parse_char(text: &str) -> Option<i64> {
    let start = text.find('\'')?;
    let inner = text[start + 1..].strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;

    let value = if first == '\\' {
        let escape: String = chars.collect();
        match escape.as_str() {
            "n" => 10,
            "t" => 9,
            "r" => 13,
            "a" => 7,
            "b" => 8,
            "f" => 12,
            "v" => 11,
            "\\" => 92,
            "'" => 39,
            "\"" => 34,
            "?" => 63,
            _ if escape.starts_with('x') => i64::from_str_radix(&escape[1..], 16).ok()?,
            _ if !escape.is_empty() && escape.chars().all(|c| c.is_digit(8)) => {
                i64::from_str_radix(&escape, 8).ok()?
            }
            _ => return None,
        }
    } else if chars.next().is_none() {
        first as i64
    } else {
        return None;
    };

    Some(value)
}
