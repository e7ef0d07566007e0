//! Minimal C tokenizer for macro definitions
//!
//! Tree-sitter keeps a macro body as one opaque `preproc_arg`, so the raw
//! token sequence is recovered here. Comments and line continuations are
//! dropped; everything else is kept verbatim.

/// Three- and two-character punctuators, longest first
const PUNCTUATORS: [&str; 22] = [
    "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=",
    "/=", "%=", "+=", "-=", "&=", "^=", "|=",
];

/// Split C source text into token spellings
pub fn tokenize(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Line continuation
        if c == b'\\' && matches!(bytes.get(i + 1), Some(b'\n') | Some(b'\r')) {
            i += 1;
            continue;
        }

        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = text[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
            continue;
        }

        let start = i;

        if is_ident_start(c) {
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            // Encoding prefixes belong to the literal that follows
            let ident = &text[start..i];
            if matches!(ident, "L" | "u" | "U" | "u8")
                && matches!(bytes.get(i), Some(b'"') | Some(b'\''))
            {
                i = skip_literal(bytes, i);
            }
        } else if c.is_ascii_digit()
            || (c == b'.' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()))
        {
            i = skip_number(bytes, i);
        } else if c == b'"' || c == b'\'' {
            i = skip_literal(bytes, i);
        } else if let Some(p) = PUNCTUATORS.iter().find(|p| text[i..].starts_with(*p)) {
            i += p.len();
        } else if c == b'#' && bytes.get(i + 1) == Some(&b'#') {
            i += 2;
        } else {
            i += 1;
        }

        tokens.push(text[start..i].to_string());
    }

    tokens
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80
}

fn is_ident_continue(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Preprocessing number: digits, letters, `.`, and signs after exponents
fn skip_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        let c = bytes[i];
        if (c == b'+' || c == b'-') && matches!(bytes[i - 1], b'e' | b'E' | b'p' | b'P') {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || c == b'\'' {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Skip a string or character literal starting at its opening quote
fn skip_literal(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
