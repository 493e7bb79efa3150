//! WinAnsi encoding utilities for the standard PDF fonts
//!
//! The base-14 Helvetica faces are addressed with WinAnsiEncoding
//! (windows-1252). This module provides utilities for:
//! - Substituting characters receipts use that WinAnsi lacks (₹)
//! - Converting UTF-8 text to WinAnsi bytes
//! - Escaping bytes for PDF literal strings

use std::borrow::Cow;
use tracing::instrument;

/// Characters outside WinAnsi with printable stand-ins
const SUBSTITUTIONS: &[(char, &str)] = &[('₹', "Rs."), ('\u{2212}', "-"), ('\u{00A0}', " ")];

/// Replace characters that have no WinAnsi code with their stand-ins
pub fn normalize_text(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Convert UTF-8 text to WinAnsi bytes
///
/// ASCII passes through (control characters become spaces). Everything
/// else is encoded one character at a time; characters windows-1252
/// cannot represent become `?`.
#[instrument(level = "trace", skip(s))]
pub fn encode_win_ansi(s: &str) -> Vec<u8> {
    let normalized = normalize_text(s);
    let mut result = Vec::with_capacity(normalized.len());

    for c in normalized.chars() {
        if c.is_ascii() {
            result.push(if c.is_ascii_control() { b' ' } else { c as u8 });
            continue;
        }
        let mut buf = [0u8; 4];
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        match bytes.as_ref() {
            [b] if !had_errors => result.push(*b),
            _ => result.push(b'?'),
        }
    }

    result
}

/// Escape WinAnsi bytes for use inside a PDF literal string `( ... )`
pub(crate) fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 8);
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            _ => out.push(b),
        }
    }
    out
}
