//! # Armored Text Framing
//!
//! ```text
//! -----BEGIN REOP <KIND>-----
//! ident:<ident>
//! <base64 payload, wrapped at 76 columns>
//! -----END REOP <KIND>-----
//! ```
//!
//! A signed message embeds its signature as a trailing `SIGNATURE` block
//! appended to arbitrary message text. Because the message body is
//! arbitrary, it may itself contain decoy `-----BEGIN REOP SIGNATURE-----`
//! text; [`find_last_block`] always resolves to the *last* occurrence of the
//! opening marker, never the first.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::error::{Error, Result};
use crate::keys::IDENT_MAX;

/// Column width armored base64 payloads are wrapped at.
pub const WRAP_WIDTH: usize = 76;

/// A single parsed armored block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmorBlock {
    pub kind: String,
    pub ident: String,
    pub payload: Vec<u8>,
}

/// Encode `payload` as a single armored block of the given `kind`.
pub fn encode_block(kind: &str, ident: &str, payload: &[u8]) -> Result<String> {
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let mut out = String::new();
    out.push_str("-----BEGIN REOP ");
    out.push_str(kind);
    out.push_str("-----\n");
    out.push_str("ident:");
    out.push_str(ident);
    out.push('\n');
    out.push_str(&wrap_base64(payload));
    out.push_str("-----END REOP ");
    out.push_str(kind);
    out.push_str("-----\n");
    Ok(out)
}

/// Base64-encode `payload` and wrap it at [`WRAP_WIDTH`] columns, one
/// line per output line (each terminated with `\n`).
pub fn wrap_base64(payload: &[u8]) -> String {
    let encoded = B64.encode(payload);
    let mut out = String::new();
    for chunk in wrap_chunks(&encoded, WRAP_WIDTH) {
        out.push_str(chunk);
        out.push('\n');
    }
    out
}

fn wrap_chunks(s: &str, width: usize) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let end = (i + width).min(bytes.len());
        out.push(std::str::from_utf8(&bytes[i..end]).unwrap());
        i = end;
    }
    out
}

/// Parse the first armored block of `kind` found in `text`.
pub fn parse_first_block(text: &str, kind: &str) -> Result<ArmorBlock> {
    let (_, block) = find_block_from(text, kind, 0, false)?;
    Ok(block)
}

/// Parse the *last* armored block of `kind` found in `text`, along with the
/// byte offset at which its `BEGIN` marker starts. Used to find the real
/// trailing signature block even when the signed message body contains
/// decoy `BEGIN REOP SIGNATURE` text earlier on.
pub fn find_last_block(text: &str, kind: &str) -> Result<(usize, ArmorBlock)> {
    find_block_from(text, kind, 0, true)
}

fn find_block_from(text: &str, kind: &str, start_at: usize, want_last: bool) -> Result<(usize, ArmorBlock)> {
    let begin_marker = format!("-----BEGIN REOP {kind}-----");
    let end_marker = format!("-----END REOP {kind}-----");

    let mut search_from = start_at;
    let mut last_found: Option<(usize, ArmorBlock)> = None;

    loop {
        let Some(rel_begin) = text[search_from..].find(&begin_marker) else {
            break;
        };
        let begin_at = search_from + rel_begin;
        let after_begin = begin_at + begin_marker.len();
        let Some(rel_end) = text[after_begin..].find(&end_marker) else {
            return Err(Error::Format(format!("unterminated REOP {kind} block")));
        };
        let end_at = after_begin + rel_end;
        let body = &text[after_begin..end_at];
        let block = parse_block_body(body, kind)?;

        if !want_last {
            return Ok((begin_at, block));
        }
        last_found = Some((begin_at, block));
        search_from = end_at + end_marker.len();
    }

    last_found.ok_or_else(|| Error::Format(format!("no REOP {kind} block found")))
}

fn parse_block_body(body: &str, kind: &str) -> Result<ArmorBlock> {
    let mut lines = body.lines();
    // skip the blank remainder of the BEGIN line, if any
    let first = lines.next().unwrap_or("");
    let ident_line = if first.trim().is_empty() {
        lines.next().unwrap_or("")
    } else {
        first
    };
    let ident = ident_line
        .strip_prefix("ident:")
        .ok_or_else(|| Error::Format("missing ident: line".into()))?
        .trim()
        .to_string();
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }

    let b64: String = lines.collect::<Vec<_>>().join("");
    let payload = B64
        .decode(b64.trim())
        .map_err(|e| Error::Format(format!("invalid base64 in REOP {kind} block: {e}")))?;

    Ok(ArmorBlock {
        kind: kind.to_string(),
        ident,
        payload,
    })
}
