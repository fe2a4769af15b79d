//! Header rewriting for forwarded messages.
//!
//! Forwarding a received message verbatim would fail DMARC at the next hop
//! (the visible From domain is not ours) and carry a DKIM signature that the
//! rewritten content invalidates. [`rewrite_message`] replaces the `From`
//! header with a forwarding address, synthesizes a `Reply-To` pointing back
//! at the original sender, and strips `DKIM-Signature` and `Return-Path`.
//! Everything else, including the body, is re-emitted byte-exact.

use crate::mime::{header_groups, split_message, HeaderGroup};

/// Parsed display-name/address parts of a `From` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromValue {
    /// Display name, trimmed of surrounding quotes; empty if absent.
    pub name: String,

    /// Address inside angle brackets, or the whole trimmed value when the
    /// header carries a bare address.
    pub email: String,
}

impl FromValue {
    /// Parses a `From` header value into display name and address.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mailvia_utils::FromValue;
    ///
    /// let parsed = FromValue::parse("\"Alice A.\" <alice@x.com>");
    /// assert_eq!(parsed.name, "Alice A.");
    /// assert_eq!(parsed.email, "alice@x.com");
    ///
    /// let bare = FromValue::parse("alice@x.com");
    /// assert_eq!(bare.name, "");
    /// assert_eq!(bare.email, "alice@x.com");
    /// ```
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if let Some(open) = trimmed.find('<') {
            if let Some(close) = trimmed[open + 1..].find('>') {
                let email = trimmed[open + 1..open + 1 + close].trim().to_string();
                let name = trimmed[..open]
                    .trim()
                    .trim_matches('"')
                    .trim()
                    .to_string();
                return Self { name, email };
            }
        }
        Self {
            name: String::new(),
            email: trimmed.to_string(),
        }
    }
}

/// Per-group decision computed in the discovery pass and applied in the
/// emission pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderAction {
    /// Emit the group's lines unchanged.
    Keep,
    /// Emit nothing for this group, continuation lines included.
    Drop,
    /// Emit the synthesized `From` header in place of this group.
    ReplaceFrom,
}

fn classify(group: &HeaderGroup<'_>) -> HeaderAction {
    if group.name_matches("DKIM-Signature") || group.name_matches("Return-Path") {
        HeaderAction::Drop
    } else if group.name_matches("From") {
        HeaderAction::ReplaceFrom
    } else {
        HeaderAction::Keep
    }
}

/// Rewrites the header section of a raw message for forwarding.
///
/// Pure and deterministic. `forward_from` becomes the new From address and
/// `domain` is appended to the synthesized display name. When the message
/// has no discoverable header/body boundary it is returned unchanged; a
/// message with no `From` header gets no synthesized headers and only loses
/// its `DKIM-Signature`/`Return-Path` groups. Malformed header lines are
/// passed through untouched, never rejected.
pub fn rewrite_message(raw: &str, forward_from: &str, domain: &str) -> String {
    let Some(parts) = split_message(raw) else {
        return raw.to_string();
    };
    let brk = parts.line_break.as_str();
    let groups = header_groups(parts.header_section, parts.line_break);

    // Discovery pass: tag every group and capture the original From value
    // and whether the message already routes replies somewhere.
    let mut original_from: Option<String> = None;
    let mut has_reply_to = false;
    let mut actions = Vec::with_capacity(groups.len());
    for group in &groups {
        let action = classify(group);
        if action == HeaderAction::ReplaceFrom && original_from.is_none() {
            original_from = Some(group.value());
        }
        if group.name_matches("Reply-To") {
            has_reply_to = true;
        }
        actions.push(action);
    }

    let original_from = original_from.unwrap_or_default();
    let from = FromValue::parse(&original_from);

    // Emission pass, in original group order.
    let mut lines: Vec<String> = Vec::with_capacity(groups.len() + 1);
    let mut reply_to_emitted = false;
    for (group, action) in groups.iter().zip(&actions) {
        match action {
            HeaderAction::Keep => {
                lines.extend(group.lines().iter().map(|line| line.to_string()));
            }
            HeaderAction::Drop => {}
            HeaderAction::ReplaceFrom => {
                let display = if from.name.is_empty() {
                    &from.email
                } else {
                    &from.name
                };
                lines.push(format!("From: \"{display} via {domain}\" <{forward_from}>"));
                if !reply_to_emitted && !has_reply_to && !from.email.is_empty() {
                    lines.push(format!("Reply-To: {original_from}"));
                    reply_to_emitted = true;
                }
            }
        }
    }

    let mut out = String::with_capacity(raw.len() + 64);
    out.push_str(&lines.join(brk));
    out.push_str(brk);
    out.push_str(brk);
    out.push_str(parts.body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_without_boundary() {
        let raw = "From: Alice <alice@x.com>\r\nTo: hello@example.com\r\n";
        assert_eq!(
            rewrite_message(raw, "hello@example.com", "example.com"),
            raw
        );
        assert_eq!(rewrite_message("plain text", "f@x.com", "x.com"), "plain text");
    }

    #[test]
    fn test_from_synthesis_with_display_name() {
        let raw = "From: Alice <alice@x.com>\r\nTo: hello@example.com\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("From: \"Alice via example.com\" <hello@example.com>"));
        assert!(out.contains("Reply-To: Alice <alice@x.com>"));
    }

    #[test]
    fn test_from_synthesis_bare_address() {
        let raw = "From: alice@x.com\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("From: \"alice@x.com via example.com\" <hello@example.com>"));
        assert!(out.contains("Reply-To: alice@x.com"));
    }

    #[test]
    fn test_from_synthesis_quoted_display_name() {
        let raw = "From: \"Alice A.\" <alice@x.com>\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("From: \"Alice A. via example.com\" <hello@example.com>"));
    }

    #[test]
    fn test_reply_to_suppressed_when_present() {
        let raw = "From: Alice <alice@x.com>\r\nReply-To: other@y.com\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert_eq!(out.matches("Reply-To:").count(), 1);
        assert!(out.contains("Reply-To: other@y.com"));
    }

    #[test]
    fn test_dkim_signature_dropped_with_continuations() {
        let raw = "From: Alice <alice@x.com>\r\nDKIM-Signature: v=1; a=rsa-sha256;\r\n\tb=abc\r\n c=def\r\nTo: x@y.com\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(!out.contains("DKIM-Signature"));
        assert!(!out.contains("b=abc"));
        assert!(!out.contains("c=def"));
        assert!(out.contains("To: x@y.com"));
    }

    #[test]
    fn test_return_path_dropped() {
        let raw = "Return-Path: <bounce@x.com>\r\nFrom: Alice <alice@x.com>\r\n\r\nHi";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(!out.contains("Return-Path"));
    }

    #[test]
    fn test_no_from_header_no_synthesis() {
        let raw = "To: x@y.com\r\nDKIM-Signature: v=1\r\nSubject: Hi\r\n\r\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert_eq!(out, "To: x@y.com\r\nSubject: Hi\r\n\r\nBody");
    }

    #[test]
    fn test_body_preserved_byte_exact() {
        let body = "Line one\r\n\r\n--boundary\r\nContent-Type: text/plain\r\n\r\nattachment bytes\r\n--boundary--\r\n";
        let raw = format!("From: a@b.com\r\nTo: c@d.com\r\n\r\n{body}");
        let out = rewrite_message(&raw, "hello@example.com", "example.com");
        assert!(out.ends_with(body));
    }

    #[test]
    fn test_header_order_preserved() {
        let raw = "Subject: Hi\r\nFrom: Alice <alice@x.com>\r\nTo: x@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        let subject = out.find("Subject:").unwrap();
        let from = out.find("From:").unwrap();
        let reply_to = out.find("Reply-To:").unwrap();
        let to = out.find("To:").unwrap();
        assert!(subject < from);
        assert!(from < reply_to);
        assert!(reply_to < to);
    }

    #[test]
    fn test_lf_convention_message() {
        let raw = "From: Alice <alice@x.com>\nTo: x@y.com\n\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("From: \"Alice via example.com\" <hello@example.com>\n"));
        assert!(!out.contains('\r'));
        assert!(out.ends_with("\n\nBody"));
    }

    #[test]
    fn test_folded_from_value_unfolded_in_reply_to() {
        let raw = "From: Alice\r\n <alice@x.com>\r\n\r\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("From: \"Alice via example.com\" <hello@example.com>"));
        assert!(out.contains("Reply-To: Alice <alice@x.com>"));
    }

    #[test]
    fn test_multiple_from_single_reply_to() {
        let raw = "From: Alice <alice@x.com>\r\nFrom: Bob <bob@x.com>\r\n\r\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        // Both From groups are replaced, Reply-To is synthesized once,
        // from the first captured value.
        assert_eq!(out.matches("Reply-To:").count(), 1);
        assert!(out.contains("Reply-To: Alice <alice@x.com>"));
        assert_eq!(
            out.matches("From: \"Alice via example.com\" <hello@example.com>")
                .count(),
            2
        );
    }

    #[test]
    fn test_malformed_header_line_passed_through() {
        let raw = "From: Alice <alice@x.com>\r\nthis line has no colon\r\n\r\nBody";
        let out = rewrite_message(raw, "hello@example.com", "example.com");
        assert!(out.contains("this line has no colon"));
    }

    #[test]
    fn test_untouched_message_round_trips() {
        let raw = "Subject: Hi\r\nTo: x@y.com\r\n\r\nBody";
        assert_eq!(rewrite_message(raw, "f@x.com", "x.com"), raw);
    }

    #[test]
    fn test_from_value_parse_variants() {
        assert_eq!(
            FromValue::parse("Alice <alice@x.com>"),
            FromValue {
                name: "Alice".to_string(),
                email: "alice@x.com".to_string()
            }
        );
        assert_eq!(
            FromValue::parse("  alice@x.com  "),
            FromValue {
                name: String::new(),
                email: "alice@x.com".to_string()
            }
        );
        // Unclosed angle bracket degrades to a bare address
        assert_eq!(FromValue::parse("Alice <alice@x.com").email, "Alice <alice@x.com");
        assert_eq!(FromValue::parse("").email, "");
    }
}
