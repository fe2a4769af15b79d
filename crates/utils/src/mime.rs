//! Header-section tokenization for raw RFC 5322 messages.
//!
//! The tokenizer locates the header/body boundary, classifies the line-break
//! convention of the message, and splits the header section into logical
//! header groups (a header line plus its folded continuation lines). The
//! body is treated as opaque text and is never inspected.

/// Line-break convention detected in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// CR LF line endings (`\r\n`), the RFC 5322 wire format.
    CrLf,
    /// Bare LF line endings (`\n`), common after local processing.
    Lf,
}

impl LineBreak {
    /// Returns the line break as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::CrLf => "\r\n",
            LineBreak::Lf => "\n",
        }
    }
}

/// The result of splitting a raw message at its header/body boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageParts<'a> {
    /// Header section, without the trailing blank-line boundary.
    pub header_section: &'a str,

    /// Message body after the boundary, byte-exact.
    pub body: &'a str,

    /// Line-break convention detected from the boundary.
    pub line_break: LineBreak,
}

/// Splits a raw message at the first header/body boundary.
///
/// The boundary is the first `\r\n\r\n` sequence; if none exists, the first
/// `\n\n` sequence is used and the message is classified as LF-terminated.
/// Returns `None` when no boundary can be found, in which case the caller
/// must treat the whole message as opaque and pass it through unmodified.
///
/// # Examples
///
/// ```rust
/// use mailvia_utils::{split_message, LineBreak};
///
/// let parts = split_message("Subject: Hi\r\n\r\nBody").unwrap();
/// assert_eq!(parts.header_section, "Subject: Hi");
/// assert_eq!(parts.body, "Body");
/// assert_eq!(parts.line_break, LineBreak::CrLf);
/// ```
///
/// A message without a boundary yields `None`:
///
/// ```rust
/// assert!(mailvia_utils::split_message("Subject: Hi\r\nTo: x@y.com").is_none());
/// ```
pub fn split_message(raw: &str) -> Option<MessageParts<'_>> {
    if let Some(pos) = raw.find("\r\n\r\n") {
        return Some(MessageParts {
            header_section: &raw[..pos],
            body: &raw[pos + 4..],
            line_break: LineBreak::CrLf,
        });
    }
    if let Some(pos) = raw.find("\n\n") {
        return Some(MessageParts {
            header_section: &raw[..pos],
            body: &raw[pos + 2..],
            line_break: LineBreak::Lf,
        });
    }
    None
}

/// A logical header: one header line plus its folded continuation lines.
///
/// Lines are kept verbatim so that groups emitted unchanged reassemble to
/// the exact original text. A malformed line (no colon, not a continuation)
/// forms its own nameless group and round-trips untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGroup<'a> {
    lines: Vec<&'a str>,
}

impl<'a> HeaderGroup<'a> {
    /// Returns the header name, if the first line is a well-formed header.
    pub fn name(&self) -> Option<&'a str> {
        let first = self.lines.first()?;
        if first.starts_with([' ', '\t']) {
            return None;
        }
        let (key, _) = first.split_once(':')?;
        Some(key.trim())
    }

    /// Tests the header name against `name`, ASCII case-insensitive.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Returns the unfolded header value: the value portion of the first
    /// line joined with the trimmed continuation lines by single spaces.
    pub fn value(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.lines.len());
        if let Some(first) = self.lines.first() {
            if let Some((_, value)) = first.split_once(':') {
                parts.push(value.trim());
            }
        }
        for continuation in self.lines.iter().skip(1) {
            parts.push(continuation.trim());
        }
        parts.retain(|part| !part.is_empty());
        parts.join(" ")
    }

    /// Returns the physical lines of this group, verbatim.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

/// Splits a header section into ordered logical header groups.
///
/// Physical lines are split on the detected line break. A line beginning
/// with space or tab is a folded continuation and stays attached to the
/// preceding group; a leading orphan continuation forms its own group.
///
/// # Examples
///
/// ```rust
/// use mailvia_utils::{header_groups, LineBreak};
///
/// let groups = header_groups(
///     "DKIM-Signature: v=1;\r\n\tb=abc123\r\nTo: x@y.com",
///     LineBreak::CrLf,
/// );
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].lines().len(), 2);
/// assert_eq!(groups[0].value(), "v=1; b=abc123");
/// assert!(groups[1].name_matches("to"));
/// ```
pub fn header_groups(header_section: &str, line_break: LineBreak) -> Vec<HeaderGroup<'_>> {
    let mut groups: Vec<HeaderGroup<'_>> = Vec::new();
    for line in header_section.split(line_break.as_str()) {
        let is_continuation = line.starts_with([' ', '\t']);
        match groups.last_mut() {
            Some(last) if is_continuation => last.lines.push(line),
            _ => groups.push(HeaderGroup { lines: vec![line] }),
        }
    }
    groups
}
