use mail_parser::{HeaderValue, Message, MessageParser, MimeHeaders};
use thiserror::Error;

/// Input is not a well-formed email message. No partial result is produced.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("message could not be parsed as a valid email message")]
pub struct ParseError;

/// Read-only view over a parsed message. All analyzers work against this
/// snapshot; none of them touch the raw bytes again.
pub struct ParsedMail<'a> {
    msg: Message<'a>,
}

impl<'a> ParsedMail<'a> {
    pub fn parse(raw: &'a [u8]) -> Result<Self, ParseError> {
        let msg = MessageParser::default().parse(raw).ok_or(ParseError)?;
        Ok(ParsedMail { msg })
    }

    /// True when a header with this name exists, regardless of its value.
    pub fn has_header(&self, name: &str) -> bool {
        self.msg
            .headers()
            .iter()
            .any(|h| h.name().eq_ignore_ascii_case(name))
    }

    /// Number of Received headers, one per relay hop.
    pub fn received_hops(&self) -> usize {
        self.msg
            .headers()
            .iter()
            .filter(|h| h.name().eq_ignore_ascii_case("received"))
            .count()
    }

    /// Decoded body text: plain part preferred, stripped HTML fallback,
    /// empty string when the message has neither.
    pub fn body_text(&self) -> String {
        if let Some(text) = self.msg.body_text(0) {
            return text.to_string();
        }
        if let Some(html) = self.msg.body_html(0) {
            return strip_html(html.as_ref());
        }
        String::new()
    }

    /// Filenames of all named attachment parts, in message order.
    pub fn attachment_names(&self) -> Vec<String> {
        self.msg
            .attachments()
            .filter_map(|part| part.attachment_name())
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect()
    }

    pub fn from_display(&self) -> String {
        self.msg
            .from()
            .and_then(|addr| addr.first())
            .and_then(|a| a.address())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn return_path_display(&self) -> String {
        self.header_text("return-path")
            .unwrap_or_else(|| "Not provided".to_string())
    }

    pub fn subject_display(&self) -> String {
        self.msg
            .subject()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "No subject".to_string())
    }

    fn header_text(&self, name: &str) -> Option<String> {
        let header = self
            .msg
            .headers()
            .iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))?;

        match header.value() {
            HeaderValue::Text(text) => Some(text.to_string()),
            HeaderValue::TextList(list) => Some(
                list.iter()
                    .map(|s| s.as_ref())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            HeaderValue::Address(addr) => addr
                .first()
                .and_then(|a| a.address())
                .map(|s| s.to_string()),
            _ => None,
        }
    }
}

/// Strip HTML tags and collapse whitespace (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"From: Alice <alice@example.com>\r\n\
Return-Path: <bounce@example.com>\r\n\
Subject: Quarterly report\r\n\
Received: from a.example.com by b.example.com; Mon, 1 Jan 2024 00:00:00 +0000\r\n\
Received: from b.example.com by c.example.com; Mon, 1 Jan 2024 00:00:01 +0000\r\n\
DKIM-Signature: v=1; a=rsa-sha256; d=example.com; s=sel;\r\n\
Content-Type: text/plain\r\n\
\r\n\
Please find the report attached.\r\n";

    #[test]
    fn test_parse_error_on_empty_input() {
        assert!(ParsedMail::parse(b"").is_err());
    }

    #[test]
    fn test_header_presence_is_case_insensitive() {
        let mail = ParsedMail::parse(SAMPLE).unwrap();
        assert!(mail.has_header("dkim-signature"));
        assert!(mail.has_header("DKIM-Signature"));
        assert!(!mail.has_header("received-spf"));
        assert!(!mail.has_header("dmarc"));
    }

    #[test]
    fn test_received_hops_counts_headers() {
        let mail = ParsedMail::parse(SAMPLE).unwrap();
        assert_eq!(mail.received_hops(), 2);
    }

    #[test]
    fn test_sender_metadata() {
        let mail = ParsedMail::parse(SAMPLE).unwrap();
        assert_eq!(mail.from_display(), "alice@example.com");
        assert_eq!(mail.subject_display(), "Quarterly report");
    }

    #[test]
    fn test_metadata_defaults_when_headers_missing() {
        let mail = ParsedMail::parse(b"To: someone@example.com\r\n\r\nhi\r\n").unwrap();
        assert_eq!(mail.from_display(), "Unknown");
        assert_eq!(mail.return_path_display(), "Not provided");
        assert_eq!(mail.subject_display(), "No subject");
    }

    #[test]
    fn test_body_text_prefers_plain() {
        let mail = ParsedMail::parse(SAMPLE).unwrap();
        assert!(mail.body_text().contains("report attached"));
    }

    #[test]
    fn test_body_text_empty_when_no_body() {
        let mail = ParsedMail::parse(b"Subject: empty\r\n\r\n").unwrap();
        assert_eq!(mail.body_text(), "");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello</p>"), "Hello");
        assert_eq!(
            strip_html("<div><b>verify</b> your   account</div>"),
            "verify your account"
        );
        assert_eq!(strip_html("no markup"), "no markup");
    }

    #[test]
    fn test_attachment_names() {
        let raw = b"From: a@b.c\r\n\
Subject: files\r\n\
Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
\r\n\
--b1\r\n\
Content-Type: text/plain\r\n\
\r\n\
See attached.\r\n\
--b1\r\n\
Content-Type: application/octet-stream; name=\"invoice.pdf.exe\"\r\n\
Content-Disposition: attachment; filename=\"invoice.pdf.exe\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
AAAA\r\n\
--b1--\r\n";
        let mail = ParsedMail::parse(raw).unwrap();
        assert_eq!(mail.attachment_names(), vec!["invoice.pdf.exe".to_string()]);
    }
}
