//! STOMP frame construction and parsing.
//!
//! A frame is a command line, zero or more `key:value` header lines, a blank
//! line, and the body. Header keys are not required to be unique on the wire;
//! lookups return the first match.

use std::fmt;

/// A single STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    /// Headers in wire order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First header with the given key, if any.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a raw frame. Header lines split on the first colon only, with
    /// both sides trimmed; lines without a colon are dropped. Everything
    /// after the first blank line is the body, verbatim.
    pub fn parse(raw: &str) -> Frame {
        let (head, body) = match raw.split_once("\n\n") {
            Some((head, body)) => (head, body),
            None => (raw, ""),
        };

        let mut lines = head.lines();
        let command = lines.next().unwrap_or("").trim().to_string();

        let mut headers = Vec::new();
        for line in lines {
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Frame {
            command,
            headers,
            body: body.to_string(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.command)?;
        for (key, value) in &self.headers {
            writeln!(f, "{}:{}", key, value)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.body)
    }
}
