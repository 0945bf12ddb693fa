//! Raw IRC line splitting.
//!
//! Borrowed view over a single protocol line: optional `:source`, the
//! command word and its parameters, with a trailing `:` parameter kept
//! intact. IRCv3 tags are skipped; the uplink never needs them.

/// A parsed protocol line borrowing from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub source: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// Parse a line. Returns `None` for empty input or a missing command.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut rest = raw.trim_end_matches(['\r', '\n']).trim_start();

        if rest.starts_with('@') {
            let (_, after) = rest.split_once(' ')?;
            rest = after.trim_start();
        }

        let source = if let Some(stripped) = rest.strip_prefix(':') {
            let (src, after) = stripped.split_once(' ')?;
            rest = after.trim_start();
            Some(src)
        } else {
            None
        };

        let (command, mut rest) = match rest.split_once(' ') {
            Some((cmd, after)) => (cmd, after),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing);
                break;
            }
            match rest.split_once(' ') {
                Some((param, after)) => {
                    params.push(param);
                    rest = after;
                }
                None => {
                    params.push(rest);
                    break;
                }
            }
        }

        Some(Self {
            source,
            command,
            params,
        })
    }

    /// Get a parameter by index.
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.params.get(idx).copied()
    }
}
