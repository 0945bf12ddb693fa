//! Nickname validation (RFC 2812 section 2.3.1).

/// Maximum nickname length accepted for reservations.
pub const DEFAULT_NICK_MAX_LEN: usize = 30;

/// Extension trait for checking if a string is a valid IRC nickname.
pub trait NickExt {
    /// First character a letter or special, the rest letters, digits,
    /// specials or `-`, at most [`DEFAULT_NICK_MAX_LEN`] characters.
    fn is_valid_nick(&self) -> bool;
}

#[inline]
fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

impl NickExt for str {
    fn is_valid_nick(&self) -> bool {
        if self.is_empty() || self.len() > DEFAULT_NICK_MAX_LEN {
            return false;
        }

        let mut chars = self.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        if !first.is_ascii_alphabetic() && !is_special(first) {
            return false;
        }

        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_nicks() {
        assert!("bob".is_valid_nick());
        assert!("Bob123".is_valid_nick());
        assert!("[cool]".is_valid_nick());
        assert!("_under-score_".is_valid_nick());
    }

    #[test]
    fn test_invalid_nicks() {
        assert!(!"".is_valid_nick());
        assert!(!"123bob".is_valid_nick());
        assert!(!"bob smith".is_valid_nick());
        assert!(!"#channel".is_valid_nick());
        assert!(!"a".repeat(31).as_str().is_valid_nick());
    }
}
