use std::fmt;

use crate::TimedToken;

/// Render a run of tokens the way it would read in a caption.
///
/// Punctuation is glued onto the preceding word, everything else is space separated.
pub struct CleanTokens<'a>(pub &'a [TimedToken]);

impl<'a> fmt::Display for CleanTokens<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, token) in self.0.iter().enumerate() {
            if idx != 0 && token.is_pronunciation() {
                f.write_str(" ")?;
            }
            write!(f, "{}", CleanToken(token))?;
        }
        Ok(())
    }
}

/// A single token with caption dashes and stray line breaks removed.
pub struct CleanToken<'a>(pub &'a TimedToken);

impl<'a> fmt::Display for CleanToken<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.0.text.lines().enumerate() {
            if idx != 0 {
                f.write_str(" ")?;
            }
            let text = line.trim().trim_start_matches('-').trim();
            f.write_str(text)?;
        }
        Ok(())
    }
}
