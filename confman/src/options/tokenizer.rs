//! Splitting of comma-separated option values.

/// The platform escape character: `^` on Windows, `\` elsewhere.
#[cfg(windows)]
pub const DEFAULT_ESCAPE: char = '^';
/// The platform escape character: `^` on Windows, `\` elsewhere.
#[cfg(not(windows))]
pub const DEFAULT_ESCAPE: char = '\\';

/// Splits a delimited value into its elements.
///
/// Text between quotes is taken literally, including delimiters. The escape
/// character makes the following delimiter, quote or escape character
/// literal; before any other character it is kept as is.
///
/// # Examples
///
/// ```
/// use confman::options::Tokenizer;
///
/// let tokenizer = Tokenizer::default();
/// assert_eq!(tokenizer.split(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
/// assert_eq!(tokenizer.split("a,,b"), vec!["a", "", "b"]);
/// assert!(tokenizer.split("").is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    delimiter: char,
    quote: char,
    escape: char,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(',', '"', DEFAULT_ESCAPE)
    }
}

impl Tokenizer {
    /// A tokenizer with explicit special characters.
    #[must_use]
    pub const fn new(delimiter: char, quote: char, escape: char) -> Self {
        Self {
            delimiter,
            quote,
            escape,
        }
    }

    /// The delimiter character.
    #[must_use]
    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The escape character.
    #[must_use]
    pub const fn escape(&self) -> char {
        self.escape
    }

    /// Splits `input` into elements. Empty input has no elements.
    #[must_use]
    pub fn split(&self, input: &str) -> Vec<String> {
        if input.is_empty() {
            return Vec::new();
        }

        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c == self.escape {
                match chars.peek() {
                    Some(&next) if self.is_special(next) => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(c),
                }
            } else if c == self.quote {
                quoted = !quoted;
            } else if c == self.delimiter && !quoted {
                tokens.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        tokens.push(current);
        tokens
    }

    /// Joins `items` so that [`split`](Self::split) returns them again.
    #[must_use]
    pub fn join<S: AsRef<str>>(&self, items: &[S]) -> String {
        let mut out = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(self.delimiter);
            }
            for c in item.as_ref().chars() {
                if self.is_special(c) {
                    out.push(self.escape);
                }
                out.push(c);
            }
        }
        out
    }

    fn is_special(&self, c: char) -> bool {
        c == self.delimiter || c == self.quote || c == self.escape
    }
}
