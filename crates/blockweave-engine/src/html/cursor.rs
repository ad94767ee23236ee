/// A byte cursor over markup with position tracking.
///
/// Callers only stop at ASCII structural bytes, so every index handed to
/// [`Cursor::slice`] lies on a UTF-8 character boundary.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.s.len())..].starts_with(pat)
    }

    /// ASCII case-insensitive [`Cursor::starts_with`].
    pub fn starts_with_ignore_case(&self, pat: &[u8]) -> bool {
        let rest = &self.s.as_bytes()[self.i.min(self.s.len())..];
        rest.len() >= pat.len() && rest[..pat.len()].eq_ignore_ascii_case(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes, clamped to the end of input.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Advances while `pred` holds and returns the consumed slice.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.i += 1;
        }
        self.slice(start, self.i)
    }

    /// Advances to the next occurrence of `pat` (or end of input) and returns
    /// the skipped slice. The cursor is left on the first byte of `pat`.
    pub fn take_until(&mut self, pat: &[u8]) -> &'a str {
        let start = self.i;
        while !self.eof() && !self.starts_with(pat) {
            self.i += 1;
        }
        self.slice(start, self.i)
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(|b| b.is_ascii_whitespace());
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.s[start..end]
    }
}
