//! A forward-only character tape over source text.
//!
//! The tape is the single cursor every matcher reads from. It tracks a byte
//! offset into the input and exposes the handful of primitives matchers
//! need: peeking, consuming, prefix checks and delimiter searches. One tape
//! is constructed per tokenization pass and owned exclusively by it.

/// Forward-only cursor over a text buffer.
///
/// Offsets are byte offsets into the original string, so token spans can be
/// used to slice the source directly. The cursor only moves forward during
/// normal consumption; `rewind_to` exists so the owning tokenizer can
/// restore the position after a failed matcher attempt.
#[derive(Debug, Clone)]
pub struct Tape<'a> {
    input: &'a str,
    index: usize,
}

impl<'a> Tape<'a> {
    pub fn new(input: &'a str) -> Self {
        Tape { input, index: 0 }
    }

    /// Current byte offset into the input.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_more(&self) -> bool {
        self.index < self.input.len()
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.index..]
    }

    /// Current character without consuming it, or `None` at end of input.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the current character.
    pub fn next_ch(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += ch.len_utf8();
        Some(ch)
    }

    /// Advance the cursor by `n` bytes.
    pub fn advance(&mut self, n: usize) {
        self.index += n;
    }

    /// Restore the cursor to an earlier position.
    pub fn rewind_to(&mut self, index: usize) {
        debug_assert!(index <= self.index);
        self.index = index;
    }

    pub fn substring(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Check whether `prefix` occurs at the current position, consuming it
    /// only on success.
    pub fn matches(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.index += prefix.len();
            true
        } else {
            false
        }
    }

    /// Advance to the start of the next unescaped occurrence of `pattern`.
    ///
    /// An occurrence preceded by an odd number of backslashes is treated as
    /// escaped and skipped. Returns the offset of the occurrence, or `None`
    /// without moving the cursor when the pattern does not occur again.
    pub fn advance_till(&mut self, pattern: &str) -> Option<usize> {
        let mut from = self.index;
        loop {
            let found = self.input[from..].find(pattern)? + from;
            let num_slashes = self.input[..found]
                .bytes()
                .rev()
                .take_while(|&b| b == b'\\')
                .count();
            if num_slashes % 2 == 0 {
                self.index = found;
                return Some(found);
            }
            from = found + 1;
        }
    }

    /// Advance past the end of the next unescaped occurrence of `pattern`.
    pub fn advance_after(&mut self, pattern: &str) -> Option<usize> {
        self.advance_till(pattern)?;
        self.index += pattern.len();
        Some(self.index)
    }
}
