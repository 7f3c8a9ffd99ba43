//! codegen/output.rs
//! Line-oriented source writer.
//!
//! Indentation follows bracket nesting: a line ending in `{`, `(` or `[`
//! opens a level, a line starting with `}`, `)` or `]` closes one. Comment
//! lines never change the level. Callers write unindented lines and get
//! consistently formatted Rust back.

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct Output {
    buf: String,
    depth: usize,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line.
    pub fn l(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref().trim();
        if line.is_empty() {
            self.buf.push('\n');
            return;
        }
        let is_comment = line.starts_with("//");
        if !is_comment && line.starts_with(&['}', ')', ']'][..]) {
            self.depth = self.depth.saturating_sub(1);
        }
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(line);
        self.buf.push('\n');
        if !is_comment && line.ends_with(&['{', '(', '['][..]) {
            self.depth += 1;
        }
    }

    /// Write an empty line followed by `line`.
    pub fn ll(&mut self, line: impl AsRef<str>) {
        self.buf.push('\n');
        self.l(line);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
