//! Indented text buffer for module text.

/// Accumulates lines of WebAssembly text at the current nesting depth.
#[derive(Clone, Debug, Default)]
pub struct WatWriter {
    indent: usize,
    output: String,
}

impl WatWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose first line starts `indent` levels deep.
    pub fn with_indent(indent: usize) -> Self {
        WatWriter {
            indent,
            output: String::with_capacity(1024),
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.indent
    }

    /// Write one line at the current depth.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Write each instruction on its own line.
    ///
    /// `block`, `loop`, `if` and `else` open a nesting level; `end` and
    /// `else` close one.
    pub fn instructions<S: AsRef<str>>(&mut self, code: &[S]) {
        for instr in code {
            let instr = instr.as_ref();
            let opcode = instr.split_whitespace().next().unwrap_or_default();
            if matches!(opcode, "end" | "else") {
                self.dedent();
            }
            self.line(instr);
            if matches!(opcode, "block" | "loop" | "if" | "else") {
                self.indent();
            }
        }
    }

    /// Append text that is already indented and newline-terminated.
    pub fn raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Take the generated text, leaving the buffer empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

#[cfg(test)]
mod tests;
