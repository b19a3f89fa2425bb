//! Output buffering for renderers.

/// Sink renderers print into.
pub trait Printer {
    fn print(&mut self, text: &str);

    fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }
}

/// In-memory printer, the default target of every rendering helper.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringPrinter {
    buffer: String,
}

impl StringPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl Printer for StringPrinter {
    fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

impl Printer for String {
    fn print(&mut self, text: &str) {
        self.push_str(text);
    }
}
