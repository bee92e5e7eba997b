//! Line-oriented SystemVerilog text emission.

use chrona_structure::Signal;

const INDENT: &str = "    ";

/// An append-only text buffer with indentation tracking.
#[derive(Debug, Default)]
pub struct SvWriter {
    buf: String,
    level: usize,
}

impl SvWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Writes a `//` comment line.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        self.line(format!("// {}", text.as_ref()));
    }

    /// Increases the indentation by one level.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decreases the indentation by one level.
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Declares `signal` as a `logic` of its width and signedness.
    pub fn declare(&mut self, signal: &Signal) {
        self.line(format!("{} {};", logic_type(signal.width(), signal.is_signed()), signal.name()));
    }

    /// Consumes the writer and returns its text.
    pub fn into_string(self) -> String {
        self.buf
    }
}

/// Formats a `logic` type: `logic`, `logic [7:0]` or `logic signed [17:0]`.
pub fn logic_type(width: u32, signed: bool) -> String {
    let sign = if signed { " signed" } else { "" };
    if width == 1 && !signed {
        "logic".to_string()
    } else {
        format!("logic{sign} [{}:0]", width.saturating_sub(1))
    }
}

/// A module instantiation with named parameters and named port connections.
#[derive(Debug, Clone)]
pub struct ModuleInst {
    module: String,
    instance: String,
    params: Vec<(String, String)>,
    ports: Vec<(String, String)>,
}

impl ModuleInst {
    /// Starts an instantiation of `module` named `instance`.
    pub fn new(module: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            instance: instance.into(),
            params: Vec::new(),
            ports: Vec::new(),
        }
    }

    /// Adds a parameter override.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Connects a port to an expression.
    pub fn port(mut self, name: impl Into<String>, connection: impl Into<String>) -> Self {
        self.ports.push((name.into(), connection.into()));
        self
    }

    /// Connects each signal to the port of the same name.
    pub fn same_name_ports<'a>(mut self, signals: impl IntoIterator<Item = &'a Signal>) -> Self {
        for signal in signals {
            self.ports
                .push((signal.name().to_string(), signal.name().to_string()));
        }
        self
    }

    /// Writes the instantiation.
    pub fn render(&self, w: &mut SvWriter) {
        if self.params.is_empty() {
            w.line(format!("{} {} (", self.module, self.instance));
        } else {
            w.line(format!("{} #(", self.module));
            write_connections(w, &self.params);
            w.line(format!(") {} (", self.instance));
        }
        write_connections(w, &self.ports);
        w.line(");");
    }
}

fn write_connections(w: &mut SvWriter, connections: &[(String, String)]) {
    w.indent();
    for (i, (name, value)) in connections.iter().enumerate() {
        let sep = if i + 1 < connections.len() { "," } else { "" };
        w.line(format!(".{name}({value}){sep}"));
    }
    w.dedent();
}
