//! Absolute hierarchical references into the design-under-test.
//!
//! A [`HierPath`] is parsed once from configuration text such as
//! `tb_i.filter_i.v_out` into a scope (the design-under-test instance) and the
//! relative segments below it. Rendering joins the parts back with `.`.

use std::fmt;

/// Errors produced while parsing a hierarchical path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path text is empty.
    #[error("empty hierarchical path")]
    Empty,

    /// The path names only a scope, not a signal below it.
    #[error("hierarchical path '{0}' has no segments below its scope")]
    NoSegments(String),

    /// One of the dot-separated parts is not a valid identifier.
    #[error("invalid segment '{segment}' in hierarchical path '{path}'")]
    InvalidSegment {
        /// The full path text.
        path: String,
        /// The offending segment.
        segment: String,
    },
}

/// A typed absolute reference: a scope plus at least one relative segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HierPath {
    scope: String,
    segments: Vec<String>,
}

impl HierPath {
    /// Parses dotted text such as `tb_i.dut.sig`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PathError::Empty);
        }
        let mut parts = text.split('.');
        let scope = parts.next().unwrap_or_default().to_string();
        let path = Self {
            scope,
            segments: parts.map(str::to_string).collect(),
        };
        path.check()?;
        Ok(path)
    }

    /// Returns the scope, i.e. the instance the path starts from.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the segments below the scope.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn check(&self) -> Result<(), PathError> {
        if self.segments.is_empty() {
            return Err(PathError::NoSegments(self.scope.clone()));
        }
        for part in std::iter::once(&self.scope).chain(&self.segments) {
            if !is_segment(part) {
                return Err(PathError::InvalidSegment {
                    path: self.to_string(),
                    segment: part.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for HierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope)?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// IEEE 1800-2017 reserved keywords, sorted.
const KEYWORDS: &[&str] = &[
    "accept_on", "alias", "always", "always_comb", "always_ff", "always_latch", "and",
    "assert", "assign", "assume", "automatic", "before", "begin", "bind", "bins", "binsof",
    "bit", "break", "buf", "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell",
    "chandle", "checker", "class", "clocking", "cmos", "config", "const", "constraint",
    "context", "continue", "cover", "covergroup", "coverpoint", "cross", "deassign",
    "default", "defparam", "design", "disable", "dist", "do", "edge", "else", "end",
    "endcase", "endchecker", "endclass", "endclocking", "endconfig", "endfunction",
    "endgenerate", "endgroup", "endinterface", "endmodule", "endpackage", "endprimitive",
    "endprogram", "endproperty", "endsequence", "endspecify", "endtable", "endtask",
    "enum", "event", "eventually", "expect", "export", "extends", "extern", "final",
    "first_match", "for", "force", "foreach", "forever", "fork", "forkjoin", "function",
    "generate", "genvar", "global", "highz0", "highz1", "if", "iff", "ifnone",
    "ignore_bins", "illegal_bins", "implements", "implies", "import", "incdir", "include",
    "initial", "inout", "input", "inside", "instance", "int", "integer", "interconnect",
    "interface", "intersect", "join", "join_any", "join_none", "large", "let", "liblist",
    "library", "local", "localparam", "logic", "longint", "macromodule", "matches",
    "medium", "modport", "module", "nand", "negedge", "nettype", "new", "nexttime", "nmos",
    "nor", "noshowcancelled", "not", "notif0", "notif1", "null", "or", "output", "package",
    "packed", "parameter", "pmos", "posedge", "primitive", "priority", "program",
    "property", "protected", "pull0", "pull1", "pulldown", "pullup",
    "pulsestyle_ondetect", "pulsestyle_onevent", "pure", "rand", "randc", "randcase",
    "randsequence", "rcmos", "real", "realtime", "ref", "reg", "reject_on", "release",
    "repeat", "restrict", "return", "rnmos", "rpmos", "rtran", "rtranif0", "rtranif1",
    "s_always", "s_eventually", "s_nexttime", "s_until", "s_until_with", "scalared",
    "sequence", "shortint", "shortreal", "showcancelled", "signed", "small", "soft",
    "solve", "specify", "specparam", "static", "string", "strong", "strong0", "strong1",
    "struct", "super", "supply0", "supply1", "sync_accept_on", "sync_reject_on", "table",
    "tagged", "task", "this", "throughout", "time", "timeprecision", "timeunit", "tran",
    "tranif0", "tranif1", "tri", "tri0", "tri1", "triand", "trior", "trireg", "type",
    "typedef", "union", "unique", "unique0", "unsigned", "until", "until_with", "untyped",
    "use", "uwire", "var", "vectored", "virtual", "void", "wait", "wait_order", "wand",
    "weak", "weak0", "weak1", "while", "wildcard", "wire", "with", "within", "wor", "xnor",
    "xor",
];

/// Returns `true` for a SystemVerilog reserved keyword.
fn is_keyword(s: &str) -> bool {
    KEYWORDS.binary_search(&s).is_ok()
}

/// Returns `true` for a simple SystemVerilog identifier that is not a keyword.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') && !is_keyword(s)
}

/// An identifier optionally followed by one constant index, e.g. `gen_ch[3]`.
fn is_segment(s: &str) -> bool {
    match s.split_once('[') {
        None => is_identifier(s),
        Some((ident, rest)) => {
            let Some(index) = rest.strip_suffix(']') else {
                return false;
            };
            is_identifier(ident) && !index.is_empty() && index.chars().all(|c| c.is_ascii_digit())
        }
    }
}
