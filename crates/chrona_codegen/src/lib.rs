//! Rendering of the emulation harness.
//!
//! [`ModuleAssembler`] turns one target's [`StructureConfig`] into the text
//! of the generated top module. Rendering is a pure function of its inputs:
//! the same structure always produces byte-identical output.
//! [`harness_defines`] yields the macros that module expects, and
//! [`generate_all`] runs both for every target of a project.
//!
//! [`StructureConfig`]: chrona_structure::StructureConfig

#![warn(missing_docs)]

pub mod defines;
pub mod error;
pub mod generate;
pub mod sv;
pub mod top;

pub use defines::{harness_defines, render_defines, Define};
pub use error::CodegenError;
pub use generate::{generate_all, generate_target, GeneratedTarget};
pub use sv::{ModuleInst, SvWriter};
pub use top::ModuleAssembler;
