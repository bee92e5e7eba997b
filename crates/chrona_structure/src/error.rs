//! Errors reported while building and validating a structure configuration.

use crate::path::PathError;
use crate::signal::Role;

/// Errors raised while binding signals to absolute paths.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindingError {
    /// A path is bound as a read source and as a write target.
    #[error("path '{path}' is read by '{reader}' and written by '{writer}'")]
    Conflict {
        /// The doubly bound path.
        path: String,
        /// Signal reading from the path.
        reader: String,
        /// Signal writing to the path.
        writer: String,
    },

    /// A path is bound twice in the same direction.
    #[error("path '{path}' is bound by both '{first}' and '{second}'")]
    DuplicateBinding {
        /// The doubly bound path.
        path: String,
        /// First binding signal, in declaration order.
        first: String,
        /// Second binding signal.
        second: String,
    },

    /// A path does not start at the design-under-test instance.
    #[error("path '{path}' of '{signal}' does not start at instance '{expected_scope}'")]
    Dangling {
        /// The offending path.
        path: String,
        /// Signal carrying the binding.
        signal: String,
        /// The design-under-test instance name.
        expected_scope: String,
    },
}

/// Errors raised while assembling a [`StructureConfig`](crate::StructureConfig).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    /// Two signals share one name in the generated module.
    #[error("signal '{name}' in {role} is already declared in {previous}")]
    DuplicateSignal {
        /// The duplicated name.
        name: String,
        /// Role of the second declaration.
        role: Role,
        /// Role of the first declaration.
        previous: Role,
    },

    /// A user signal takes a name the generated module declares itself.
    #[error("signal '{name}' in {role} uses a reserved name")]
    ReservedName {
        /// The reserved name.
        name: String,
        /// Declaring role.
        role: Role,
    },

    /// Width outside `1..=64`, or a clock wider than one bit.
    #[error("signal '{name}' in {role} has invalid width {width}")]
    InvalidWidth {
        /// Signal name.
        name: String,
        /// Declaring role.
        role: Role,
        /// The rejected width.
        width: u32,
    },

    /// The signal kind does not belong in the role it was added to.
    #[error("signal '{name}' cannot be declared in {role}")]
    KindMismatch {
        /// Signal name.
        name: String,
        /// The rejecting role.
        role: Role,
    },

    /// The name is not a SystemVerilog identifier.
    #[error("'{name}' in {role} is not a valid identifier")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Declaring role.
        role: Role,
    },

    /// A derived clock declares only one half of the gating pair.
    #[error("derived clock '{clock}' declares {present} without {missing}")]
    UnpairedGating {
        /// The derived clock name.
        clock: String,
        /// Attachment that was given.
        present: &'static str,
        /// Attachment that is missing.
        missing: &'static str,
    },

    /// A configured path could not be parsed.
    #[error("invalid path for '{signal}' in {role}: {source}")]
    InvalidPath {
        /// Signal name.
        signal: String,
        /// Declaring role.
        role: Role,
        /// Parse failure.
        source: PathError,
    },

    /// An analog signal has no fixed-point exponent.
    #[error("analog signal '{name}' in {role} requires an exponent")]
    MissingExponent {
        /// Signal name.
        name: String,
        /// Declaring role.
        role: Role,
    },

    /// A digital signal or clock carries an exponent.
    #[error("signal '{name}' in {role} does not take an exponent")]
    UnexpectedExponent {
        /// Signal name.
        name: String,
        /// Declaring role.
        role: Role,
    },

    /// A clock that lives only in the generated module carries a path.
    #[error("signal '{name}' in {role} cannot be bound to a path")]
    UnexpectedPath {
        /// Signal name.
        name: String,
        /// Declaring role.
        role: Role,
    },

    /// Binding validation failed.
    #[error(transparent)]
    Binding(#[from] BindingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_both_roles() {
        let err = StructureError::DuplicateSignal {
            name: "v_in".to_string(),
            role: Role::AnalogProbes,
            previous: Role::AnalogCtrlInputs,
        };
        assert_eq!(
            err.to_string(),
            "signal 'v_in' in analog_probes is already declared in analog_ctrl_inputs"
        );
    }

    #[test]
    fn unpaired_gating_message() {
        let err = StructureError::UnpairedGating {
            clock: "clk_a".to_string(),
            present: "gated_clk",
            missing: "gated_clk_req",
        };
        assert_eq!(
            err.to_string(),
            "derived clock 'clk_a' declares gated_clk without gated_clk_req"
        );
    }

    #[test]
    fn binding_errors_are_transparent() {
        let err: StructureError = BindingError::Conflict {
            path: "tb_i.x".to_string(),
            reader: "p".to_string(),
            writer: "c".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "path 'tb_i.x' is read by 'p' and written by 'c'");
    }
}
