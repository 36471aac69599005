//! Error types for binding declaration and wire conversion.
//!
//! Two classes only: [`BindError`] for problems detected while a binding is
//! being declared (these abort registration, never a live call), and
//! [`WireError`] for conversion or dispatch problems inside a synthesized
//! trampoline. Unrecoverable boundary misuse does not go through either of
//! these; it goes through the fatal channel in [`crate::protocol`].

use thiserror::Error;

/// Errors raised while declaring a binding.
#[derive(Debug, Error)]
pub enum BindError {
    /// The process-wide registration entry point was invoked twice.
    #[error("bindings already installed for this process")]
    AlreadyInstalled,

    /// A raw-pointer slot was declared without a covering policy.
    /// Slot 0 is the return type, slot 1 the first argument.
    #[error("raw pointer at slot {position} requires an explicit policy")]
    RawPointerNotPermitted { position: usize },

    /// An enum value name was registered twice on the same enum.
    #[error("duplicate value `{name}` on enum `{enum_name}`")]
    DuplicateEnumValue { enum_name: String, name: String },

    /// A member name was registered twice on the same owner.
    #[error("duplicate member `{name}` on `{owner}`")]
    DuplicateMember { owner: String, name: String },
}

/// Errors raised inside a synthesized trampoline.
#[derive(Debug, Error)]
pub enum WireError {
    /// A wire value did not carry the expected representation.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer did not fit the declared native width.
    #[error("integer overflow: value {value} does not fit in {target}")]
    IntegerOverflow { value: i64, target: &'static str },

    /// The caller supplied the wrong number of wire arguments.
    #[error("argument count mismatch: expected {expected}, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// An object token referred to a slot that has been freed.
    #[error("stale object token: slot {index} has been freed")]
    StaleToken { index: u32 },

    /// An object token resolved to an instance of a different type.
    #[error("object token type mismatch: expected {expected}")]
    TokenTypeMismatch { expected: &'static str },

    /// A member trampoline was invoked without an owner object.
    #[error("invoker requires an owner object")]
    MissingOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_messages() {
        let err = BindError::RawPointerNotPermitted { position: 1 };
        assert!(err.to_string().contains("slot 1"));

        let err = BindError::DuplicateEnumValue {
            enum_name: "Color".into(),
            name: "Red".into(),
        };
        assert!(err.to_string().contains("Red"));
        assert!(err.to_string().contains("Color"));
    }

    #[test]
    fn wire_error_messages() {
        let err = WireError::TypeMismatch {
            expected: "int32",
            actual: "string",
        };
        assert!(err.to_string().contains("int32"));

        let err = WireError::ArityMismatch {
            expected: 2,
            actual: 3,
        };
        assert!(err.to_string().contains("expected 2"));
    }
}
