use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsectErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl XsectErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Crate-level error carried to the CLI boundary.
///
/// `placeholder` is a stable dotted code (`INPUT.DILUENT`, `RUN.LADDER`, ...)
/// that scripts can match on independently of the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsectError {
    category: XsectErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl XsectError {
    pub fn new(
        category: XsectErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            XsectErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(XsectErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(XsectErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(XsectErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> XsectErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for XsectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for XsectError {}

#[cfg(test)]
mod tests {
    use super::{XsectError, XsectErrorCategory};

    #[test]
    fn exit_codes_are_stable_per_category() {
        let cases = [
            (
                XsectErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (XsectErrorCategory::IoSystemError, 3, "IoSystemError"),
            (XsectErrorCategory::ComputationError, 4, "ComputationError"),
            (XsectErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn diagnostic_lines_carry_placeholder_and_exit_code() {
        let error = XsectError::computation("RUN.LADDER", "Gamma0 unresolved");
        assert_eq!(error.diagnostic_line(), "ERROR: [RUN.LADDER] Gamma0 unresolved");
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 4");
        assert_eq!(
            error.to_string(),
            "ComputationError [RUN.LADDER] Gamma0 unresolved"
        );
    }

    #[test]
    fn every_category_exits_nonzero() {
        let errors = [
            XsectError::input_validation("INPUT.CONFIG", "bad"),
            XsectError::io_system("IO.TABLE", "missing"),
            XsectError::computation("RUN.LINE", "failed"),
            XsectError::internal("RUN.OUTPUT", "mismatch"),
        ];
        for error in errors {
            assert!(error.exit_code() >= 2);
            assert!(error.diagnostic_line().starts_with("ERROR: ["));
        }
    }
}
