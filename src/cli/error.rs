//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        e if e.is_internal_inconsistency() => crate::exitcode::SOFTWARE,
        ApplicationError::Domain(_)
        | ApplicationError::Wire { .. }
        | ApplicationError::DuplicateNames { .. } => crate::exitcode::DATAERR,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => match source.downcast_ref::<std::io::Error>() {
            Some(io) if io.kind() == std::io::ErrorKind::NotFound => crate::exitcode::NOINPUT,
            _ => crate::exitcode::IOERR,
        },
        _ => crate::exitcode::SOFTWARE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MergeCounts;
    use crate::domain::DomainError;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_input(ApplicationError::Domain(DomainError::InvalidInput("x".into())), 65)]
    #[case::wire(ApplicationError::Wire { message: "x".into() }, 65)]
    #[case::duplicates(ApplicationError::DuplicateNames { names: vec!["Hips".into()] }, 65)]
    #[case::config(ApplicationError::Config { message: "x".into() }, 78)]
    #[case::mismatch(
        ApplicationError::CountMismatch { planned: MergeCounts::default(), realized: MergeCounts::default() },
        70
    )]
    #[case::missing_input(
        ApplicationError::OperationFailed {
            context: "read request".into(),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
        },
        66
    )]
    #[case::io(
        ApplicationError::OperationFailed {
            context: "write response".into(),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
        },
        74
    )]
    fn given_application_error_when_mapping_then_sysexits_code(
        #[case] error: ApplicationError,
        #[case] expected: i32,
    ) {
        assert_eq!(CliError::from(error).exit_code(), expected);
    }

    #[test]
    fn given_usage_error_when_mapping_then_usage_code() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
