use thiserror::Error;

/// Rejected form input. Terminal for the submission; no remote call is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter a valid Age (got {0}).")]
    InvalidAge(u32),

    #[error("Please enter a valid number of study hours per day (got {0}).")]
    InvalidStudyHours(f64),

    #[error("Please select at least one WAEC grade.")]
    NoGrades,

    #[error("WAEC grade code {0} is outside 1-6.")]
    GradeOutOfRange(u8),
}

/// Failure to obtain a prediction from the scoring service.
///
/// Never reaches the user: the orchestrator recovers with the local fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("scoring service disabled")]
    Disabled,

    #[error("network error: {0}")]
    Network(String),

    #[error("scoring service timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("scoring service returned an error: {0}")]
    Status(String),

    #[error("unparsable scoring response: {0}")]
    InvalidBody(String),
}
