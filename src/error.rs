/// Failure categories surfaced to the user.
///
/// The exit code of the binary is derived from the kind, so scripts can tell
/// "bad input file" apart from "not enough data" without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The data source could not be opened or parsed.
    LoadFailure,
    /// Fewer valid rows than the analysis requires.
    InsufficientData { found: usize },
    /// Degenerate input to a z-score or regression (zero variance, etc.).
    UndefinedStatistic,
    /// Writing an export, SVG, or drawing the terminal failed.
    Output,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::LoadFailure => 2,
            ErrorKind::InsufficientData { .. } => 3,
            ErrorKind::UndefinedStatistic => 4,
            ErrorKind::Output => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LoadFailure, message)
    }

    pub fn undefined(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedStatistic, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Output, message)
    }

    /// Too few rows survived filtering; `fields` names what every row needed.
    pub fn insufficient_data(found: usize, fields: &[&str]) -> Self {
        Self::new(
            ErrorKind::InsufficientData { found },
            format!(
                "Insufficient data: only {found} rows have all required fields ({}).",
                fields.join(", ")
            ),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
