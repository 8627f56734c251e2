use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// A call-time argument was missing or malformed.
    #[error("Invalid argument '{name}': {reason}.")]
    InvalidArgument { name: &'static str, reason: String },

    /// The template evaluator failed while compiling or executing a template.
    #[error("Failed to render. Original error: {0}")]
    EvaluatorFault(#[from] minijinja::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YAMLParseError(#[from] serde_yaml::Error),

    #[error("No configuration file found in '{config_dir}'. Tried: {config_files}.")]
    ConfigNotFound { config_dir: String, config_files: String },
}

impl Error {
    /// Shorthand for building an [`Error::InvalidArgument`].
    ///
    /// # Arguments
    /// * `name` - The argument that was rejected
    /// * `reason` - Why it was rejected
    ///
    /// # Returns
    /// * `Error` - An [`Error::InvalidArgument`] naming the argument
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument { name, reason: reason.into() }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
