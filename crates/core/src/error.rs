//! Error types for pipeline generation.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while projecting a pipeline model to a target
/// configuration.
///
/// All variants are fatal: a generation run either produces a complete,
/// valid configuration or aborts. Absence of optional model data (no
/// dependencies, no caches, no release block) is never an error.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The pipeline's display name could not be resolved from the store.
    #[error("Pipeline name not found in package '{package}'")]
    #[diagnostic(
        code(pipewright::pipeline_not_found),
        help(
            "Ensure the package contains a 'meta' sub-package whose 'doc' attribute carries the pipeline name"
        )
    )]
    PipelineNotFound {
        /// The root package that was queried.
        package: String,
    },

    /// An execution-script statement key does not match the `cmd<N>` pattern.
    #[error("Command key '{key}' in job '{job}' is not in the required cmdN format")]
    #[diagnostic(
        code(pipewright::invalid_command_key),
        help("Name executionScript statements cmd0, cmd1, ... so emission order is well defined")
    )]
    InvalidCommandKey {
        /// The job whose script is malformed.
        job: String,
        /// The offending statement key.
        key: String,
    },

    /// A declared cache instance never acquired a key.
    #[error("Cache key could not be resolved from the model for job '{job}'")]
    #[diagnostic(
        code(pipewright::missing_cache_key),
        help("Every setCache<Name> behavior needs a 'key' custom attribute on its declaration")
    )]
    MissingCacheKey {
        /// The job declaring the keyless cache.
        job: String,
    },

    /// The behavior list of a job could not be retrieved from the store.
    #[error("Could not retrieve the behavior list for job '{job}' from the store")]
    #[diagnostic(
        code(pipewright::behavior_list_unavailable),
        help("The job exists but its behaviors could not be traversed; the model may be corrupt")
    )]
    BehaviorListUnavailable {
        /// The job whose behaviors were requested.
        job: String,
    },

    /// The requested target platform is not supported.
    #[error("Target '{target}' is not supported. Available targets: {available}")]
    #[diagnostic(
        code(pipewright::unsupported_target),
        help("Pass one of the listed targets to --target")
    )]
    UnsupportedTarget {
        /// The requested target name.
        target: String,
        /// Comma-separated list of registered targets.
        available: String,
    },

    /// A store query failed.
    #[error("Store query failed: {message}")]
    #[diagnostic(
        code(pipewright::store_error),
        help("Check the store connection settings and that the model database is reachable")
    )]
    Store {
        /// Description of the underlying failure.
        message: String,
    },

    /// I/O error while writing the generated configuration.
    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(pipewright::io_error),
        help("Check that the output path exists and is writable")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
    },
}

impl Error {
    /// Build a [`Error::Store`] from anything printable.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn pipeline_not_found_names_package() {
        let error = Error::PipelineNotFound {
            package: "deploy".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("Pipeline name not found"));
        assert!(message.contains("deploy"));
    }

    #[test]
    fn invalid_command_key_names_job_and_key() {
        let error = Error::InvalidCommandKey {
            job: "compile".to_string(),
            key: "step1".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("compile"));
        assert!(message.contains("step1"));
        assert!(message.contains("cmdN"));
    }

    #[test]
    fn missing_cache_key_names_job() {
        let error = Error::MissingCacheKey {
            job: "build".to_string(),
        };
        assert!(error.to_string().contains("job 'build'"));
    }

    #[test]
    fn unsupported_target_lists_alternatives() {
        let error = Error::UnsupportedTarget {
            target: "jenkins".to_string(),
            available: "github, gitlab".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("jenkins"));
        assert!(message.contains("github, gitlab"));
    }

    #[test]
    fn io_error_display_with_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = Error::Io {
            source: io_error,
            path: Some(PathBuf::from("/out/pipeline.yml")),
        };

        let message = error.to_string();
        assert!(message.contains("I/O error at /out/pipeline.yml"));
    }

    #[test]
    fn io_error_conversion_has_no_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        match error {
            Error::Io { path, .. } => assert_eq!(path, None),
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn diagnostic_codes_present() {
        let error = Error::store("connection refused");
        assert_eq!(
            error.code().map(|c| c.to_string()),
            Some("pipewright::store_error".to_string())
        );
        assert!(error.help().is_some());
    }

    #[test]
    fn result_alias_works_with_question_mark() {
        fn inner() -> Result<u32> {
            Ok(7)
        }

        fn outer() -> Result<u32> {
            let value = inner()?;
            Ok(value + 1)
        }

        assert_eq!(outer().ok(), Some(8));
    }
}
