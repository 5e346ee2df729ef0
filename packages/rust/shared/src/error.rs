//! Failures a link-resolution run can hit.
//!
//! Unmatched links are not errors; they are logged and left alone. What ends
//! up here is a broken config, a stale link handle, a bad manifest, or a
//! source file that could not be read or replaced. The CLI reports these
//! through `color-eyre`.

use std::path::PathBuf;

/// Everything the library crates return in `Err`.
#[derive(Debug, thiserror::Error)]
pub enum SmartLinksError {
    /// No home directory for `~/.smartlinks`, or `smartlinks.toml` does not
    /// parse or serialize as [`AppConfig`](crate::AppConfig).
    #[error("config error: {message}")]
    Config { message: String },

    /// A link handle does not address the content it is applied to, e.g. the
    /// content was rewritten after extraction.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Reading or atomically replacing a file failed.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The corpus manifest is not valid JSON, or two documents share a slug.
    #[error("manifest error: {message}")]
    Manifest { message: String },
}

/// Shorthand for `Result<T, SmartLinksError>`.
pub type Result<T> = std::result::Result<T, SmartLinksError>;

impl SmartLinksError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest {
            message: msg.into(),
        }
    }

    /// Attach the file being read or written.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_category() {
        let cases = [
            (
                SmartLinksError::config("rewrite_source must be a boolean"),
                "config error: rewrite_source must be a boolean",
            ),
            (
                SmartLinksError::parse("link handle 4..9 does not address this content"),
                "parse error: link handle 4..9 does not address this content",
            ),
            (
                SmartLinksError::manifest("duplicate slug 'intro'"),
                "manifest error: duplicate slug 'intro'",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn io_error_names_path() {
        let err = SmartLinksError::io(
            "content/post.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("content/post.md"));
        assert!(msg.contains("gone"));
    }
}
