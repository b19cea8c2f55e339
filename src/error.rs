use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that end the program, each with its own exit status
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not determine the terminal size")]
    TerminalSize,

    #[error("could not set up the screen: {0}")]
    Screen(#[source] io::Error),

    #[error("could not enable mouse input: {0}")]
    Input(#[source] io::Error),

    #[error("terminal I/O failed: {0:#}")]
    Runtime(anyhow::Error),

    #[error("could not open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not install the logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl StartupError {
    pub fn exit_code(&self) -> u8 {
        match self {
            StartupError::TerminalSize => 1,
            StartupError::Screen(_) => 2,
            StartupError::Input(_) => 3,
            StartupError::Runtime(_) => 4,
            StartupError::LogFile { .. } | StartupError::Logger(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_stage_has_its_own_exit_code() {
        let io_err = || io::Error::other("boom");
        let codes = [
            StartupError::TerminalSize.exit_code(),
            StartupError::Screen(io_err()).exit_code(),
            StartupError::Input(io_err()).exit_code(),
            StartupError::Runtime(anyhow::anyhow!("lost tty")).exit_code(),
            StartupError::LogFile {
                path: PathBuf::from("x.log"),
                source: io_err(),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn runtime_error_keeps_context_chain() {
        let err = anyhow::anyhow!("broken pipe").context("failed to draw frame");
        let msg = StartupError::Runtime(err).to_string();
        assert!(msg.contains("failed to draw frame"));
        assert!(msg.contains("broken pipe"));
    }
}
