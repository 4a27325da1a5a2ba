//! Command-line surface. Argument parsing, pid/name validation and
//! diagnostic prose live here, kept separate from the session
//! orchestrator they drive.

use crate::error::Error;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rgetenv",
    about = "Read an environment variable from the live address space of a running process"
)]
pub struct Options {
    /// Process identifier of the target
    #[structopt(short = "p", long = "pid")]
    pub pid: Option<i32>,

    /// Name of the environment variable to read
    #[structopt(short = "e", long = "env")]
    pub name: Option<String>,

    /// Raise the log level to debug regardless of RGETENV_LOG
    #[structopt(short = "v", long = "verbose")]
    pub verbose: bool,
}

impl Options {
    /// Validates that both required flags were supplied.
    pub fn validate(self) -> Result<(i32, String), Error> {
        let pid = self
            .pid
            .ok_or_else(|| Error::BadArgs("must specify a pid with -p".to_string()))?;
        if pid < 0 {
            return Err(Error::BadArgs("pid must be non-negative".to_string()));
        }
        let name = self
            .name
            .ok_or_else(|| Error::BadArgs("must specify an env var with -e".to_string()))?;
        Ok((pid, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_is_rejected() {
        let opts = Options { pid: Some(1), name: None, verbose: false };
        assert_eq!(
            opts.validate().unwrap_err().to_string(),
            "must specify an env var with -e"
        );
    }

    #[test]
    fn missing_pid_is_rejected() {
        let opts = Options { pid: None, name: Some("FOO".into()), verbose: false };
        assert_eq!(
            opts.validate().unwrap_err().to_string(),
            "must specify a pid with -p"
        );
    }

    #[test]
    fn negative_pid_is_rejected() {
        let opts = Options { pid: Some(-1), name: Some("FOO".into()), verbose: false };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn complete_options_validate() {
        let opts = Options { pid: Some(42), name: Some("FOO".into()), verbose: false };
        assert_eq!(opts.validate().unwrap(), (42, "FOO".to_string()));
    }
}
