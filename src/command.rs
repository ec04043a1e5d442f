//! Translate a validated request into generator command-line arguments.

use std::fmt;
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::models::{Source, ValidatedRequest};

const TOKEN_FLAG: &str = "-t";

/// A single generator run: program, ordered arguments, working directory.
///
/// The environment is not captured here; the child inherits the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Build the generator command for `request`.
///
/// `-n` is only emitted for an explicitly supplied name. A derived name is
/// left for the generator to work out on its own.
pub fn build_command(config: &GeneratorConfig, request: &ValidatedRequest) -> CommandInvocation {
    let mut args = vec![config.script.to_string_lossy().to_string()];

    match &request.source {
        Source::Remote(url) => {
            push_flag(&mut args, "--repo", url);
            if let Some(token) = &request.token {
                push_flag(&mut args, TOKEN_FLAG, token);
            }
        }
        Source::Local(dir) => push_flag(&mut args, "--dir", dir),
    }

    if let Some(name) = &request.name {
        push_flag(&mut args, "-n", name);
    }
    push_flag(&mut args, "-o", &request.output);
    if let Some(max_size) = request.max_size {
        push_flag(&mut args, "-s", &max_size.to_string());
    }
    for pattern in &request.include {
        push_flag(&mut args, "-i", pattern);
    }
    for pattern in &request.exclude {
        push_flag(&mut args, "-e", pattern);
    }

    CommandInvocation {
        program: config.interpreter.clone(),
        args,
        working_dir: config.working_dir.clone(),
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

/// Space-joined command line for logs, with the token value masked.
impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                write!(f, " ****")?;
            } else {
                write!(f, " {}", arg)?;
            }
            mask_next = arg == TOKEN_FLAG;
        }
        Ok(())
    }
}
