//! Command-line arguments for `coderun`.

use std::path::PathBuf;

use clap::Parser;
use coderun_core::language::{self, Language};

/// Run a source file on a remote code-execution service.
#[derive(Parser, Debug)]
#[command(name = "coderun", version)]
pub struct Cli {
    /// Language short name (e.g. cpp, python, rust) or numeric id.
    #[arg(
        value_parser = language::resolve,
        required_unless_present = "languages"
    )]
    pub language: Option<&'static Language>,

    /// Source file to submit.
    #[arg(required_unless_present = "languages")]
    pub source_file: Option<PathBuf>,

    /// File with the program's input; `-` reads standard input.
    pub stdin_file: Option<PathBuf>,

    /// List the supported languages and exit.
    #[arg(
        long,
        short,
        conflicts_with_all = ["language", "source_file", "stdin_file"]
    )]
    pub languages: bool,
}

/// What the binary was asked to do.
#[derive(Debug, PartialEq)]
pub enum Action {
    ListLanguages,
    Run(RunArgs),
}

#[derive(Debug, PartialEq)]
pub struct RunArgs {
    pub language: &'static Language,
    pub source_path: PathBuf,
    pub stdin: StdinSource,
}

/// Where the program's custom input comes from.
#[derive(Debug, PartialEq)]
pub enum StdinSource {
    Empty,
    File(PathBuf),
    /// The process's own standard input.
    Inherit,
}

impl Cli {
    pub fn into_action(self) -> Action {
        // clap requires both positionals unless --languages is given.
        let (false, Some(language), Some(source_path)) =
            (self.languages, self.language, self.source_file)
        else {
            return Action::ListLanguages;
        };

        let stdin = match self.stdin_file {
            None => StdinSource::Empty,
            Some(path) if path.as_os_str() == "-" => StdinSource::Inherit,
            Some(path) => StdinSource::File(path),
        };

        Action::Run(RunArgs {
            language,
            source_path,
            stdin,
        })
    }
}
