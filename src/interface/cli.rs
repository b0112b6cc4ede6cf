use std::ffi::OsString;
use std::path::PathBuf;

use clap::App;
use thiserror::Error;

/// Everything the command line can change.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub shader: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    /// How many times `-v` was passed.
    pub verbosity: u64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("--{arg} expects a positive whole number, got \"{value}\"")]
    InvalidNumber { arg: &'static str, value: String },
}

/// Parses the arguments this process was started with.
pub fn config_from_env() -> Result<Config, ConfigError> {
    config_from(std::env::args_os())
}

/// Parses `args`, where the first item is the program name.
pub fn config_from<I, T>(args: I) -> Result<Config, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let yaml = load_yaml!("cli.yaml");
    let matches = App::from_yaml(yaml).get_matches_from_safe(args)?;

    Ok(Config {
        // Every value has a default in cli.yaml
        shader: PathBuf::from(matches.value_of_os("shader").unwrap_or_default()),
        width: dimension(&matches, "width")?,
        height: dimension(&matches, "height")?,
        title: matches.value_of("title").unwrap_or_default().to_owned(),
        vsync: !matches.is_present("no-vsync"),
        verbosity: matches.occurrences_of("verbose"),
    })
}

fn dimension(matches: &clap::ArgMatches<'_>, arg: &'static str) -> Result<u32, ConfigError> {
    let value = matches.value_of(arg).unwrap_or_default();
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { arg, value: value.to_owned() }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = config_from(vec!["glquad"]).unwrap();

        assert_eq!(config.shader, PathBuf::from("res/shaders/basic.shader"));
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.title, "glquad");
        assert!(config.vsync);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn everything_can_be_overridden() {
        let config = config_from(vec![
            "glquad", "--shader", "other.shader", "--width", "800", "--height", "600",
            "-t", "Quad", "--no-vsync", "-vv",
        ])
        .unwrap();

        assert_eq!(config.shader, PathBuf::from("other.shader"));
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.title, "Quad");
        assert!(!config.vsync);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn bad_dimensions_are_rejected() {
        let error = config_from(vec!["glquad", "--width", "wide"]).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidNumber { arg: "width", .. }));

        let error = config_from(vec!["glquad", "--height", "0"]).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidNumber { arg: "height", .. }));
    }

    #[test]
    fn unknown_flags_are_a_clap_error() {
        let error = config_from(vec!["glquad", "--fullscreen"]).unwrap_err();
        assert!(matches!(error, ConfigError::Cli(_)));
    }
}
