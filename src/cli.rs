//! Positional CLI argument parsing.
//!
//! `program <input> <output> <num-colors> [<polygon-error> <show-interactive>
//! <smooth-edges>]` — no named flags. Built on `clap`'s builder API rather
//! than its `Parser` derive, so argument-count and value errors can be
//! folded into [`VectorizeError::Input`] instead of clap's own
//! process-exiting behavior.

use crate::error::{Result, VectorizeError};
use crate::pipeline::PipelineConfig;
use clap::{Arg, Command};
use std::ffi::OsString;
use std::path::PathBuf;

pub struct ParsedArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: PipelineConfig,
    pub show_interactive: bool,
}

fn command() -> Command {
    Command::new("img2svg")
        .about("Vectorize a raster image into an SVG document")
        .arg(Arg::new("input").index(1).required(true))
        .arg(Arg::new("output").index(2).required(true))
        .arg(Arg::new("num-colors").index(3).required(true))
        .arg(Arg::new("polygon-error").index(4).required(false))
        .arg(Arg::new("show-interactive").index(5).required(false))
        .arg(Arg::new("smooth-edges").index(6).required(false))
}

fn parse_bool_flag(name: &str, raw: Option<&String>, default: bool) -> Result<bool> {
    match raw {
        None => Ok(default),
        Some(s) if s == "true" => Ok(true),
        Some(s) if s == "false" => Ok(false),
        Some(s) => Err(VectorizeError::Input(format!(
            "{name} must be \"true\" or \"false\", got {s:?}"
        ))),
    }
}

/// Parse CLI arguments (including argv[0]) into a [`ParsedArgs`].
pub fn parse_args<I, T>(args: I) -> Result<ParsedArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command()
        .try_get_matches_from(args)
        .map_err(|e| VectorizeError::Input(e.to_string()))?;

    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());

    let colors_raw = matches.get_one::<String>("num-colors").unwrap();
    let palette_size: usize = colors_raw
        .parse()
        .ok()
        .filter(|&k: &usize| k >= 1)
        .ok_or_else(|| {
            VectorizeError::Input(format!("num-colors must be an integer >= 1, got {colors_raw:?}"))
        })?;

    let error_tolerance = match matches.get_one::<String>("polygon-error") {
        None => 5.0,
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|&t| t >= 0.0)
            .ok_or_else(|| VectorizeError::Input(format!("polygon-error must be a float >= 0, got {s:?}")))?,
    };

    let show_interactive = parse_bool_flag(
        "show-interactive",
        matches.get_one::<String>("show-interactive"),
        false,
    )?;
    let smooth_edges = parse_bool_flag(
        "smooth-edges",
        matches.get_one::<String>("smooth-edges"),
        false,
    )?;

    Ok(ParsedArgs {
        input,
        output,
        config: PipelineConfig {
            palette_size,
            error_tolerance,
            smooth_edges,
        },
        show_interactive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("img2svg".to_string())
            .chain(v.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn minimal_three_args_uses_defaults() {
        let parsed = parse_args(args(&["in.png", "out.svg", "8"])).unwrap();
        assert_eq!(parsed.config.palette_size, 8);
        assert_eq!(parsed.config.error_tolerance, 5.0);
        assert!(!parsed.show_interactive);
        assert!(!parsed.config.smooth_edges);
    }

    #[test]
    fn all_six_args_parsed() {
        let parsed = parse_args(args(&["in.png", "out.svg", "4", "2.5", "true", "true"])).unwrap();
        assert_eq!(parsed.config.palette_size, 4);
        assert_eq!(parsed.config.error_tolerance, 2.5);
        assert!(parsed.show_interactive);
        assert!(parsed.config.smooth_edges);
    }

    #[test]
    fn fewer_than_three_args_is_an_error() {
        assert!(parse_args(args(&["in.png", "out.svg"])).is_err());
    }

    #[test]
    fn more_than_six_args_is_an_error() {
        assert!(parse_args(args(&["in.png", "out.svg", "8", "5.0", "true", "false", "extra"])).is_err());
    }

    #[test]
    fn zero_palette_size_is_rejected() {
        assert!(parse_args(args(&["in.png", "out.svg", "0"])).is_err());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        assert!(parse_args(args(&["in.png", "out.svg", "8", "-1.0"])).is_err());
    }

    #[test]
    fn malformed_bool_is_rejected() {
        assert!(parse_args(args(&["in.png", "out.svg", "8", "5.0", "yes"])).is_err());
    }
}
