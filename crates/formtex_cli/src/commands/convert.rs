//! convert subcommand handler.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::debug;

use formtex_session::{
    convert_with, preview_font_size, ColorMap, ConversionError, ConvertOptions, InputMode,
};

use crate::json_types::{ConvertJsonOutput, ErrorJsonOutput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Formula to convert (reads stdin if omitted)
    pub formula: Option<String>,

    /// Highlight a subexpression: EXPR=COLOR, e.g. "(x+2)=#ff0000" (repeatable)
    #[arg(short, long = "color", value_name = "EXPR=COLOR")]
    pub colors: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// TOML options file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat the input as LaTeX and pass it through
    #[arg(long)]
    pub latex_mode: bool,

    /// Accept braces: x_{12}, y^{2}
    #[arg(long)]
    pub allow_braces: bool,

    /// Print required \usepackage lines before the LaTeX (text format)
    #[arg(long)]
    pub with_preamble: bool,
}

fn load_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ConvertOptions::from_toml_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ConvertOptions::default(),
    };

    if args.latex_mode {
        options.mode = InputMode::Latex;
    }
    if args.allow_braces {
        options.dialect.allow_braces = true;
    }
    Ok(options)
}

/// `EXPR=COLOR` pairs; the last `=` separates the color.
fn parse_colors(pairs: &[String]) -> Result<ColorMap> {
    let mut colors = ColorMap::new();
    for pair in pairs {
        let Some((expr, color)) = pair.rsplit_once('=') else {
            bail!("invalid --color '{pair}': expected EXPR=COLOR");
        };
        if expr.trim().is_empty() || color.trim().is_empty() {
            bail!("invalid --color '{pair}': expected EXPR=COLOR");
        }
        colors.insert(expr.trim().to_string(), color.trim().to_string());
    }
    Ok(colors)
}

fn print_error(input: &str, err: &ConversionError, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&ErrorJsonOutput::new(input, err))?);
        }
        OutputFormat::Text => {
            eprintln!("{err}");
            if let Some(d) = err.diagnostic() {
                if let Some(part) = d.highlighted(input) {
                    eprintln!("  at {}: '{part}'", d.span);
                }
            }
        }
    }
    Ok(())
}

pub fn run(args: ConvertArgs) -> Result<ExitCode> {
    let options = load_options(&args)?;
    let colors = parse_colors(&args.colors)?;
    let input = super::read_input(args.formula.clone())?;
    debug!(mode = ?options.mode, colors = colors.len(), "convert");

    match convert_with(&input, &colors, &options) {
        Ok(latex) => {
            match args.format {
                OutputFormat::Json => {
                    let size = preview_font_size(latex.body());
                    let out = ConvertJsonOutput::new(&input, &latex, size);
                    println!("{}", serde_json::to_string(&out)?);
                }
                OutputFormat::Text if args.with_preamble => println!("{}", latex.to_prefixed()),
                OutputFormat::Text => println!("{latex}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_error(&input, &err, args.format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors_splits_on_last_equals() {
        let colors = parse_colors(&["y = x=red".to_string(), "(x+2)=#ff0000".to_string()])
            .unwrap();
        assert_eq!(colors.get("y = x").map(String::as_str), Some("red"));
        assert_eq!(colors.get("(x+2)").map(String::as_str), Some("#ff0000"));
    }

    #[test]
    fn test_parse_colors_rejects_malformed() {
        assert!(parse_colors(&["x".to_string()]).is_err());
        assert!(parse_colors(&["=red".to_string()]).is_err());
    }
}
