//! sync subcommand: LaTeX back to formula text.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use formtex_session::latex_to_formula;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// LaTeX to rewrite (reads stdin if omitted)
    pub latex: Option<String>,
}

pub fn run(args: SyncArgs) -> Result<ExitCode> {
    let latex = super::read_input(args.latex)?;
    println!("{}", latex_to_formula(&latex));
    Ok(ExitCode::SUCCESS)
}
