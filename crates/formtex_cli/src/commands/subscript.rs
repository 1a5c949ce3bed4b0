//! subscript subcommand.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use formtex_session::attach_subscript;

#[derive(Args, Debug)]
pub struct SubscriptArgs {
    /// Formula to edit
    pub formula: String,

    /// Parameter to subscript
    #[arg(short, long)]
    pub param: String,

    /// Subscript text (letters and digits)
    #[arg(short, long)]
    pub sub: String,
}

pub fn run(args: SubscriptArgs) -> Result<ExitCode> {
    match attach_subscript(&args.formula, &args.param, &args.sub) {
        Ok(edited) => {
            println!("{edited}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
