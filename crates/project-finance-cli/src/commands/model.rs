use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use project_finance_core::model::{self, ProjectParameters};

use crate::input;

/// Arguments for a full model run
#[derive(Args)]
pub struct ModelArgs {
    /// Path to a JSON or YAML parameter file (stdin is read when piped)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the discount rate from the parameter file
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Override the tax rate from the parameter file
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Override the terminal growth rate from the parameter file
    #[arg(long)]
    pub terminal_growth: Option<Decimal>,
}

pub fn run_model(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut params: ProjectParameters = if let Some(ref path) = args.input {
        input::file::read_params(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file is required (or pipe parameters via stdin)".into());
    };

    if let Some(rate) = args.discount_rate {
        params.discount_rate = rate;
    }
    if let Some(rate) = args.tax_rate {
        params.tax_rate = rate;
    }
    if let Some(growth) = args.terminal_growth {
        params.terminal_growth_rate = growth;
    }

    let result = model::run_model(&params)?;
    Ok(serde_json::to_value(result)?)
}
