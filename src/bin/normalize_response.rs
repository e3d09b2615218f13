use anyhow::Context;
use clap::Parser;
use leaf_diagnosis::normalize;
use leaf_diagnosis::utils::logger;
use std::io::Read;

#[derive(Parser)]
#[command(name = "normalize-response")]
#[command(about = "Normalize a saved plant.id response into a diagnosis result")]
struct Args {
    /// Raw response JSON file; reads stdin when omitted
    input: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let content = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read response file '{}'", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read response from stdin")?;
            buffer
        }
    };

    let raw: serde_json::Value =
        serde_json::from_str(&content).context("response is not valid JSON")?;
    let result = normalize(&raw);
    tracing::debug!("Normalized as {}", result.disease_type());

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    Ok(())
}
