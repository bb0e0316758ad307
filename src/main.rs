//! Kolosal Explain - Main Entry Point

use clap::Parser;
use kolosal_explain::cli::{cmd_explain, cmd_psi, Cli, Commands, ExplainArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_explain=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            data,
            model,
            target,
            score_data,
            sample_index,
            config,
            templates,
            task,
            top_k,
            n_repeats,
            seed,
            name,
            output,
        } => {
            cmd_explain(ExplainArgs {
                data,
                model,
                target,
                score_data,
                sample_index,
                config,
                templates,
                task,
                top_k,
                n_repeats,
                seed,
                name,
                output,
            })?;
        }
        Commands::Psi { reference, comparison, bins, output } => {
            cmd_psi(&reference, &comparison, bins, output.as_deref())?;
        }
    }

    Ok(())
}
