use {
    anyhow::{Context, Result},
    clap::{CommandFactory, Parser},
    env_logger::Env,
    orphaned_dns::{args::Args, run},
    std::process::ExitCode,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Eval args
    let args = Args::parse();
    let Some(input) = args.input() else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let summary = run(&args, input).await.context("DNS audit aborted")?;

    if summary.failures > 0 {
        eprintln!(
            "{} lookup(s) did not complete, results are incomplete.",
            summary.failures
        );
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
