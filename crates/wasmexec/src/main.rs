use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use wasmexec::capability::Utf8;
use wasmexec::cli::Cli;
use wasmexec::cli::USAGE;
use wasmexec::launcher::LaunchConfig;

fn init_logging() {
    // Guest stdout is the program's output; keep logs on stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wasmexec=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> Result<LaunchConfig, ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprint!("{err}");
            eprintln!("{USAGE}");
            return Err(ExitCode::from(1));
        }
    };
    cli.into_config(&Utf8).ok_or_else(|| {
        eprintln!("{USAGE}");
        ExitCode::from(1)
    })
}

async fn try_main(config: LaunchConfig) -> anyhow::Result<ExitCode> {
    let status = wasmexec::launcher::run(config).await?;
    Ok(status.into())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match parse_args() {
        Ok(config) => config,
        Err(code) => return code,
    };

    match try_main(config).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}
