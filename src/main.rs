use streamtap::cli::{parse_args, run_cli_command, CliCommand, USAGE};
use streamtap::logging;

use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("streamtap: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let verbose = match &command {
        CliCommand::Stream(options) => options.verbose,
        _ => 0,
    };
    logging::init_with(logging::verbosity_filter(verbose));

    let code = run_cli_command(command).await?;
    std::process::exit(code);
}
