use clap::Parser;
use shorts_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let code = commands::dispatch(cli).await;
	if code != 0 {
		std::process::exit(code);
	}
}
