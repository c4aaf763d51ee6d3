use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "shorts")]
#[command(about = "Publish a video as a YouTube Short with a two-option poll")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format for the result envelope
	#[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Json)]
	pub format: OutputFormat,

	/// Publisher config file (JSON)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(flatten)]
	pub overrides: ConfigOverrides,

	#[command(subcommand)]
	pub command: Commands,
}

/// Flags that win over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
	/// Automation server host
	#[arg(long, global = true)]
	pub host: Option<String>,

	/// Automation server port
	#[arg(long, global = true)]
	pub port: Option<u16>,

	/// Forward automation server output to the log
	#[arg(long, global = true)]
	pub show_server_logs: bool,

	/// Leave a server started by this run running afterwards
	#[arg(long, global = true)]
	pub keep_server: bool,

	/// UI locator table to use instead of the builtin one
	#[arg(long, global = true, value_name = "FILE")]
	pub ui_table: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Upload a video as a Short with a poll sticker
	Publish(PublishArgs),

	/// Inspect or run the automation server
	Server {
		#[command(subcommand)]
		action: ServerAction,
	},

	/// Print the effective UI locator table as JSON
	UiTable {
		/// Table file to load instead of the configured one
		#[arg(long, value_name = "FILE")]
		file: Option<PathBuf>,
	},
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("poll").required(true).args(["options", "story"])))]
pub struct PublishArgs {
	/// Video file to upload
	pub video: PathBuf,

	/// Caption for the Short
	#[arg(long)]
	pub caption: String,

	/// Poll option; give it twice
	#[arg(long = "option", value_name = "TEXT")]
	pub options: Vec<String>,

	/// Story JSON whose first two `choices` become the poll options
	#[arg(long, value_name = "FILE", conflicts_with = "options")]
	pub story: Option<PathBuf>,

	/// Poll question
	#[arg(long)]
	pub question: Option<String>,

	/// Poll duration in days (1, 3 or 7)
	#[arg(long, value_name = "DAYS")]
	pub duration_days: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum ServerAction {
	/// Report whether a server answers on the configured endpoint
	Status,
	/// Start (or reuse) the server and keep it up until Ctrl-C
	Run,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_valid() {
		Cli::command().debug_assert();
	}

	#[test]
	fn publish_with_two_options() {
		let cli = Cli::try_parse_from([
			"shorts", "publish", "clip.mp4", "--caption", "Episode 1", "--option", "Left", "--option", "Right", "--duration-days", "3",
		])
		.unwrap();

		let Commands::Publish(args) = cli.command else {
			panic!("expected publish");
		};
		assert_eq!(args.video, PathBuf::from("clip.mp4"));
		assert_eq!(args.options, ["Left", "Right"]);
		assert_eq!(args.duration_days, Some(3));
		assert_eq!(cli.format, OutputFormat::Json);
	}

	#[test]
	fn publish_requires_options_or_story() {
		let err = Cli::try_parse_from(["shorts", "publish", "clip.mp4", "--caption", "x"]).unwrap_err();
		assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
	}

	#[test]
	fn options_and_story_conflict() {
		let err = Cli::try_parse_from(["shorts", "publish", "clip.mp4", "--caption", "x", "--option", "a", "--story", "s.json"]).unwrap_err();
		assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
	}

	#[test]
	fn global_flags_after_subcommand() {
		let cli = Cli::try_parse_from(["shorts", "server", "status", "--port", "4800", "-f", "text", "-vv"]).unwrap();

		assert!(matches!(
			cli.command,
			Commands::Server {
				action: ServerAction::Status
			}
		));
		assert_eq!(cli.overrides.port, Some(4800));
		assert_eq!(cli.format, OutputFormat::Text);
		assert_eq!(cli.verbose, 2);
	}
}
