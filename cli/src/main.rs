mod commands;
mod terminal;

use commands::{CommandLine, Commands, expand, sweep};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);

    match commands.command {
        Commands::Sweep(args) => {
            print::header("getting ready for sweep", commands.quiet);
            sweep::sweep(args, commands.quiet).await
        }
        Commands::Expand { range } => {
            print::header("expanding range", commands.quiet);
            expand::expand(&range)
        }
    }
}
