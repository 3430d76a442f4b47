use clap::{CommandFactory, Parser};

mod capture;
mod classify;
mod commands;
mod core;
mod model;
mod synth;

use commands::Commands;
use core::exit_code::ExitCode;
use core::settings::Settings;

#[derive(Parser)]
#[command(name = "mcpgen")]
#[command(
    about = "Generate MCP proxy servers from captured HTTP traffic. Defaults to 'create' if no subcommand is provided."
)]
#[command(version = crate::core::version::app_version())]
struct Args {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,

    #[arg(short, long, help = "Path to a JSON file overriding the heuristics", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
#[command(name = "mcpgen")]
struct DefaultArgs {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,

    #[arg(short, long, help = "Path to a JSON file overriding the heuristics", global = true)]
    config: Option<String>,

    #[arg(short, long, help = "Analyze the capture instead of generating a server")]
    analyze: bool,

    #[command(flatten)]
    format: commands::shared::FormatArgs,

    #[command(flatten)]
    create_args: commands::create::CreateArgs,
}

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<clap::Error>() {
            Some(usage) => {
                let _ = usage.print();
            }
            None => eprintln!("Error: {e}"),
        }
        let exit_code = ExitCode::from(&e);
        std::process::exit(exit_code.code());
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().collect();
    let is_subcommand = argv
        .get(1)
        .is_some_and(|arg| commands::SUBCOMMAND_NAMES.contains(&arg.as_str()));

    match Args::try_parse() {
        Ok(args) => {
            let Some(command) = args.command else {
                Args::command().print_help()?;
                println!();
                return Ok(());
            };
            core::logger::init(args.debug);
            let settings = Settings::load_optional(args.config.as_deref())?;
            match command {
                Commands::Analyze(analyze_args) => {
                    commands::analyze::execute(&analyze_args, &settings)
                }
                Commands::Create(create_args) => commands::create::execute(&create_args, &settings),
            }
        }
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.print()?;
            Ok(())
        }
        Err(e) if is_subcommand => Err(e.into()),
        Err(_) => {
            let default_args = match DefaultArgs::try_parse() {
                Ok(default_args) => default_args,
                Err(e)
                    if e.kind() == clap::error::ErrorKind::DisplayHelp
                        || e.kind() == clap::error::ErrorKind::DisplayVersion =>
                {
                    e.print()?;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            core::logger::init(default_args.debug);
            let settings = Settings::load_optional(default_args.config.as_deref())?;
            if default_args.analyze {
                let analyze_args = commands::analyze::AnalyzeArgs {
                    capture: default_args.create_args.capture,
                    format: default_args.format,
                };
                commands::analyze::execute(&analyze_args, &settings)
            } else {
                commands::create::execute(&default_args.create_args, &settings)
            }
        }
    }
}
