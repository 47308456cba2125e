//! Command-line front-end
//!
//! `blasmodcli <game> <command> [args]`. Every command has its own argument
//! struct; commands acting on one mod embed [`ModArgs`].

use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};

use crate::config::AppConfig;
use crate::console;
use crate::context::TaskContext;
use crate::database;
use crate::error::{Error, Result};
use crate::games::{known_games, Game, GameRegistry};
use crate::http::{Fetcher, UreqFetcher};
use crate::logging::{init_logger, log_error, log_info, log_warning};
use crate::manager::{ModManager, UnusedDependenciesAction};
use crate::mods::ModState;

/// Mod manager for Blasphemous and Blasphemous 2
#[derive(Parser, Debug)]
#[command(name = "blasmodcli")]
#[command(version)]
pub struct Cli {
    /// Game to manage
    #[arg(value_parser = PossibleValuesParser::new(known_games::keys()))]
    pub game: String,

    /// Answer "yes" to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the mod inside the Modding folder, thus activating it
    Activate(ActivateArgs),

    /// Back up your saves into an archive
    Backup(BackupArgs),

    /// Delete the 'Modding' directory, deactivating every mod at once
    Clear(ClearArgs),

    /// Download and extract the modding tools inside the game's folder
    Configure,

    /// Remove the mod's plugin file from the Modding folder, thus deactivating it
    Deactivate(DeactivateArgs),

    /// Display information about a mod
    Info(ModArgs),

    /// Download a mod and its dependencies
    Install(InstallArgs),

    /// Show every mod available (or installed, or activated)
    List(ListArgs),

    /// List every mod whose name or description contains one of the terms
    Search(SearchArgs),

    /// Delete the mod's archive and plugin file
    Uninstall(UninstallArgs),

    /// Refresh the mod database and check the modding tools version
    Update,

    /// Upgrade every installed mod (or the given one) to its latest version
    Upgrade(UpgradeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ModArgs {
    /// Name of the mod
    pub mod_name: String,
}

#[derive(Args, Debug)]
pub struct ActivateArgs {
    #[command(flatten)]
    pub target: ModArgs,

    /// Extract the mod again even if it is already activated
    #[arg(short, long)]
    pub reactivate: bool,

    /// Do not activate the mods this one depends on
    #[arg(short = 'n', long = "not-recursive", action = ArgAction::SetFalse)]
    pub recursive: bool,
}

#[derive(Args, Debug)]
pub struct DeactivateArgs {
    #[command(flatten)]
    pub target: ModArgs,

    /// Only deactivate this mod, leaving dependents and dependencies alone
    #[arg(short = 'n', long = "not-recursive", action = ArgAction::SetFalse)]
    pub recursive: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: ModArgs,

    /// Download the mod again even if it is already installed
    #[arg(short, long)]
    pub force: bool,

    /// Do not activate the mod after the installation
    #[arg(short = 'd', long = "do-not-activate", action = ArgAction::SetFalse)]
    pub activate_after: bool,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    #[command(flatten)]
    pub target: ModArgs,

    /// What to do with dependencies no other mod needs anymore
    #[arg(
        short = 'u',
        long = "unused-dependencies-action",
        visible_alias = "unused-deps",
        value_enum,
        default_value_t = UnusedDependenciesAction::Deactivate
    )]
    pub unused_dependencies_action: UnusedDependenciesAction,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only installed mods
    #[arg(short, long, conflicts_with_all = ["activated", "state"])]
    pub installed: bool,

    /// Only activated mods
    #[arg(short, long, conflicts_with = "state")]
    pub activated: bool,

    /// Minimum state of the listed mods
    #[arg(long, value_enum)]
    pub state: Option<ModState>,
}

impl ListArgs {
    pub fn floor(&self) -> ModState {
        if self.activated {
            ModState::Activated
        } else if self.installed {
            ModState::Installed
        } else {
            self.state.unwrap_or_default()
        }
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Terms to look for (any of them may match)
    pub terms: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Destination directory, or the complete path of the archive
    #[arg(short, long)]
    pub destination: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Only upgrade this mod
    pub mod_name: Option<String>,
}

/// Parse-independent entry point of the binary
pub fn run(cli: Cli) -> ExitCode {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => return ExitCode::from(report(&Err(e))),
    };

    let registry = GameRegistry::new(&config);
    let Some(game) = registry.get(&cli.game) else {
        let unknown = Error::Config(format!("unknown game '{}'", cli.game));
        return ExitCode::from(report(&Err(unknown)));
    };

    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => ExitCode::from(report(&Err(Error::io("stdout", e)))),
        };
    };

    let log_file = init_logger(&game.paths.tool_dirs.state.join("logs"), game.tool_name(), game.name());
    log_info(&format!("{:?} (log file: {})", command, log_file.display()));

    let ctx = console::task_context(cli.yes || config.assume_yes);
    let fetcher = UreqFetcher::new(&config.user_agent());
    let result = execute(game, command, &fetcher, &ctx);
    ExitCode::from(report(&result))
}

/// Print the outcome of a command and return its exit status
pub fn report(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(Error::AlreadyDone(message)) => {
            console::success(message);
            0
        }
        Err(Error::Cancelled(message)) => {
            console::error(message);
            0
        }
        Err(e) => {
            log_error(&format!("{}: {}", e.kind(), e));
            console::error(&format!("{}: {}", e.kind(), e));
            1
        }
    }
}

/// Run one command against `game`
pub fn execute(game: &Game, command: Command, fetcher: &dyn Fetcher, ctx: &TaskContext) -> Result<()> {
    match command {
        Command::Activate(args) => {
            ModManager::load(game, fetcher, ctx)?.activate(&args.target.mod_name, args.reactivate, args.recursive)
        }
        Command::Backup(args) => game.backup_saves(args.destination.as_deref(), ctx).map(drop),
        Command::Clear(args) => game.clear_modding_directory(args.force, ctx),
        Command::Configure => game.modding_tools().configure(game, fetcher, ctx).map(drop),
        Command::Deactivate(args) => {
            ModManager::load(game, fetcher, ctx)?.deactivate(&args.target.mod_name, args.recursive)
        }
        Command::Info(args) => {
            let info = ModManager::load(game, fetcher, ctx)?.info(&args.mod_name)?;
            println!("{}", console::table(&info.rows()));
            Ok(())
        }
        Command::Install(args) => ModManager::load(game, fetcher, ctx)?.install(
            &args.target.mod_name,
            args.activate_after,
            args.force,
        ),
        Command::List(args) => {
            let floor = args.floor();
            let manager = ModManager::load(game, fetcher, ctx)?;
            for m in manager.list(floor) {
                let installed = match floor {
                    ModState::None => None,
                    _ => m.installed_version(&game.paths.mods_dir),
                };
                println!("{}", console::mod_lines(m, installed.as_ref()));
            }
            Ok(())
        }
        Command::Search(args) => {
            let manager = ModManager::load(game, fetcher, ctx)?;
            for m in manager.search(&args.terms) {
                println!("{}", console::mod_lines(m, None));
            }
            Ok(())
        }
        Command::Uninstall(args) => ModManager::load(game, fetcher, ctx)?
            .uninstall(&args.target.mod_name, args.unused_dependencies_action),
        Command::Update => {
            if let Err(e) = game.modding_tools().check_for_update(fetcher, ctx) {
                log_warning(&format!("Modding tools check failed: {}", e));
                ctx.warning(format!("Unable to check the modding tools version: {}", e));
            }
            database::update(game, fetcher, ctx).map(drop)
        }
        Command::Upgrade(args) => ModManager::load(game, fetcher, ctx)?
            .upgrade(args.mod_name.as_deref())
            .map(drop),
    }
}
