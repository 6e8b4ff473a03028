#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the dungeon crawler and manages maps.

mod config;
mod library;
mod play;
mod share_code;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dungeon_crawler_core::{Facing, LevelData};
use dungeon_crawler_rendering_macroquad::MacroquadBackend;
use dungeon_crawler_system_maze_generation::{generate_random_maze, MazeConfig};
use dungeon_crawler_world::level as world_level;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{
    config::Settings,
    library::{MapLibrary, Origin},
};

/// Ray-cast dungeon crawler with a text command console.
#[derive(Debug, Parser)]
#[command(name = "dungeon-crawler", version)]
struct Cli {
    /// Settings file; defaults to `dungeon-crawler.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Tracing filter directive, overriding `RUST_LOG` (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a window and play a level.
    Play(PlayArgs),
    /// Print a freshly generated maze as JSON.
    Generate(GenerateArgs),
    /// Print an empty walled room as JSON.
    Empty(EmptyArgs),
    /// Check a map file and report the first problem found.
    Validate {
        /// Map file to check.
        path: PathBuf,
    },
    /// Manage saved maps.
    #[command(subcommand)]
    Library(LibraryCommand),
    /// Print a share code for a map file.
    Share {
        /// Map file to encode.
        path: PathBuf,
    },
    /// Decode a share code and print the map as JSON.
    Unshare {
        /// Code produced by `share`.
        code: String,
        /// Write the map here instead of printing it.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Name of a built-in or saved map.
    #[arg(long, conflicts_with_all = ["file", "code", "random"])]
    map: Option<String>,
    /// Map file to load.
    #[arg(long, conflicts_with_all = ["code", "random"])]
    file: Option<PathBuf>,
    /// Share code to load.
    #[arg(long, conflicts_with = "random")]
    code: Option<String>,
    /// Play a generated maze.
    #[arg(long)]
    random: bool,
    #[command(flatten)]
    maze: MazeArgs,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    vsync: bool,
    /// Log frame rate metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self {
            map: None,
            file: None,
            code: None,
            random: false,
            maze: MazeArgs::default(),
            vsync: true,
            show_fps: false,
        }
    }
}

#[derive(Debug, Args)]
struct MazeArgs {
    /// Maze width in tiles.
    #[arg(long, default_value_t = 21)]
    width: u32,
    /// Maze height in tiles.
    #[arg(long, default_value_t = 21)]
    height: u32,
    /// Share of eligible cells that become extra walls, 0.0 to 1.0.
    #[arg(long, default_value_t = dungeon_crawler_system_maze_generation::DEFAULT_COMPLEXITY)]
    complexity: f64,
    /// Seed for reproducible mazes.
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for MazeArgs {
    fn default() -> Self {
        Self {
            width: 21,
            height: 21,
            complexity: dungeon_crawler_system_maze_generation::DEFAULT_COMPLEXITY,
            seed: None,
        }
    }
}

impl MazeArgs {
    fn generate(&self) -> LevelData {
        let mut config =
            MazeConfig::new(self.width, self.height).with_complexity(self.complexity);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        generate_random_maze(config)
    }
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    maze: MazeArgs,
    /// Name stored in the map.
    #[arg(long)]
    name: Option<String>,
    /// Write the map here instead of printing it.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct EmptyArgs {
    /// Room width in tiles.
    #[arg(long, default_value_t = 10)]
    width: u32,
    /// Room height in tiles.
    #[arg(long, default_value_t = 10)]
    height: u32,
    /// Facing at the start marker.
    #[arg(long, value_enum, default_value_t = FacingArg::East)]
    facing: FacingArg,
    /// Name stored in the map.
    #[arg(long)]
    name: Option<String>,
    /// Write the map here instead of printing it.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FacingArg {
    #[value(alias = "n")]
    North,
    #[value(alias = "e")]
    East,
    #[value(alias = "s")]
    South,
    #[value(alias = "w")]
    West,
}

impl From<FacingArg> for Facing {
    fn from(facing: FacingArg) -> Self {
        match facing {
            FacingArg::North => Facing::North,
            FacingArg::East => Facing::East,
            FacingArg::South => Facing::South,
            FacingArg::West => Facing::West,
        }
    }
}

#[derive(Debug, Subcommand)]
enum LibraryCommand {
    /// List built-in and saved maps.
    List,
    /// Save a map file into the library.
    Save {
        /// Map file to store.
        path: PathBuf,
        /// Name to store it under, replacing the file's own name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a saved map.
    Delete {
        /// Name of the map.
        name: String,
    },
    /// Print a library map as JSON.
    Export {
        /// Name of the map.
        name: String,
        /// Write the map here instead of printing it.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Entry point for the dungeon crawler command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Play(PlayArgs::default())) {
        Command::Play(args) => play_command(&settings, args),
        Command::Generate(args) => {
            let mut level = args.maze.generate();
            level.name = args.name;
            write_level(&level, args.output.as_deref())
        }
        Command::Empty(args) => {
            let mut level =
                world_level::create_empty_map(args.width, args.height, args.facing.into());
            level.name = args.name;
            write_level(&level, args.output.as_deref())
        }
        Command::Validate { path } => {
            let level = parse_level_file(&path)?;
            match world_level::validate(&level) {
                Ok(()) => {
                    println!("{}: ok ({}x{})", path.display(), level.width, level.height);
                    Ok(())
                }
                Err(error) => bail!("{}: {error}", path.display()),
            }
        }
        Command::Library(command) => library_command(&settings, command),
        Command::Share { path } => {
            let level = read_level(&path)?;
            println!("{}", share_code::encode(&level)?);
            Ok(())
        }
        Command::Unshare { code, output } => {
            let level = share_code::decode(&code)?;
            write_level(&level, output.as_deref())
        }
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn play_command(settings: &Settings, args: PlayArgs) -> Result<()> {
    let level = if let Some(name) = &args.map {
        let library = MapLibrary::open(settings.library_path())?;
        library
            .get(name)
            .cloned()
            .with_context(|| format!("no map named '{name}'"))?
    } else if let Some(path) = &args.file {
        read_level(path)?
    } else if let Some(code) = &args.code {
        share_code::decode(code)?
    } else if args.random {
        args.maze.generate()
    } else {
        let library = MapLibrary::open(settings.library_path())?;
        library
            .first()
            .cloned()
            .context("map library has no levels")?
    };

    info!(
        name = level.name.as_deref().unwrap_or("unnamed"),
        width = level.width,
        height = level.height,
        "starting play"
    );
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps);
    play::run(settings, level, backend)
}

fn library_command(settings: &Settings, command: LibraryCommand) -> Result<()> {
    let mut library = MapLibrary::open(settings.library_path())?;
    match command {
        LibraryCommand::List => {
            for (origin, level) in library.entries() {
                let origin = match origin {
                    Origin::BuiltIn => "built-in",
                    Origin::User => "user",
                };
                println!(
                    "{:<24} {:>3}x{:<3} {:<8} {}",
                    level.name.as_deref().unwrap_or("(unnamed)"),
                    level.width,
                    level.height,
                    origin,
                    level.created_at.as_deref().unwrap_or("")
                );
            }
        }
        LibraryCommand::Save { path, name } => {
            let mut level = read_level(&path)?;
            if name.is_some() {
                level.name = name;
            }
            library.save(level)?;
        }
        LibraryCommand::Delete { name } => {
            if !library.delete(&name)? {
                bail!("no saved map named '{name}'");
            }
        }
        LibraryCommand::Export { name, output } => {
            let level = library
                .get(&name)
                .with_context(|| format!("no map named '{name}'"))?;
            write_level(level, output.as_deref())?;
        }
    }
    Ok(())
}

fn parse_level_file(path: &Path) -> Result<LevelData> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read map from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse map JSON in {}", path.display()))
}

fn read_level(path: &Path) -> Result<LevelData> {
    let level = parse_level_file(path)?;
    world_level::validate(&level).with_context(|| format!("invalid map in {}", path.display()))?;
    Ok(level)
}

fn write_level(level: &LevelData, output: Option<&Path>) -> Result<()> {
    let json = world_level::serialize(level).context("failed to serialise map")?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write map to {}", path.display()))?;
            info!(path = %path.display(), "map written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
