use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use yurtstead::{
    engine::{EngineBuilder, EngineSettings},
    rng::RngManager,
    scenario::ScenarioLoader,
    systems::CollectionSystem,
    web,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Yurtstead settlement simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/steppe.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override autosave interval in ticks
    #[arg(long)]
    autosave_interval: Option<u64>,

    /// Directory for save files
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Load this save blob into the world before running
    #[arg(long)]
    load: Option<PathBuf>,

    /// Place a yurt at X,Y before running (repeatable; costs scenario wood)
    #[arg(long = "place", value_name = "X,Y")]
    place: Vec<String>,

    /// Write a timestamped save after the run
    #[arg(long)]
    save: bool,

    /// Serve the web viewer instead of running headless
    #[arg(long)]
    serve: bool,

    /// Host for the web viewer
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the web viewer
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let ticks = scenario.ticks(cli.ticks);
    let autosave_interval = cli
        .autosave_interval
        .unwrap_or(scenario.autosave_interval_ticks);
    let save_dir = cli.save_dir.unwrap_or_else(|| PathBuf::from("saves"));

    if cli.serve {
        let config = web::WebServerConfig {
            scenario,
            ticks,
            autosave_interval,
            save_dir,
            host: cli.host,
            port: cli.port,
        };
        return tokio::runtime::Runtime::new()?.block_on(web::run(config));
    }

    let mut world = scenario.build_world()?;
    if let Some(path) = &cli.load {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read save file {}", path.display()))?;
        world
            .restore_from_json(&text)
            .with_context(|| format!("Failed to load save file {}", path.display()))?;
    }

    let mut rng = RngManager::new(scenario.seed);
    for spec in &cli.place {
        let (x, y) = parse_coords(spec)?;
        match world.place_yurt(x, y, scenario.yurt_cost_wood, &mut rng.stream("placement")) {
            Ok(id) => println!("Placed {id} at ({x}, {y})"),
            Err(reason) => println!("Cannot place yurt at ({x}, {y}): {reason}"),
        }
    }

    let settings = EngineSettings {
        settlement_name: scenario.name.clone(),
        seed: scenario.seed,
        autosave_interval_ticks: autosave_interval,
        save_dir: save_dir.clone(),
    };
    let mut engine = EngineBuilder::new(settings)
        .with_system(CollectionSystem::new())
        .build();
    engine.run(&mut world, ticks)?;

    let resources = world.resources();
    println!(
        "Settlement '{}' ran for {} ticks. Food: {}, wood: {}, yurts: {}",
        scenario.name,
        ticks,
        resources.food,
        resources.wood,
        world.yurt_units().len()
    );

    if cli.save {
        let dir = save_dir.join(&scenario.name);
        fs::create_dir_all(&dir)?;
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = dir.join(format!("save_{stamp}.json"));
        fs::write(&path, world.save_to_json()?)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

fn parse_coords(spec: &str) -> Result<(i32, i32)> {
    let (x, y) = spec
        .split_once(',')
        .with_context(|| format!("expected X,Y coordinates, got '{spec}'"))?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}
