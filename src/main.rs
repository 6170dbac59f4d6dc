use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use travelplanner::{
    Category, GeoJsonRenderer, ItineraryBuilder, MapView, PlannerConfig, TripPlanner,
    TripPreferences, ViewState, WizardStep, logging, web,
};

/// Trip planning wizard: destination, points of interest and a route
#[derive(Parser)]
#[command(name = "travelplanner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip and print the itinerary
    Plan {
        /// Where to go; the configured default is used when empty
        #[arg(short, long, default_value = "")]
        destination: String,

        #[arg(short, long, default_value = "")]
        budget: String,

        #[arg(short, long, default_value = "")]
        pace: String,

        /// May be repeated
        #[arg(short, long = "interest")]
        interests: Vec<String>,

        /// Directory to write the plain-text itinerary into
        #[arg(long)]
        export: Option<PathBuf>,

        /// File to write the route GeoJSON into
        #[arg(long)]
        route_out: Option<PathBuf>,
    },

    /// Serve the JSON API and the browser front end
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the point-of-interest categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = PlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Plan {
            destination,
            budget,
            pace,
            interests,
            export,
            route_out,
        } => {
            let preferences = TripPreferences::new(destination)
                .with_budget(budget)
                .with_pace(pace)
                .with_interests(interests);
            plan(&config, preferences, export, route_out).await
        }
        Commands::Serve { port } => {
            web::run(&config, port.unwrap_or(config.web.port)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Categories => {
            for category in Category::ALL {
                println!("{category}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn plan(
    config: &PlannerConfig,
    preferences: TripPreferences,
    export: Option<PathBuf>,
    route_out: Option<PathBuf>,
) -> Result<ExitCode> {
    let builder = ItineraryBuilder::from_config(config)?;
    let map = MapView::new(GeoJsonRenderer::new(), ViewState::from(&config.map));
    let planner = TripPlanner::new(builder, map, config);

    planner.update_preferences(preferences).await?;
    while planner.step().await != WizardStep::Review {
        planner.next().await?;
    }

    let Some(panel) = planner.panel().await else {
        anyhow::bail!("No itinerary was generated");
    };
    println!("{}", panel.to_text());

    if let Some(dir) = export {
        let path = planner.export_to(&dir).await?;
        println!("\nSaved to {}", path.display());
    }

    if let Some(path) = route_out {
        let geojson = planner
            .with_map(|map| map.renderer().route_geojson().cloned())
            .await;
        if let Some(geojson) = geojson {
            let contents = serde_json::to_string_pretty(&geojson)?;
            tokio::fs::write(&path, contents)
                .await
                .with_context(|| format!("Failed to write route to {}", path.display()))?;
        }
    }

    Ok(if panel.is_planned() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
