use std::sync::Arc;
use std::time::Duration;

use assets::HttpTextureLoader;
use catalog::DestinationCatalog;
use clap::{Parser, Subcommand};
use studio::{GarmentCategory, HttpRelayClient, Studio};
use tools::{ToolError, describe_completion, render_cards, run_tour};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "CultureVerse destinations, panorama tours and batik studio")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List destination cards
    Destinations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a destination's detail page
    Show {
        slug: String,

        #[arg(long)]
        json: bool,
    },

    /// Click through hotspots in a headless panorama viewer
    Tour {
        slug: String,

        /// Hotspot ids to click, in order
        #[arg(long = "click")]
        clicks: Vec<String>,

        /// Close the info panel at the end
        #[arg(long)]
        dismiss: bool,
    },

    /// Generate a batik texture through the relay and bind it to a garment
    Studio {
        #[arg(long)]
        prompt: String,

        /// shirt, kebaya or dress
        #[arg(long, default_value = "shirt")]
        category: GarmentCategory,

        /// Relay origin
        #[arg(long, env = "CULTUREVERSE_RELAY", default_value = "http://127.0.0.1:3000")]
        relay: String,

        /// Relay round-trip bound in seconds
        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), ToolError> {
    let args = Args::parse();
    let catalog = DestinationCatalog::builtin()?;

    match args.command {
        Command::Destinations { json } => {
            let cards = catalog.cards();
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                print!("{}", render_cards(&cards));
            }
        }
        Command::Show { slug, json } => {
            let detail = catalog.detail(&slug)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print!("{}", detail.render_text());
            }
        }
        Command::Tour {
            slug,
            clicks,
            dismiss,
        } => {
            print!("{}", run_tour(&catalog, &slug, &clicks, dismiss)?.render());
        }
        Command::Studio {
            prompt,
            category,
            relay,
            timeout_secs,
        } => {
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| ToolError::Generation(format!("runtime: {e}")))?;
            runtime.block_on(run_studio(&prompt, category, &relay, timeout_secs))?;
        }
    }
    Ok(())
}

async fn run_studio(
    prompt: &str,
    category: GarmentCategory,
    relay: &str,
    timeout_secs: u64,
) -> Result<(), ToolError> {
    let client = Arc::new(HttpRelayClient::new(relay));
    let textures = Arc::new(HttpTextureLoader::new());
    let mut studio = Studio::new(client, textures).with_timeouts(
        Duration::from_secs(timeout_secs),
        assets::DEFAULT_TEXTURE_TIMEOUT,
    );

    studio.set_category(category);
    let variant = category.variant();
    studio.garment_mut().attach_mesh(variant, ["garment"]);

    info!(%relay, category = category.as_str(), "requesting batik texture");
    let completion = studio.generate(prompt).await?;
    println!("{}", describe_completion(&completion)?);
    println!("garment: {} ({})", category.label(), variant.asset_path());
    match studio.garment().mesh().and_then(|m| m.surfaces.first()) {
        Some(surface) => match studio.garment().material(surface.id).and_then(|m| m.map.as_ref()) {
            Some(t) => {
                info!(width = t.width, height = t.height, "texture bound to garment");
                println!("texture bound: {}x{}", t.width, t.height);
            }
            None => {
                warn!("texture not bound, garment keeps the default colour");
                println!("texture not bound; showing default colour");
            }
        },
        None => println!("no mesh attached"),
    }
    Ok(())
}
