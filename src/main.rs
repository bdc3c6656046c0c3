use clap::{Parser, Subcommand};
use log::error;
use pantry_chef::{
    import_receipt_into, plan_from_store, AppConfig, InMemoryPantryStore, PantryError,
    PantryStore, PlacesClient, ReceiptImporter, RestPantryStore, ShoppingPlanner,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
struct CliArgs {
    /// User whose pantry is read or written
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Suggest recipes for ingredients typed on the command line
    Suggest {
        #[arg(short, long = "ingredient", required = true)]
        ingredients: Vec<String>,
    },
    /// Suggest recipes from a pantry and list the ingredients still missing
    Plan {
        /// Use these ingredients instead of the stored pantry
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Print only the shopping list, one ingredient per line
        #[arg(long)]
        text: bool,
    },
    /// Read a grocery receipt image into pantry entries
    Receipt {
        image: PathBuf,
        /// Store the scanned items in the user's pantry
        #[arg(long)]
        save: bool,
    },
    /// Manage the stored pantry
    Pantry {
        #[command(subcommand)]
        action: PantryAction,
    },
    /// Find stores near a location
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        query: String,
    },
}

#[derive(Subcommand)]
enum PantryAction {
    List,
    Add {
        ingredient: String,
        #[arg(short, long)]
        quantity: Option<String>,
    },
    Delete {
        id: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_user(user: Option<String>) -> Result<String, PantryError> {
    user.ok_or_else(|| PantryError::ValidationError("--user is required".to_string()))
}

async fn run(args: CliArgs, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Suggest { ingredients } => {
            let planner = ShoppingPlanner::from_config(&config)?;
            print_json(&planner.suggest_recipes(&ingredients).await?)
        }
        Command::Plan { ingredients, text } => {
            let planner = ShoppingPlanner::from_config(&config)?;
            let plan = if ingredients.is_empty() {
                let store = RestPantryStore::new(&config.store)?;
                plan_from_store(&planner, &store, &require_user(args.user)?).await?
            } else {
                let store = InMemoryPantryStore::new();
                for ingredient in &ingredients {
                    store.add("local", ingredient, None).await?;
                }
                plan_from_store(&planner, &store, "local").await?
            };
            if text {
                println!("{}", plan.shopping_list_text());
                Ok(())
            } else {
                print_json(&plan)
            }
        }
        Command::Receipt { image, save } => {
            let importer = ReceiptImporter::from_config(&config)?;
            let entries = if save {
                let store = RestPantryStore::new(&config.store)?;
                let bytes = tokio::fs::read(&image).await?;
                import_receipt_into(
                    &importer,
                    &store,
                    &require_user(args.user)?,
                    &bytes,
                    pantry_chef::receipt::mime_type_for(&image),
                )
                .await?
            } else {
                importer.import_receipt_file(&image).await?
            };
            print_json(&entries)
        }
        Command::Pantry { action } => {
            let store = RestPantryStore::new(&config.store)?;
            let user = require_user(args.user)?;
            match action {
                PantryAction::List => print_json(&store.list(&user).await?),
                PantryAction::Add {
                    ingredient,
                    quantity,
                } => print_json(&store.add(&user, &ingredient, quantity.as_deref()).await?),
                PantryAction::Delete { id } => {
                    store.delete(&user, &id).await?;
                    Ok(())
                }
            }
        }
        Command::Nearby { lat, lng, query } => {
            let client = PlacesClient::new(&config.places)?;
            print_json(&client.search(lat, lng, &query).await?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = CliArgs::parse();
    let config = AppConfig::load()?;

    if let Err(e) = run(args, config).await {
        if let Some(PantryError::MalformedResponse { raw, .. }) = e.downcast_ref::<PantryError>() {
            error!("Raw response:\n{}", raw);
        }
        return Err(e);
    }

    Ok(())
}
