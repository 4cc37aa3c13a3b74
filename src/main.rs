//! Command-line front end for the Komal Jewellery design studio

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

use komal_studio::config::StudioConfig;
use komal_studio::export::download_image;
use komal_studio::models::{format_label, Category, Metal};
use komal_studio::prompts::STYLE_PRESETS;
use komal_studio::store::{favorites_store, ledger_store};
use komal_studio::{
    DesignRequestService, DesignStudio, FavoriteRecord, FavoritesWorkflow, KeyValueStore,
    OrderForm, OrderRecord, ParameterChange, SaveOutcome, SqliteKeyValueStore,
};

#[derive(Parser)]
#[command(name = "komal-studio", version, about = "Design bespoke jewelry with AI")]
struct Cli {
    /// Generation service URL (overrides the saved config)
    #[arg(long, global = true, env = "KOMAL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a design and optionally save, download or book it
    Generate(GenerateArgs),
    /// Saved designs
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Booked orders
    #[command(subcommand)]
    Ledger(LedgerCommand),
    /// Studio settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value = "gold")]
    metal: Metal,
    #[arg(long, default_value = "ring")]
    category: Category,
    /// Weight in grams (5-50)
    #[arg(long, default_value_t = 10)]
    weight: u32,
    #[arg(long, default_value = "calcutti")]
    style: String,
    #[arg(long, default_value = "")]
    details: String,
    /// Save the result to favorites
    #[arg(long)]
    save: bool,
    /// Download the result as a PNG
    #[arg(long)]
    download: bool,
    /// Directory for downloads
    #[arg(long)]
    out: Option<PathBuf>,
    /// Book the result as an order
    #[arg(long)]
    book: bool,
    #[command(flatten)]
    customer: CustomerArgs,
}

#[derive(Args)]
struct CustomerArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    advance: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl CustomerArgs {
    fn into_form(self) -> OrderForm {
        OrderForm {
            customer_name: self.name.unwrap_or_default(),
            customer_phone: self.phone.unwrap_or_default(),
            customer_address: self.address.unwrap_or_default(),
            advance_payment: self.advance.unwrap_or_default(),
            order_notes: self.notes.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Remove {
        id: String,
    },
    Download {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Book a saved design ("Buy Now")
    Book {
        id: String,
        #[command(flatten)]
        customer: CustomerArgs,
    },
}

#[derive(Subcommand)]
enum LedgerCommand {
    List,
    Download {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    SetApiUrl { url: String },
    SetDownloadDir { dir: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "komal_studio=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = StudioConfig::load()?;
    let api_url = cli.api_url.unwrap_or_else(|| config.api_url.clone());

    match cli.command {
        Command::Generate(args) => run_generate(args, open_backend()?, api_url, &config).await,
        Command::Favorites(command) => {
            run_favorites(command, open_backend()?, api_url, &config).await
        }
        Command::Ledger(command) => run_ledger(command, open_backend()?, &config).await,
        Command::Config(command) => run_config(command, &mut config),
    }
}

fn open_backend() -> Result<Arc<dyn KeyValueStore>, String> {
    let store = SqliteKeyValueStore::open_default().map_err(|e| e.to_string())?;
    info!("[open_backend] Using {}", store.path().display());
    Ok(Arc::new(store))
}

fn download_dir(out: Option<PathBuf>, config: &StudioConfig) -> Result<PathBuf, String> {
    match out {
        Some(dir) => Ok(dir),
        None => config.resolved_download_dir(),
    }
}

async fn run_generate(
    args: GenerateArgs,
    backend: Arc<dyn KeyValueStore>,
    api_url: String,
    config: &StudioConfig,
) -> Result<(), String> {
    if !STYLE_PRESETS.contains(&args.style.as_str()) {
        info!("[generate] Using custom style '{}'", args.style);
    }

    let mut studio = DesignStudio::new(DesignRequestService::over_http(), backend, api_url);
    studio.set_parameter(ParameterChange::Metal(args.metal));
    studio.set_parameter(ParameterChange::Category(args.category));
    studio.set_parameter(ParameterChange::WeightGrams(args.weight));
    studio.set_parameter(ParameterChange::Style(args.style));
    studio.set_parameter(ParameterChange::Details(args.details));

    let Some(artifact) = studio.generate().await.cloned() else {
        let reason = studio
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no image returned".to_string());
        return Err(reason);
    };
    println!("Prompt: {}", artifact.prompt);
    println!(
        "Favorited: {}",
        if studio.is_favorited() { "yes" } else { "no" }
    );

    if args.save {
        match studio.save_favorite().map_err(|e| e.to_string())? {
            Some(SaveOutcome::Saved { record, .. }) => println!("Saved to favorites: {}", record.id),
            Some(SaveOutcome::AlreadySaved { .. }) => println!("Already in favorites"),
            None => {}
        }
    }

    if args.download {
        let dir = download_dir(args.out, config)?;
        if let Some(path) = studio.download(&dir).await.map_err(|e| e.to_string())? {
            println!("Downloaded: {}", path.display());
        }
    }

    if args.book {
        studio.book_design();
        *studio.orders_mut().form_mut() = args.customer.into_form();
        let order = studio.submit_order().map_err(|e| e.to_string())?;
        println!("Booked order: {}", order.id);
    }

    Ok(())
}

async fn run_favorites(
    command: FavoritesCommand,
    backend: Arc<dyn KeyValueStore>,
    api_url: String,
    config: &StudioConfig,
) -> Result<(), String> {
    let favorites = FavoritesWorkflow::new(favorites_store(backend.clone()));

    match command {
        FavoritesCommand::List => {
            let items = favorites.list();
            if items.is_empty() {
                println!("No favorites yet. Save a design to see it here.");
            }
            for item in &items {
                print_favorite(item);
            }
        }
        FavoritesCommand::Remove { id } => {
            let remaining = favorites.remove(&id).map_err(|e| e.to_string())?;
            println!("Removed {} ({} favorites left)", id, remaining.len());
        }
        FavoritesCommand::Download { id, out } => {
            let item = favorites
                .find(&id)
                .ok_or_else(|| format!("No favorite with id {}", id))?;
            let path = download_image(
                &item.design.image_data,
                item.design.category,
                &download_dir(out, config)?,
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("Downloaded: {}", path.display());
        }
        FavoritesCommand::Book { id, customer } => {
            let item = favorites
                .find(&id)
                .ok_or_else(|| format!("No favorite with id {}", id))?;
            let mut studio = DesignStudio::new(DesignRequestService::over_http(), backend, api_url);
            studio.book_favorite(item);
            *studio.orders_mut().form_mut() = customer.into_form();
            let order = studio.submit_order().map_err(|e| e.to_string())?;
            println!("Booked order: {}", order.id);
        }
    }
    Ok(())
}

async fn run_ledger(
    command: LedgerCommand,
    backend: Arc<dyn KeyValueStore>,
    config: &StudioConfig,
) -> Result<(), String> {
    let ledger = ledger_store(backend);

    match command {
        LedgerCommand::List => {
            let orders = ledger.read();
            if orders.is_empty() {
                println!("No orders yet. Book a design to see it here.");
            }
            for order in &orders {
                print_order(order);
            }
        }
        LedgerCommand::Download { id, out } => {
            let order = ledger
                .read()
                .into_iter()
                .find(|order| order.id == id)
                .ok_or_else(|| format!("No order with id {}", id))?;
            let path = download_image(
                &order.design.image_data,
                order.design.category,
                &download_dir(out, config)?,
            )
            .await
            .map_err(|e| e.to_string())?;
            println!("Downloaded: {}", path.display());
        }
    }
    Ok(())
}

fn run_config(command: ConfigCommand, config: &mut StudioConfig) -> Result<(), String> {
    match command {
        ConfigCommand::Show => {
            let content = serde_json::to_string_pretty(config)
                .map_err(|e| format!("Failed to serialize studio config: {}", e))?;
            println!("{}", content);
        }
        ConfigCommand::SetApiUrl { url } => {
            config.api_url = url;
            config.save()?;
        }
        ConfigCommand::SetDownloadDir { dir } => {
            config.download_dir = Some(dir);
            config.save()?;
        }
    }
    Ok(())
}

fn print_favorite(item: &FavoriteRecord) {
    println!("{}  {}", item.id, item.created_at.to_rfc3339());
    print_design(&item.design);
}

fn print_order(order: &OrderRecord) {
    println!("{}  {}", order.id, order.created_at.to_rfc3339());
    println!("  Customer: {} ({})", order.customer_name, order.customer_phone);
    println!("  Address:  {}", order.customer_address);
    if let Some(advance) = &order.advance_payment {
        println!("  Advance:  {}", advance);
    }
    if let Some(notes) = &order.order_notes {
        println!("  Notes:    {}", notes);
    }
    print_design(&order.design);
}

fn print_design(design: &komal_studio::DesignFields) {
    println!("  Category: {}", format_label(design.category.id()));
    println!("  Metal:    {}", design.metal.label());
    println!("  Style:    {}", format_label(&design.style));
    println!("  Weight:   {}g", design.weight_grams);
    println!("  Details:  {}", design.details);
    println!("  Prompt:   {}", design.prompt);
}
