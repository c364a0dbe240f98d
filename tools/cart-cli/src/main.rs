//! Cart CLI - inspect and edit the persisted storefront cart.
//!
//! Commands:
//! - `cart show` - Print active and saved lines
//! - `cart add` - Add a product line
//! - `cart remove` - Remove an active line
//! - `cart qty` - Set a line's quantity
//! - `cart save` - Move a line to saved-for-later
//! - `cart unsave` - Drop a saved line
//! - `cart move` - Move a saved line back into the cart
//! - `cart clear` - Empty the cart

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{AddArgs, LineArgs, QtyArgs};

/// Cart CLI - Inspect and edit the storefront cart
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart and the saved-for-later list
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove a line from the cart
    Remove(LineArgs),

    /// Set the quantity of a line (0 removes it)
    Qty(QtyArgs),

    /// Move a line to the saved-for-later list
    Save(LineArgs),

    /// Remove a line from the saved-for-later list
    Unsave(LineArgs),

    /// Move a saved line back into the cart
    Move(LineArgs),

    /// Empty the cart and the saved list
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let filter = if cli.verbose {
        "debug"
    } else {
        ctx.config.log_filter.as_str()
    };
    cart_engine::telemetry::init_tracing(filter);

    let result = match cli.command {
        Commands::Show => commands::cart::show(&ctx).await,
        Commands::Add(args) => commands::items::add(args, &ctx).await,
        Commands::Remove(args) => commands::items::remove(args, &ctx).await,
        Commands::Qty(args) => commands::items::set_quantity(args, &ctx).await,
        Commands::Save(args) => commands::saved::save(args, &ctx).await,
        Commands::Unsave(args) => commands::saved::unsave(args, &ctx).await,
        Commands::Move(args) => commands::saved::move_to_cart(args, &ctx).await,
        Commands::Clear => commands::cart::clear(&ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
