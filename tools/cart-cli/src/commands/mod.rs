//! CLI command implementations.

pub mod cart;
pub mod items;
pub mod saved;

use clap::Args;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product identifier. Adding a product already in the cart raises its quantity.
    pub product: String,

    /// Display name.
    #[arg(short, long)]
    pub name: String,

    /// Unit price in major units (e.g. 12.99).
    #[arg(short, long)]
    pub price: f64,

    /// Number of units.
    #[arg(short, long, default_value = "1")]
    pub quantity: u32,

    /// Seller name.
    #[arg(long, default_value = "")]
    pub vendor: String,

    /// Image reference.
    #[arg(long)]
    pub image: Option<String>,

    /// Line identifier (generated if omitted).
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for commands addressing a single line.
#[derive(Args)]
pub struct LineArgs {
    /// Line identifier.
    pub id: String,
}

/// Arguments for the qty command.
#[derive(Args)]
pub struct QtyArgs {
    /// Line identifier.
    pub id: String,

    /// New quantity. Zero removes the line.
    pub quantity: u32,
}
