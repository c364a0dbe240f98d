//! Saved-for-later commands.

use anyhow::{bail, Result};
use cart_engine::LineItemId;

use super::items::report;
use super::LineArgs;
use crate::context::Context;

/// Move an active line to the saved list.
pub async fn save(args: LineArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let id = LineItemId::new(args.id);
    let result = cart.save_for_later(&id);
    cart.shutdown().await?;
    result?;

    report(ctx, &cart, &format!("Saved {} for later", id));
    Ok(())
}

/// Drop a saved line.
pub async fn unsave(args: LineArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let id = LineItemId::new(args.id);

    if cart.read(|s| s.get_saved(&id).is_none()) {
        cart.shutdown().await?;
        bail!("No saved line '{}'", id);
    }
    cart.remove_from_saved(&id);
    cart.shutdown().await?;

    report(ctx, &cart, &format!("Removed {} from saved items", id));
    Ok(())
}

/// Move a saved line back into the cart.
pub async fn move_to_cart(args: LineArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let id = LineItemId::new(args.id);
    let result = cart.move_to_cart(&id);
    cart.shutdown().await?;
    result?;

    report(ctx, &cart, &format!("Moved {} to the cart", id));
    Ok(())
}
