//! Whole-cart commands.

use anyhow::Result;

use crate::context::Context;

/// Print the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    ctx.output.cart(&cart.state());
    cart.shutdown().await?;
    Ok(())
}

/// Empty the cart and the saved list.
pub async fn clear(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let (lines, saved) = cart.read(|s| (s.line_count(), s.saved_count()));
    cart.clear();
    cart.shutdown().await?;

    if ctx.output.is_json() {
        ctx.output.cart(&cart.state());
    } else {
        ctx.output.success(&format!(
            "Cleared {} line(s) and {} saved item(s)",
            lines, saved
        ));
    }
    Ok(())
}
