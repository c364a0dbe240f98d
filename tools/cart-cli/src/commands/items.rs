//! Commands on active cart lines.

use anyhow::{bail, Result};
use cart_engine::{CartLineItem, CartStore, LineItemId, Money, ProductId};

use super::{AddArgs, LineArgs, QtyArgs};
use crate::context::Context;

/// Add a product line.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let price = Money::from_decimal(args.price, cart.config().currency);

    let mut item = CartLineItem::new(
        ProductId::new(args.product),
        args.name,
        args.vendor,
        price,
        args.quantity,
    );
    if let Some(id) = args.id {
        item = item.with_id(id);
    }
    if let Some(image) = args.image {
        item = item.with_image(image);
    }

    let name = item.name.clone();
    let quantity = item.quantity;
    let added = cart.add_to_cart(item);
    cart.shutdown().await?;
    added?;

    report(ctx, &cart, &format!("Added {} x {}", quantity, name));
    Ok(())
}

/// Remove an active line.
pub async fn remove(args: LineArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let id = LineItemId::new(args.id);

    if cart.read(|s| s.get_item(&id).is_none()) {
        cart.shutdown().await?;
        bail!("No line '{}' in the cart", id);
    }
    cart.remove_item(&id);
    cart.shutdown().await?;

    report(ctx, &cart, &format!("Removed {}", id));
    Ok(())
}

/// Set a line's quantity.
pub async fn set_quantity(args: QtyArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await?;
    let id = LineItemId::new(args.id);

    if cart.read(|s| s.get_item(&id).is_none()) {
        cart.shutdown().await?;
        bail!("No line '{}' in the cart", id);
    }
    cart.set_quantity(&id, args.quantity);
    cart.shutdown().await?;

    let msg = if args.quantity == 0 {
        format!("Removed {}", id)
    } else {
        format!("Set {} to {}", id, args.quantity)
    };
    report(ctx, &cart, &msg);
    Ok(())
}

/// Print a confirmation, or the resulting cart in JSON mode.
pub(crate) fn report(ctx: &Context, cart: &CartStore, msg: &str) {
    if ctx.output.is_json() {
        ctx.output.cart(&cart.state());
        return;
    }
    ctx.output.success(msg);
    ctx.output.kv("total", &cart.total().to_string());
}
