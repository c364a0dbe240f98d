//! Output formatting for the CLI.

use cart_engine::{CartLineItem, CartState};
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print the whole cart, as a table or as the raw state in JSON mode.
    pub fn cart(&self, state: &CartState) {
        if self.json {
            self.json(state);
            return;
        }

        self.header("Cart");
        if state.items.is_empty() {
            self.info("Your cart is empty.");
        } else {
            self.lines(&state.items);
            println!();
            self.kv("items", &state.item_count().to_string());
            self.kv("total", &style(state.total).bold().to_string());
        }

        if !state.saved_items.is_empty() {
            self.header("Saved for later");
            self.lines(&state.saved_items);
        }
    }

    fn lines(&self, lines: &[CartLineItem]) {
        self.table_row(&["ID", "PRODUCT", "NAME", "QTY", "PRICE", "SUBTOTAL"], WIDTHS);
        for line in lines {
            self.table_row(
                &[
                    line.id.as_str(),
                    line.product_id.as_str(),
                    &truncate(&line.name, WIDTHS[2]),
                    &line.quantity.to_string(),
                    &line.unit_price.to_string(),
                    &line.line_total().to_string(),
                ],
                WIDTHS,
            );
        }
    }
}

const WIDTHS: &[usize] = &[24, 16, 28, 5, 10, 10];

/// Shorten `s` to at most `max` characters.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
