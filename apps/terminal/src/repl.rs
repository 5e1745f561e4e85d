//! # Command Loop
//!
//! Reads one cashier command per line, runs it, prints the result.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan <code> [qty]            look up a barcode/SKU and add it         │
//! │  qty <product> <n>            set line quantity (n >= 1)               │
//! │  disc <product> <amount>      set line discount                        │
//! │  price <product> <amount>     override unit price                      │
//! │  rm <product>                 remove line                              │
//! │  clear                        empty cart, reset order discount         │
//! │  customer <id>                select customer                          │
//! │  warehouse <id>               select warehouse                         │
//! │  order-discount <amount>      discount on the whole order              │
//! │  auto-fulfill on|off          fulfill right after create               │
//! │  paid on|off                  mark order as paid                       │
//! │  cart                         show cart and GST summary                │
//! │  checkout                     create (and fulfill) the order           │
//! │  dismiss                      forget the completed order               │
//! │  help | quit                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use kirana_client::OrderService;
use kirana_core::Money;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::commands::cart::{self, CartResponse};
use crate::commands::checkout::{self as checkout_cmd, CheckoutResponse, SessionResponse};
use crate::commands::product::{self, ScanResponse};
use crate::error::ApiError;
use crate::state::{CheckoutState, ConfigState, SessionState};

pub const HELP: &str = "\
Commands:
  scan <code> [qty]          look up a barcode/SKU and add it
  qty <product> <n>          set line quantity (n >= 1)
  disc <product> <amount>    set line discount
  price <product> <amount>   override unit price
  rm <product>               remove line
  clear                      empty cart, reset order discount
  customer <id>              select customer
  warehouse <id>             select warehouse
  order-discount <amount>    discount on the whole order
  auto-fulfill on|off        fulfill right after create
  paid on|off                mark order as paid
  cart                       show cart and GST summary
  checkout                   create (and fulfill) the order
  dismiss                    forget the completed order
  help                       show this help
  quit                       exit";

// =============================================================================
// Parsing
// =============================================================================

/// One parsed cashier command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Scan { code: String, quantity: i64 },
    Quantity { product_id: String, quantity: i64 },
    Discount { product_id: String, amount: Money },
    Price { product_id: String, amount: Money },
    Remove { product_id: String },
    Clear,
    Customer(String),
    Warehouse(String),
    OrderDiscount(Money),
    AutoFulfill(bool),
    MarkPaid(bool),
    Cart,
    Checkout,
    Dismiss,
    Help,
    Quit,
}

fn arg<'a>(args: &[&'a str], index: usize, name: &str) -> Result<&'a str, ApiError> {
    args.get(index)
        .copied()
        .ok_or_else(|| ApiError::validation(format!("missing <{}>", name)))
}

fn parse_int(value: &str, name: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(format!("{} must be a whole number, got '{}'", name, value)))
}

fn parse_switch(value: &str) -> Result<bool, ApiError> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(ApiError::validation(format!("expected on or off, got '{}'", other))),
    }
}

impl FromStr for Command {
    type Err = ApiError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| ApiError::validation("empty command"))?
            .to_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match name.as_str() {
            "scan" => Command::Scan {
                code: arg(&args, 0, "code")?.to_string(),
                quantity: args.get(1).map(|q| parse_int(q, "quantity")).transpose()?.unwrap_or(1),
            },
            "qty" => Command::Quantity {
                product_id: arg(&args, 0, "product")?.to_string(),
                quantity: parse_int(arg(&args, 1, "n")?, "quantity")?,
            },
            "disc" => Command::Discount {
                product_id: arg(&args, 0, "product")?.to_string(),
                amount: arg(&args, 1, "amount")?.parse()?,
            },
            "price" => Command::Price {
                product_id: arg(&args, 0, "product")?.to_string(),
                amount: arg(&args, 1, "amount")?.parse()?,
            },
            "rm" | "remove" => Command::Remove {
                product_id: arg(&args, 0, "product")?.to_string(),
            },
            "clear" => Command::Clear,
            "customer" => Command::Customer(arg(&args, 0, "id")?.to_string()),
            "warehouse" => Command::Warehouse(arg(&args, 0, "id")?.to_string()),
            "order-discount" => Command::OrderDiscount(arg(&args, 0, "amount")?.parse()?),
            "auto-fulfill" => Command::AutoFulfill(parse_switch(arg(&args, 0, "on|off")?)?),
            "paid" => Command::MarkPaid(parse_switch(arg(&args, 0, "on|off")?)?),
            "cart" => Command::Cart,
            "checkout" | "pay" => Command::Checkout,
            "dismiss" => Command::Dismiss,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(ApiError::validation(format!(
                    "unknown command '{}', type 'help'",
                    other
                )))
            }
        };

        Ok(command)
    }
}

// =============================================================================
// Execution
// =============================================================================

/// What the loop should do after a command.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Everything the command loop works with.
pub struct App<S: OrderService> {
    pub session: SessionState,
    pub checkout: CheckoutState<S>,
    pub config: ConfigState,
}

impl<S: OrderService> App<S> {
    pub fn new(session: SessionState, checkout: CheckoutState<S>, config: ConfigState) -> Self {
        App {
            session,
            checkout,
            config,
        }
    }

    /// Runs one command and renders its result.
    pub async fn execute(&self, command: Command) -> Result<Flow, ApiError> {
        debug!(?command, "Executing command");

        let output = match command {
            Command::Scan { code, quantity } => {
                match product::scan(&self.session, &self.checkout, &code, quantity).await? {
                    ScanResponse::Added { product, cart } => {
                        let mut out = format!("+ {} ({})\n", product.name, product.id);
                        out.push_str(&self.render(&cart, render_cart));
                        out
                    }
                    ScanResponse::NotFound { code } => format!("No product found for '{}'", code),
                }
            }
            Command::Quantity { product_id, quantity } => {
                self.render(&cart::update_quantity(&self.session, &product_id, quantity)?, render_cart)
            }
            Command::Discount { product_id, amount } => {
                self.render(&cart::set_line_discount(&self.session, &product_id, amount)?, render_cart)
            }
            Command::Price { product_id, amount } => {
                self.render(&cart::set_unit_price(&self.session, &product_id, amount)?, render_cart)
            }
            Command::Remove { product_id } => {
                self.render(&cart::remove_from_cart(&self.session, &product_id)?, render_cart)
            }
            Command::Clear => self.render(&cart::clear_cart(&self.session), render_cart),
            Command::OrderDiscount(amount) => {
                self.render(&cart::set_order_discount(&self.session, amount)?, render_cart)
            }
            Command::Cart => self.render(&cart::get_cart(&self.session), render_cart),
            Command::Customer(id) => {
                self.render(&checkout_cmd::select_customer(&self.session, &id)?, render_session)
            }
            Command::Warehouse(id) => {
                self.render(&checkout_cmd::select_warehouse(&self.session, &id)?, render_session)
            }
            Command::AutoFulfill(on) => {
                self.render(&checkout_cmd::set_auto_fulfill(&self.session, on), render_session)
            }
            Command::MarkPaid(on) => {
                self.render(&checkout_cmd::set_mark_paid(&self.session, on), render_session)
            }
            Command::Checkout => {
                let response = checkout_cmd::checkout(&self.session, &self.checkout).await?;
                self.render(&response, render_checkout)
            }
            Command::Dismiss => match checkout_cmd::dismiss_completed_order(&self.session) {
                Some(order) => format!("Dismissed order {}", order.display_id()),
                None => "No completed order".to_string(),
            },
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Flow::Quit),
        };

        Ok(Flow::Continue(output))
    }

    fn render<T: Serialize>(&self, value: &T, table: fn(&T, &ConfigState) -> String) -> String {
        if self.config.json_output {
            serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
        } else {
            table(value, &self.config)
        }
    }

    /// Handles one input line, turning errors into printable text.
    pub async fn handle_line(&self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue(String::new());
        }

        let result = match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(flow) => flow,
            Err(e) if self.config.json_output => Flow::Continue(
                serde_json::to_string_pretty(&e).unwrap_or_else(|_| e.to_string()),
            ),
            Err(e) => Flow::Continue(format!("✗ {}", e)),
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run_loop<R, W>(&self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(b"> ").await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                Flow::Quit => break,
                Flow::Continue(text) => {
                    if !text.is_empty() {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                }
            }
            output.write_all(b"> ").await?;
            output.flush().await?;
        }

        output.flush().await
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders the cart table with totals and GST summary.
pub fn render_cart(cart: &CartResponse, cfg: &ConfigState) -> String {
    let mut out = String::new();
    if cart.lines.is_empty() {
        out.push_str("Cart is empty");
        if !cart.totals.order_discount.is_zero() {
            let _ = write!(out, " (order discount {})", cfg.format_currency(cart.totals.order_discount));
        }
        return out;
    }

    let _ = writeln!(out, "{:<12} {:<24} {:>4} {:>10} {:>9} {:>10} {:>11}", "ID", "ITEM", "QTY", "PRICE", "DISC", "GST", "TOTAL");
    for line in &cart.lines {
        let flag = if line.subtotal.is_negative() { " !" } else { "" };
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:>4} {:>10} {:>9} {:>10} {:>11}{}",
            truncate(&line.product_id, 12),
            truncate(&line.name, 24),
            line.quantity,
            cfg.format_currency(line.unit_price),
            cfg.format_currency(line.discount),
            cfg.format_currency(line.tax),
            cfg.format_currency(line.total),
            flag
        );
        let _ = writeln!(out, "{:<12} {}", "", line.gst_label);
    }

    let totals = &cart.totals;
    let _ = writeln!(out, "Subtotal        {:>12}", cfg.format_currency(totals.subtotal));
    for slab in &cart.gst {
        let _ = writeln!(
            out,
            "GST {:<11} {:>12}  (CGST {} + SGST {} on {})",
            slab.rate.to_string(),
            cfg.format_currency(slab.tax),
            cfg.format_currency(slab.split.cgst),
            cfg.format_currency(slab.split.sgst),
            cfg.format_currency(slab.taxable_value)
        );
    }
    let _ = writeln!(out, "Tax             {:>12}", cfg.format_currency(totals.tax));
    if !totals.order_discount.is_zero() {
        let _ = writeln!(out, "Order discount  {:>12}", format!("-{}", cfg.format_currency(totals.order_discount)));
    }
    let _ = write!(out, "TOTAL           {:>12}", cfg.format_currency(totals.total));
    if totals.has_negative_lines() {
        let _ = write!(out, "\n! discount exceeds line value on: {}", totals.negative_lines.join(", "));
    }
    out
}

fn render_session(session: &SessionResponse, _cfg: &ConfigState) -> String {
    format!(
        "customer: {}  warehouse: {}  auto-fulfill: {}  paid: {}",
        session.customer_id.as_deref().unwrap_or("-"),
        session.warehouse_id.as_deref().unwrap_or("-"),
        on_off(session.flags.auto_fulfill),
        on_off(session.flags.mark_paid),
    )
}

fn render_checkout(response: &CheckoutResponse, cfg: &ConfigState) -> String {
    let mark = if response.needs_manual_fulfillment { "!" } else { "✓" };
    format!(
        "{} {}\n  Order {}  total {}",
        mark,
        response.message,
        response.order.display_id(),
        cfg.format_currency(response.total)
    )
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{checkout_state, MockService};
    use kirana_core::CheckoutFlags;

    fn app() -> App<MockService> {
        App::new(
            SessionState::new(Some("w-1".to_string()), CheckoutFlags::default()),
            checkout_state(MockService::default()),
            ConfigState::default(),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "scan 8901000000001".parse::<Command>().unwrap(),
            Command::Scan {
                code: "8901000000001".to_string(),
                quantity: 1
            }
        );
        assert_eq!(
            "QTY p-1 3".parse::<Command>().unwrap(),
            Command::Quantity {
                product_id: "p-1".to_string(),
                quantity: 3
            }
        );
        assert_eq!(
            "disc p-1 ₹12.50".parse::<Command>().unwrap(),
            Command::Discount {
                product_id: "p-1".to_string(),
                amount: Money::from_minor(1250)
            }
        );
        assert_eq!("paid off".parse::<Command>().unwrap(), Command::MarkPaid(false));
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!("qty p-1".parse::<Command>().is_err());
        assert!("qty p-1 two".parse::<Command>().is_err());
        assert!("disc p-1 abc".parse::<Command>().is_err());
        assert!("auto-fulfill maybe".parse::<Command>().is_err());
        assert!("refund".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn test_full_sale_through_loop() {
        let app = app();
        let input: &[u8] = b"scan 8901000000001 2\ncustomer c-1\ncheckout\ncart\nquit\nscan 8901000000001\n";
        let mut output = Vec::new();

        app.run_loop(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("+ Product p-1 (p-1)"));
        assert!(text.contains("GST 5% (CGST 2.5% + SGST 2.5%)"));
        assert!(text.contains("Sale completed and fulfilled!"));
        assert!(text.contains("total ₹94.50"));
        assert!(text.contains("Cart is empty"));
        // Nothing after quit runs
        assert_eq!(app.checkout.service().searches().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_printed_not_fatal() {
        let app = app();

        let flow = app.handle_line("checkout").await;
        assert_eq!(flow, Flow::Continue("✗ [ValidationError] customer is required".to_string()));

        let flow = app.handle_line("frobnicate").await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.contains("unknown command")));
    }

    #[tokio::test]
    async fn test_oversized_price_is_refused_and_till_keeps_running() {
        let app = app();
        app.handle_line("scan 8901000000001").await;

        let flow = app.handle_line("price p-1 79228162514264337593543950335").await;
        assert_eq!(
            flow,
            Flow::Continue("✗ [ValidationError] unit price must be between 0 and 1000000000000".to_string())
        );

        let flow = app.handle_line("qty p-1 2").await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.contains("₹94.50")));
    }

    #[tokio::test]
    async fn test_checkout_on_empty_cart_keeps_completed_order() {
        let app = app();
        for line in ["scan 8901000000001", "customer c-1", "checkout"] {
            app.handle_line(line).await;
        }

        let flow = app.handle_line("checkout").await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.starts_with("✗")));

        let flow = app.handle_line("dismiss").await;
        assert_eq!(flow, Flow::Continue("Dismissed order order-1".to_string()));
        assert_eq!(app.checkout.service().create_calls(), 1);
    }

    #[tokio::test]
    async fn test_json_output() {
        let mut app = app();
        app.config.json_output = true;

        let flow = app.handle_line("rm nothing").await;
        match flow {
            Flow::Continue(text) => {
                let json: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(json["code"], "NOT_FOUND");
            }
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_render_cart_shows_negative_flag() {
        let session = SessionState::default();
        cart::add_to_cart(&session, &crate::commands::test_support::product("p-1", 10, None), 1).unwrap();
        let response = cart::set_line_discount(&session, "p-1", Money::from_major(20)).unwrap();

        let text = render_cart(&response, &ConfigState::default());

        assert!(text.contains("discount exceeds line value on: p-1"));
        assert!(text.contains("-₹11.80"));
    }
}
