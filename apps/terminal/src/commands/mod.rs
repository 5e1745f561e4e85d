//! # Commands Module
//!
//! Handlers behind every terminal command. Each takes only the state it
//! needs and returns `Result<T, ApiError>`, so the command loop stays a thin
//! parser and printer.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Terminal Commands                                │
//! │                                                                         │
//! │  PRODUCT                    CART                      CHECKOUT          │
//! │  ───────                    ────                      ────────          │
//! │  lookup_product             get_cart                  select_customer   │
//! │  scan                       add_to_cart               select_warehouse  │
//! │                             update_quantity           set_auto_fulfill  │
//! │                             set_line_discount         set_mark_paid     │
//! │                             set_unit_price            checkout          │
//! │                             remove_from_cart          dismiss_completed │
//! │                             set_order_discount                          │
//! │                             clear_cart                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;
pub mod product;
