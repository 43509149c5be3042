//! Client-side components of the Piata listing pages.
//!
//! The components talk to their host through two seams: [`dom::Dom`] for
//! element access and [`map::MapEngine`] for the slippy map. Both have
//! headless implementations ([`dom::MemoryDom`], [`map::HeadlessEngine`])
//! used by tests and by hosts without a real page.

pub mod client;
pub mod config;
pub mod dom;
pub mod error;
pub mod feed;
pub mod html;
pub mod lifecycle;
pub mod map;
pub mod messages;
pub mod nearby;
pub mod preview;

pub use client::MarketplaceClient;
pub use config::WidgetConfig;
pub use error::WidgetError;
