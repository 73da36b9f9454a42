//! Pix Client - Efí Pix API client
//!
//! Talks to the provider's charge API (`/oauth/token`, `/v2/cob`, `/v2/loc`,
//! `/v2/webhook`) over a mutual-TLS channel.
//!
//! The storefront depends on the [`PixProvider`] trait, not on [`PixClient`]
//! directly, so tests can substitute an in-process fake.

pub mod client;
pub mod config;
pub mod error;
pub mod token;
pub mod types;

pub use client::{PixClient, PixProvider};
pub use config::PixConfig;
pub use error::{PixError, PixResult};
pub use types::{ChargeStatus, CreatedCharge, QrCode};
