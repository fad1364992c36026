#![doc = include_str!("../README.md")]

pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "nonce")]
pub mod nonce;
pub mod token;

// Re-exports for convenient access
pub use codec::{SignedPayload, SsoCodec, build_redirect_url, decode, encode};
pub use config::SsoConfig;
pub use error::Error;
#[cfg(feature = "nonce")]
pub use nonce::{NONCE_EXPIRY, NonceStore, generate_nonce, is_fresh};
pub use token::{ClaimField, SsoToken};
