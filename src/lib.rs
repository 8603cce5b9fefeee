//! Decoder for the Volna contactless transit card (Volgograd, Russia).
//!
//! Volna is a MIFARE Classic 1K application. All meaningful data lives in
//! sectors 0, 8 and 12, which are keyed with a deployment-specific key A;
//! their key B is unique per card and must be recovered out-of-band (nested
//! attack) before a full read is possible.
//!
//! The decoder is a three-stage pipeline driven by an outer card dispatcher:
//!
//! 1. [`CardPlugin::verify`] authenticates sector 0 as a cheap admissibility
//!    filter.
//! 2. [`CardPlugin::read`] detects the card variant, builds a per-sector
//!    key set and pulls the full raw image into a [`DeviceRecord`].
//! 3. [`CardPlugin::parse`] re-checks the stored trailer key against the
//!    deployment key table and extracts card number, balance and the last
//!    top-up time with bit-exact masks.
//!
//! The radio transport and the device-record store are reached through the
//! traits in [`transport`]; this crate ships no radio stack of its own.

pub mod dump;
pub mod error;
pub mod fields;
pub mod image;
pub mod keys;
pub mod plugin;
pub mod transport;

pub use error::{AuthError, VolnaError};
pub use fields::ParsedRecord;
pub use image::{Block, CardVariant, RawCardImage, SectorTrailer};
pub use keys::{KeySet, KeyTable, MfKey, SectorKeyPair, VOLNA_1K_KEYS};
pub use plugin::{CardPlugin, Protocol, VolnaPlugin, register};
pub use transport::{AuthContext, CardTransport, DeviceRecord, InMemoryDeviceRecord, KeyType};
