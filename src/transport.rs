//! Contracts consumed from the radio transport and the device-record store.
//!
//! Every call is synchronous and blocking; timeout behavior belongs to the
//! transport and surfaces here only as [`AuthError`]. The decoder assumes
//! non-concurrent invocation against a single tapped card.

use strum_macros::Display;

use crate::error::AuthError;
use crate::image::{CardVariant, RawCardImage};
use crate::keys::{KeySet, MfKey};

/// Which of a sector's two keys to authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum KeyType {
    A,
    B,
}

/// Proof of a completed sector handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub sector: u8,
    pub key_type: KeyType,
}

/// Blocking interface to the MIFARE Classic radio layer.
pub trait CardTransport {
    /// Authenticate one sector with one key.
    fn authenticate(
        &mut self,
        sector: u8,
        key_type: KeyType,
        key: &MfKey,
    ) -> Result<AuthContext, AuthError>;

    /// Detect the capacity variant of the tapped card.
    fn detect_variant(&mut self) -> Result<CardVariant, AuthError>;

    /// Authenticate and read every sector covered by `keys` into `image`.
    ///
    /// Any reported failure invalidates the whole image: the read stage
    /// never accepts a partially authenticated dump.
    fn bulk_read(&mut self, keys: &KeySet, image: &mut RawCardImage) -> Result<(), AuthError>;
}

/// Store holding the raw image between the read and parse stages.
pub trait DeviceRecord {
    fn image(&self) -> Option<&RawCardImage>;
    fn set_image(&mut self, image: RawCardImage);
}

/// Trivial in-process device record.
#[derive(Debug, Default)]
pub struct InMemoryDeviceRecord {
    image: Option<RawCardImage>,
}

impl InMemoryDeviceRecord {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceRecord for InMemoryDeviceRecord {
    fn image(&self) -> Option<&RawCardImage> {
        self.image.as_ref()
    }

    fn set_image(&mut self, image: RawCardImage) {
        self.image = Some(image);
    }
}
