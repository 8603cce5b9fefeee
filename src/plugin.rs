//! Capability surface exposed to the card-format dispatcher.
//!
//! The dispatcher tries registered plugins against a tapped card and keeps
//! the first whose verify and parse stages both succeed. Stages are invoked
//! independently; the only state carried between them is the raw image held
//! by the [`DeviceRecord`].

use num_enum::{FromPrimitive, IntoPrimitive};
use tracing::{debug, warn};

use crate::error::VolnaError;
use crate::fields::ParsedRecord;
use crate::image::{CardVariant, RawCardImage};
use crate::keys::{KeySet, KeyTable, VOLNA_1K_KEYS};
use crate::transport::{CardTransport, DeviceRecord, KeyType};

/// Wire-level protocol identifier keying a plugin to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Protocol {
    MfUltralight = 0x01,
    MfClassic = 0x02,
    MfDesfire = 0x03,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Contract a supported-card plugin exposes to the dispatcher.
///
/// Each stage reports plain success/failure upward; causes are logged, not
/// returned, and no stage retries internally.
pub trait CardPlugin: Send {
    fn protocol(&self) -> Protocol;

    /// Cheap admissibility filter; does not prove the card's content.
    fn verify(&self, transport: &mut dyn CardTransport) -> bool;

    /// Pull the full raw image into `record`.
    fn read(&self, transport: &mut dyn CardTransport, record: &mut dyn DeviceRecord) -> bool;

    /// Decode the stored image and render the summary into `out`.
    fn parse(&self, record: &dyn DeviceRecord, out: &mut String) -> bool;
}

/// Sector authenticated by the verify stage.
const VERIFY_SECTOR: u8 = 0;

/// Decoder plugin for the Volna transit card.
pub struct VolnaPlugin {
    keys: &'static KeyTable,
}

impl VolnaPlugin {
    pub fn new() -> Self {
        Self {
            keys: &VOLNA_1K_KEYS,
        }
    }

    fn verify_card(&self, transport: &mut dyn CardTransport) -> Result<(), VolnaError> {
        debug!("verifying sector {}", VERIFY_SECTOR);
        let key = self.keys.key_a(VERIFY_SECTOR);
        transport.authenticate(VERIFY_SECTOR, KeyType::A, &key)?;
        Ok(())
    }

    fn read_card(
        &self,
        transport: &mut dyn CardTransport,
        record: &mut dyn DeviceRecord,
    ) -> Result<(), VolnaError> {
        let variant = transport.detect_variant()?;
        if variant != CardVariant::Classic1k {
            return Err(VolnaError::UnsupportedVariant(variant));
        }

        let keys = KeySet::build(self.keys, variant.total_sectors());
        let mut image = RawCardImage::new(variant);
        transport.bulk_read(&keys, &mut image)?;

        record.set_image(image);
        Ok(())
    }

    fn parse_record(&self, record: &dyn DeviceRecord) -> Result<ParsedRecord, VolnaError> {
        let image = record
            .image()
            .ok_or(VolnaError::MalformedField("no image stored"))?;
        ParsedRecord::decode(image, self.keys)
    }
}

impl Default for VolnaPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl CardPlugin for VolnaPlugin {
    fn protocol(&self) -> Protocol {
        Protocol::MfClassic
    }

    fn verify(&self, transport: &mut dyn CardTransport) -> bool {
        match self.verify_card(transport) {
            Ok(()) => true,
            Err(err) => {
                debug!("verification failed: {}", err);
                false
            }
        }
    }

    fn read(&self, transport: &mut dyn CardTransport, record: &mut dyn DeviceRecord) -> bool {
        match self.read_card(transport, record) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to read card data: {}", err);
                false
            }
        }
    }

    fn parse(&self, record: &dyn DeviceRecord, out: &mut String) -> bool {
        match self.parse_record(record) {
            Ok(parsed) => {
                out.push_str(&parsed.to_string());
                true
            }
            Err(err) => {
                debug!("parse rejected: {}", err);
                false
            }
        }
    }
}

/// Hand the dispatcher a ready plugin instance at startup.
pub fn register() -> Box<dyn CardPlugin> {
    Box::new(VolnaPlugin::new())
}
