//! Common test utilities: image builders and a scriptable mock transport.

#[allow(unused_imports)]
pub use volna_rs::error::{AuthError, VolnaError};
#[allow(unused_imports)]
pub use volna_rs::fields::{DATA_SECTOR, LAST_CHARGE_SECTOR, ParsedRecord};
#[allow(unused_imports)]
pub use volna_rs::image::{BLOCK_SIZE, Block, CardVariant, RawCardImage, SectorTrailer};
#[allow(unused_imports)]
pub use volna_rs::keys::{KeySet, MfKey, VOLNA_1K_KEYS};
#[allow(unused_imports)]
pub use volna_rs::plugin::{CardPlugin, VolnaPlugin};
#[allow(unused_imports)]
pub use volna_rs::transport::{
    AuthContext, CardTransport, DeviceRecord, InMemoryDeviceRecord, KeyType,
};

/// Transport-default access conditions word.
#[allow(dead_code)]
pub const DEFAULT_ACCESS: [u8; 4] = [0xFF, 0x07, 0x80, 0x69];

/// A zeroed 1K image with every trailer filled from the deployment key
/// table (sectors without a table key B store zeroes, like a freshly
/// programmed card).
#[allow(dead_code)]
pub fn image_1k() -> RawCardImage {
    let mut image = RawCardImage::new(CardVariant::Classic1k);
    for sector in 0..16u8 {
        let pair = VOLNA_1K_KEYS.pair(sector);
        let key_b = pair.key_b.unwrap_or(MfKey::from_u64(0));
        let trailer = SectorTrailer::new(pair.key_a, DEFAULT_ACCESS, key_b);
        set_trailer(&mut image, sector, trailer);
    }
    image
}

/// A populated image carrying the reference field values: card number
/// 10001, balance 1000, last charge 12:34.
#[allow(dead_code)]
pub fn reference_image() -> RawCardImage {
    let mut image = image_1k();
    set_bytes(&mut image, 33, 8, &[0x00, 0x00, 0x27, 0x11]);
    set_bytes(&mut image, 34, 8, &[0x03, 0xE8]);
    set_bytes(&mut image, 1, 0, &[0x04, 0xD2]);
    image
}

#[allow(dead_code)]
pub fn set_bytes(image: &mut RawCardImage, block: usize, offset: usize, bytes: &[u8]) {
    let data = image.block_mut(block).expect("block in range");
    data.0[offset..offset + bytes.len()].copy_from_slice(bytes);
}

#[allow(dead_code)]
pub fn set_trailer(image: &mut RawCardImage, sector: u8, trailer: SectorTrailer) {
    use volna_rs::image::trailer_block_of_sector;
    let block = trailer_block_of_sector(sector);
    set_bytes(image, block, 0, &trailer.to_block().0);
}

/// Scriptable stand-in for the radio transport.
#[allow(dead_code)]
pub struct MockTransport {
    pub variant: Result<CardVariant, AuthError>,
    pub auth_result: Result<(), AuthError>,
    pub bulk_result: Result<(), AuthError>,
    /// Blocks copied into the destination image on a successful bulk read.
    pub bulk_image: Option<RawCardImage>,
    pub auth_calls: Vec<(u8, KeyType, MfKey)>,
    pub bulk_keys: Option<KeySet>,
    pub bulk_calls: usize,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn happy() -> Self {
        Self {
            variant: Ok(CardVariant::Classic1k),
            auth_result: Ok(()),
            bulk_result: Ok(()),
            bulk_image: Some(reference_image()),
            auth_calls: Vec::new(),
            bulk_keys: None,
            bulk_calls: 0,
        }
    }

    pub fn with_auth_error(error: AuthError) -> Self {
        Self {
            auth_result: Err(error),
            ..Self::happy()
        }
    }
}

impl CardTransport for MockTransport {
    fn authenticate(
        &mut self,
        sector: u8,
        key_type: KeyType,
        key: &MfKey,
    ) -> Result<AuthContext, AuthError> {
        self.auth_calls.push((sector, key_type, *key));
        self.auth_result
            .clone()
            .map(|_| AuthContext { sector, key_type })
    }

    fn detect_variant(&mut self) -> Result<CardVariant, AuthError> {
        self.variant.clone()
    }

    fn bulk_read(&mut self, keys: &KeySet, image: &mut RawCardImage) -> Result<(), AuthError> {
        self.bulk_calls += 1;
        self.bulk_keys = Some(keys.clone());
        self.bulk_result.clone()?;
        if let Some(source) = &self.bulk_image {
            *image = source.clone();
        }
        Ok(())
    }
}
