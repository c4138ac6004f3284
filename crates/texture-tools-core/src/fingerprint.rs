//! Content fingerprints over decoded pixels
//!
//! The digest is taken over decoded samples, never file bytes, so re-saved or
//! re-compressed PNGs with identical pixels fingerprint identically.

use blake3::Hasher;
use std::fmt;

use crate::raster::Raster;
use crate::types::{ChannelMode, TransparentPixelPolicy};

const DOMAIN_TAG: &[u8] = b"texture-tools/fingerprint/v1";

/// Size of the scratch buffer used when normalising transparent pixels
const CHUNK_PIXELS: usize = 2048;

/// A BLAKE3 digest of a raster plus the shape it was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    digest: [u8; 32],
    width: u32,
    height: u32,
    mode: ChannelMode,
}

impl Fingerprint {
    /// Assemble a fingerprint from its parts
    pub fn from_parts(digest: [u8; 32], width: u32, height: u32, mode: ChannelMode) -> Self {
        Self {
            digest,
            width,
            height,
            mode,
        }
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Shape discriminators agree
    pub fn same_shape(&self, other: &Fingerprint) -> bool {
        self.width == other.width && self.height == other.height && self.mode == other.mode
    }

    /// Digest bytes are equal and shapes match
    pub fn is_duplicate_of(&self, other: &Fingerprint) -> bool {
        self.same_shape(other) && self.digest == other.digest
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.digest).to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}x{} {:?})",
            self.to_hex(),
            self.width,
            self.height,
            self.mode
        )
    }
}

/// Compute the content fingerprint of a raster
pub fn fingerprint(raster: &Raster, policy: TransparentPixelPolicy) -> Fingerprint {
    let mut hasher = Hasher::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(&raster.width().to_le_bytes());
    hasher.update(&raster.height().to_le_bytes());
    hasher.update(&[raster.channels() as u8]);

    match (policy, raster.mode()) {
        (TransparentPixelPolicy::Normalize, ChannelMode::Rgba) => {
            hash_normalized(&mut hasher, raster.samples())
        }
        _ => {
            hasher.update(raster.samples());
        }
    }

    Fingerprint {
        digest: *hasher.finalize().as_bytes(),
        width: raster.width(),
        height: raster.height(),
        mode: raster.mode(),
    }
}

/// Feed RGBA samples with every alpha=0 pixel replaced by zeros
fn hash_normalized(hasher: &mut Hasher, samples: &[u8]) {
    let mut buffer = Vec::with_capacity(CHUNK_PIXELS * 4);

    for chunk in samples.chunks(CHUNK_PIXELS * 4) {
        buffer.clear();
        for px in chunk.chunks_exact(4) {
            if px[3] == 0 {
                buffer.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                buffer.extend_from_slice(px);
            }
        }
        hasher.update(&buffer);
    }
}
