//! Alpha channel profiling.
//!
//! The binary/variable split is what texture sorting branches on, so both
//! the full profile and the early-exit classifier count distinct levels
//! exactly.

use crate::error::{Error, Result};
use crate::raster::Raster;

/// Classification of an alpha channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaClass {
    /// At most two distinct alpha values (cutout masks, or fully opaque)
    Binary,

    /// Three or more distinct alpha values
    Variable,
}

/// Statistical summary of a raster's alpha channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaProfile {
    histogram: [u64; 256],
    distinct: usize,
    min: u8,
    max: u8,
}

impl AlphaProfile {
    /// Number of distinct alpha values observed
    pub fn distinct_count(&self) -> usize {
        self.distinct
    }

    /// Pixel count per alpha value
    pub fn histogram(&self) -> &[u64; 256] {
        &self.histogram
    }

    pub fn count_of(&self, alpha: u8) -> u64 {
        self.histogram[alpha as usize]
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn has_variable_alpha(&self) -> bool {
        self.distinct > 2
    }

    pub fn class(&self) -> AlphaClass {
        if self.has_variable_alpha() {
            AlphaClass::Variable
        } else {
            AlphaClass::Binary
        }
    }

    /// True when any pixel is less than fully opaque
    pub fn has_transparency(&self) -> bool {
        self.min < 255
    }

    /// True when some pixel's alpha differs from `level`.
    ///
    /// Console dumps store "opaque" as 128, so a texture that is uniformly 128
    /// is plain while anything else carries real transparency.
    pub fn deviates_from(&self, level: u8) -> bool {
        self.histogram
            .iter()
            .enumerate()
            .any(|(value, &count)| count > 0 && value != level as usize)
    }

    /// Distinct alpha values in ascending order
    pub fn levels(&self) -> Vec<u8> {
        (0..=255u8)
            .filter(|&v| self.histogram[v as usize] > 0)
            .collect()
    }
}

/// Build the full alpha profile of a raster in one pass
pub fn profile_alpha(raster: &Raster) -> Result<AlphaProfile> {
    let alphas = raster.alpha_samples().ok_or(Error::NoAlphaChannel)?;

    let mut histogram = [0u64; 256];
    let mut min = u8::MAX;
    let mut max = u8::MIN;

    for a in alphas {
        histogram[a as usize] += 1;
        min = min.min(a);
        max = max.max(a);
    }

    let distinct = histogram.iter().filter(|&&count| count > 0).count();

    Ok(AlphaProfile {
        histogram,
        distinct,
        min,
        max,
    })
}

/// Classify without building a histogram, stopping at the third distinct value
pub fn classify_alpha(raster: &Raster) -> Result<AlphaClass> {
    let alphas = raster.alpha_samples().ok_or(Error::NoAlphaChannel)?;

    let mut first: Option<u8> = None;
    let mut second: Option<u8> = None;
    for a in alphas {
        match (first, second) {
            (Some(x), _) if x == a => {}
            (_, Some(y)) if y == a => {}
            (None, _) => first = Some(a),
            (_, None) => second = Some(a),
            _ => return Ok(AlphaClass::Variable),
        }
    }

    Ok(AlphaClass::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelMode;

    fn rgba_with_alphas(alphas: &[u8]) -> Raster {
        let samples = alphas.iter().flat_map(|&a| [10, 20, 30, a]).collect();
        Raster::new(alphas.len() as u32, 1, ChannelMode::Rgba, samples).unwrap()
    }

    #[test]
    fn test_binary_alpha() {
        let raster = rgba_with_alphas(&[0, 255, 255, 0, 0]);
        let profile = profile_alpha(&raster).unwrap();

        assert_eq!(profile.distinct_count(), 2);
        assert_eq!(profile.class(), AlphaClass::Binary);
        assert!(!profile.has_variable_alpha());
        assert_eq!(profile.min(), 0);
        assert_eq!(profile.max(), 255);
        assert_eq!(profile.count_of(0), 3);
        assert_eq!(classify_alpha(&raster).unwrap(), AlphaClass::Binary);
    }

    #[test]
    fn test_variable_alpha() {
        let raster = rgba_with_alphas(&[0, 128, 255]);
        let profile = profile_alpha(&raster).unwrap();

        assert_eq!(profile.distinct_count(), 3);
        assert_eq!(profile.class(), AlphaClass::Variable);
        assert_eq!(profile.levels(), vec![0, 128, 255]);
        assert_eq!(classify_alpha(&raster).unwrap(), AlphaClass::Variable);
    }

    #[test]
    fn test_fully_opaque_is_binary_without_transparency() {
        let raster = rgba_with_alphas(&[255; 6]);
        let profile = profile_alpha(&raster).unwrap();

        assert_eq!(profile.distinct_count(), 1);
        assert_eq!(profile.class(), AlphaClass::Binary);
        assert!(!profile.has_transparency());
    }

    #[test]
    fn test_classifier_agrees_with_profile_on_late_third_value() {
        let mut alphas = vec![0u8, 255].repeat(50);
        alphas.push(7);
        let raster = rgba_with_alphas(&alphas);

        assert_eq!(classify_alpha(&raster).unwrap(), AlphaClass::Variable);
        assert_eq!(profile_alpha(&raster).unwrap().class(), AlphaClass::Variable);
    }

    #[test]
    fn test_deviation_from_console_level() {
        let uniform = profile_alpha(&rgba_with_alphas(&[128, 128, 128])).unwrap();
        assert!(!uniform.deviates_from(128));
        assert!(uniform.has_transparency());

        let shaped = profile_alpha(&rgba_with_alphas(&[128, 0, 128])).unwrap();
        assert!(shaped.deviates_from(128));
        assert_eq!(shaped.class(), AlphaClass::Binary);
    }

    #[test]
    fn test_rgb_has_no_alpha_channel() {
        let raster = Raster::new(1, 1, ChannelMode::Rgb, vec![1, 2, 3]).unwrap();
        assert!(matches!(profile_alpha(&raster), Err(Error::NoAlphaChannel)));
        assert!(matches!(classify_alpha(&raster), Err(Error::NoAlphaChannel)));
    }
}
