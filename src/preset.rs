//! Optimization presets
//!
//! A preset is a named pair of texture sizes: one for a material's main
//! (albedo) texture and one for every other texture slot.

use clap::ValueEnum;
use lazy_vram_core::{LazyVramError, Result, is_supported_texture_size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named optimization preset
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Main textures 2048, everything else 1024
    #[default]
    Standard,
    /// Main textures 2048, everything else 512
    #[serde(alias = "Standard+", alias = "standard+")]
    StandardPlus,
    /// Main textures 1024, everything else 512
    High,
    /// Main textures keep their size, everything else 1024
    Low,
    /// Sizes supplied by the user
    Custom,
}

/// Resolved target sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSizes {
    /// `None` keeps the main texture's current max size
    pub main: Option<u32>,
    pub other: u32,
}

impl TextureSizes {
    /// Size for a slot, `None` meaning "leave the size alone"
    pub fn for_slot(&self, is_main: bool) -> Option<u32> {
        if is_main { self.main } else { Some(self.other) }
    }
}

impl fmt::Display for TextureSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.main {
            Some(main) => write!(f, "main {}, other {}", main, self.other),
            None => write!(f, "main original, other {}", self.other),
        }
    }
}

impl Preset {
    /// The presets offered besides `Custom`
    pub const FIXED: [Preset; 4] = [
        Preset::Standard,
        Preset::StandardPlus,
        Preset::High,
        Preset::Low,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::Standard => "Standard",
            Preset::StandardPlus => "Standard+",
            Preset::High => "High",
            Preset::Low => "Low",
            Preset::Custom => "Custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Standard => "sets main texture sizes to 2048, everything else to 1024",
            Preset::StandardPlus => "sets main texture sizes to 2048, everything else to 512",
            Preset::High => "sets main textures size to 1024, everything else to 512",
            Preset::Low => "keeps the main textures original size, everything else to 1024",
            Preset::Custom => {
                "uses the given main and other sizes (32, 64, 128, 256, 512, 1024, 2048, 4096)"
            }
        }
    }

    /// Fixed sizes of a non-custom preset
    pub fn fixed_sizes(&self) -> Option<TextureSizes> {
        let (main, other) = match self {
            Preset::Standard => (Some(2048), 1024),
            Preset::StandardPlus => (Some(2048), 512),
            Preset::High => (Some(1024), 512),
            Preset::Low => (None, 1024),
            Preset::Custom => return None,
        };
        Some(TextureSizes { main, other })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Preset {
    type Err = LazyVramError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "standard" => Ok(Preset::Standard),
            "standard+" | "standard-plus" | "standardplus" => Ok(Preset::StandardPlus),
            "high" => Ok(Preset::High),
            "low" => Ok(Preset::Low),
            "custom" => Ok(Preset::Custom),
            _ => Err(LazyVramError::unknown_preset(s)),
        }
    }
}

/// Resolve a preset into target sizes
///
/// The custom sizes are only consulted for [`Preset::Custom`], where both
/// must be one of the sizes Unity accepts for `maxTextureSize`.
///
/// ```rust
/// use lazy_vram::preset::{Preset, resolve};
///
/// let sizes = resolve(Preset::StandardPlus, 0, 0)?;
/// assert_eq!(sizes.main, Some(2048));
/// assert_eq!(sizes.other, 512);
///
/// assert!(resolve(Preset::Custom, 2048, 1000).is_err());
/// # Ok::<(), lazy_vram::LazyVramError>(())
/// ```
pub fn resolve(preset: Preset, custom_main: u32, custom_other: u32) -> Result<TextureSizes> {
    if let Some(sizes) = preset.fixed_sizes() {
        return Ok(sizes);
    }

    if !is_supported_texture_size(custom_main) || !is_supported_texture_size(custom_other) {
        return Err(LazyVramError::invalid_size(custom_main, custom_other));
    }

    Ok(TextureSizes {
        main: Some(custom_main),
        other: custom_other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_vram_core::SUPPORTED_TEXTURE_SIZES;

    #[test]
    fn test_fixed_presets() {
        let expected = [
            (Preset::Standard, Some(2048), 1024),
            (Preset::StandardPlus, Some(2048), 512),
            (Preset::High, Some(1024), 512),
            (Preset::Low, None, 1024),
        ];
        for (preset, main, other) in expected {
            // custom values are ignored for fixed presets
            let sizes = resolve(preset, 3, 5).unwrap();
            assert_eq!(sizes, TextureSizes { main, other }, "{}", preset);
        }
    }

    #[test]
    fn test_custom_accepts_every_supported_pair() {
        for main in SUPPORTED_TEXTURE_SIZES {
            for other in SUPPORTED_TEXTURE_SIZES {
                let sizes = resolve(Preset::Custom, main, other).unwrap();
                assert_eq!(sizes.main, Some(main));
                assert_eq!(sizes.other, other);
            }
        }
    }

    #[test]
    fn test_custom_rejects_unsupported_sizes() {
        let bad = [0, 1, 16, 100, 1000, 2000, 3000, 8192, u32::MAX];
        for value in bad {
            assert!(matches!(
                resolve(Preset::Custom, value, 1024),
                Err(LazyVramError::InvalidSize { .. })
            ));
            assert!(matches!(
                resolve(Preset::Custom, 2048, value),
                Err(LazyVramError::InvalidSize { .. })
            ));
        }
        // Only one side valid is still invalid
        assert!(resolve(Preset::Custom, 4096, 4095).is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Standard+".parse::<Preset>().unwrap(), Preset::StandardPlus);
        assert_eq!("standard-plus".parse::<Preset>().unwrap(), Preset::StandardPlus);
        assert_eq!("HIGH".parse::<Preset>().unwrap(), Preset::High);
        assert_eq!("custom".parse::<Preset>().unwrap(), Preset::Custom);
        assert!(matches!(
            "ultra".parse::<Preset>(),
            Err(LazyVramError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_serde_names() {
        let preset: Preset = serde_yaml::from_str("standard-plus").unwrap();
        assert_eq!(preset, Preset::StandardPlus);
        let preset: Preset = serde_yaml::from_str("\"Standard+\"").unwrap();
        assert_eq!(preset, Preset::StandardPlus);
        assert_eq!(serde_yaml::to_string(&Preset::Low).unwrap().trim(), "low");
    }

    #[test]
    fn test_slot_sizes() {
        let low = resolve(Preset::Low, 0, 0).unwrap();
        assert_eq!(low.for_slot(true), None);
        assert_eq!(low.for_slot(false), Some(1024));
        assert_eq!(low.to_string(), "main original, other 1024");
    }
}
