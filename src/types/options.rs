//! Conversion options.

use crate::error::{EncoderError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Render-time scalar routed into one tint channel by the consuming shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBehavior {
    Pitch,
    Yaw,
    Roll,
    Time,
    Scale,
    Overlay,
    Hurt,
}

impl ColorBehavior {
    /// All behaviors in wire order.
    pub const ALL: [ColorBehavior; 7] = [
        ColorBehavior::Pitch,
        ColorBehavior::Yaw,
        ColorBehavior::Roll,
        ColorBehavior::Time,
        ColorBehavior::Scale,
        ColorBehavior::Overlay,
        ColorBehavior::Hurt,
    ];

    /// The 3-bit code written into the header.
    pub fn index(self) -> u8 {
        match self {
            ColorBehavior::Pitch => 0,
            ColorBehavior::Yaw => 1,
            ColorBehavior::Roll => 2,
            ColorBehavior::Time => 3,
            ColorBehavior::Scale => 4,
            ColorBehavior::Overlay => 5,
            ColorBehavior::Hurt => 6,
        }
    }

    /// Pack three behaviors as `cb0 << 6 | cb1 << 3 | cb2`.
    pub fn pack(behaviors: [ColorBehavior; 3]) -> u16 {
        let [r, g, b] = behaviors;
        (r.index() as u16) << 6 | (g.index() as u16) << 3 | b.index() as u16
    }

    /// Inverse of [`index`](ColorBehavior::index).
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorBehavior::Pitch => "pitch",
            ColorBehavior::Yaw => "yaw",
            ColorBehavior::Roll => "roll",
            ColorBehavior::Time => "time",
            ColorBehavior::Scale => "scale",
            ColorBehavior::Overlay => "overlay",
            ColorBehavior::Hurt => "hurt",
        }
    }
}

impl fmt::Display for ColorBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorBehavior {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown color behavior '{}'. Expected one of: pitch, yaw, roll, time, scale, overlay, hurt",
                    s
                )
            })
    }
}

/// Whether vertex indices share one pixel (position + UV in alpha) or use two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Compress when the deduplicated UV table fits the alpha channel.
    #[default]
    Auto,
    On,
    Off,
}

impl Compression {
    /// The largest UV table that still fits the compressed alpha channel.
    pub const MAX_COMPRESSED_UVS: usize = 255;

    /// Decide whether compression applies for a given UV table size.
    pub fn resolve(self, uv_count: usize) -> bool {
        match self {
            Compression::Auto => uv_count <= Self::MAX_COMPRESSED_UVS,
            Compression::On => true,
            Compression::Off => false,
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Compression::Auto),
            "true" | "on" | "yes" => Ok(Compression::On),
            "false" | "off" | "no" => Ok(Compression::Off),
            other => Err(format!(
                "Invalid compression '{}'. Use auto, true or false",
                other
            )),
        }
    }
}

impl Serialize for Compression {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Compression::Auto => serializer.serialize_str("auto"),
            Compression::On => serializer.serialize_bool(true),
            Compression::Off => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(Compression::On),
            Repr::Flag(false) => Ok(Compression::Off),
            Repr::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Options controlling one conversion.
///
/// Deserializes from a camelCase JSON document; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Translation added to every position, in model units.
    pub offset: [f64; 3],
    /// Uniform scale applied to every position.
    pub scale: f64,
    /// Animation length in ticks. Defaults to the frame count.
    pub duration: Option<u32>,
    /// Easing curve code (0-3).
    pub easing: u8,
    /// Interpolation between frames (0 = step, 1 = linear).
    pub interpolation: u8,
    /// Scalar driving each of the R, G and B tint channels.
    pub color_behavior: [ColorBehavior; 3],
    /// Automatic rotation mode (0-3).
    pub auto_rotate: u8,
    /// Start the animation without an external trigger.
    pub auto_play: bool,
    /// Copy source textures without the vertical flip.
    pub flip_uv: bool,
    /// Disable shading in the consuming shader.
    pub no_shadow: bool,
    /// Visibility mask (3 bits).
    pub visibility: u8,
    /// Round the output height up to a power of two.
    pub pad_to_power_of_two: bool,
    /// Vertex index packing.
    pub compression: Compression,
    /// Fall back to images embedded in glTF sources when no textures are given.
    pub use_embedded_textures: bool,
    /// Texture reference written into the block model.
    pub texture_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0, 0.0],
            scale: 1.0,
            duration: None,
            easing: 3,
            interpolation: 1,
            color_behavior: [ColorBehavior::Pitch, ColorBehavior::Yaw, ColorBehavior::Roll],
            auto_rotate: 1,
            auto_play: true,
            flip_uv: false,
            no_shadow: false,
            visibility: 7,
            pad_to_power_of_two: false,
            compression: Compression::Auto,
            use_embedded_textures: true,
            texture_name: "item/model".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Largest value the 24-bit header fields can hold.
    pub const MAX_24_BIT: u32 = (1 << 24) - 1;

    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_offset(mut self, offset: [f64; 3]) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_color_behavior(mut self, color_behavior: [ColorBehavior; 3]) -> Self {
        self.color_behavior = color_behavior;
        self
    }

    /// Animation duration, falling back to the number of frames.
    pub fn effective_duration(&self, frame_count: usize) -> u32 {
        self.duration.unwrap_or(frame_count as u32)
    }

    /// Packed color behavior value: `cb0 << 6 | cb1 << 3 | cb2`.
    pub fn color_behavior_value(&self) -> u16 {
        ColorBehavior::pack(self.color_behavior)
    }

    /// Check that every field fits its encoded bit width.
    pub fn validate(&self) -> Result<()> {
        check_range("easing", self.easing, 3)?;
        check_range("interpolation", self.interpolation, 1)?;
        check_range("autoRotate", self.auto_rotate, 3)?;
        check_range("visibility", self.visibility, 7)?;

        if let Some(duration) = self.duration {
            if duration > Self::MAX_24_BIT {
                return Err(EncoderError::InvalidOption(format!(
                    "duration {} exceeds {}",
                    duration,
                    Self::MAX_24_BIT
                )));
            }
        }
        if !self.scale.is_finite() {
            return Err(EncoderError::InvalidOption(format!(
                "scale must be finite, got {}",
                self.scale
            )));
        }
        if self.offset.iter().any(|v| !v.is_finite()) {
            return Err(EncoderError::InvalidOption(format!(
                "offset must be finite, got {:?}",
                self.offset
            )));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: u8, max: u8) -> Result<()> {
    if value > max {
        return Err(EncoderError::InvalidOption(format!(
            "{} must be between 0 and {}, got {}",
            name, max, value
        )));
    }
    Ok(())
}
