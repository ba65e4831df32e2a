/// Simple RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Blend toward white by `amount` (0.0 = unchanged, 1.0 = white).
    pub fn tint(self, amount: f32) -> Self {
        let keep = 1.0 - amount;
        Self {
            r: self.r * keep + amount,
            g: self.g * keep + amount,
            b: self.b * keep + amount,
        }
    }

    /// Create a darker version.
    pub fn darken(self, amount: f32) -> Self {
        Self {
            r: (self.r - amount).max(0.0),
            g: (self.g - amount).max(0.0),
            b: (self.b - amount).max(0.0),
        }
    }

    /// Components as bytes, truncating like a `#rrggbb` CSS color.
    pub fn to_bytes(self) -> [u8; 3] {
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// CSS hex notation, e.g. `#79aa6c`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Hue rotation per nesting level, in degrees.
const HUE_STEP: f32 = 40.0;
/// How far odd levels are pulled toward white.
const ODD_LEVEL_TINT: f32 = 0.25;

/// Fill color for a cell at the given nesting depth (root = 0).
///
/// A cosine palette walks the hue around the wheel one step per level, and
/// every other level is lightened so neighbours stay distinguishable.
pub fn depth_color(depth: usize) -> Rgb {
    let level = depth + 1;
    let hue = ((level as f32) * HUE_STEP).to_radians();

    let base = Rgb::new(
        0.474_509_8 + 0.203_921_57 * hue.cos(),
        0.523_529_4 - 0.080_392_16 * hue.cos(),
        0.472_549_02 + 0.194_117_65 * (hue + 1.884_955_6).cos(),
    );

    if level % 2 == 1 {
        base.tint(ODD_LEVEL_TINT)
    } else {
        base
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_color_is_pure() {
        for depth in 0..32 {
            assert_eq!(depth_color(depth), depth_color(depth));
        }
    }

    #[test]
    fn neighbouring_levels_differ() {
        for depth in 0..16 {
            assert_ne!(depth_color(depth).to_hex(), depth_color(depth + 1).to_hex());
        }
    }

    #[test]
    fn odd_levels_are_lighter() {
        let root = depth_color(0);
        let plain = Rgb::new(
            0.474_509_8 + 0.203_921_57 * 40f32.to_radians().cos(),
            0.523_529_4 - 0.080_392_16 * 40f32.to_radians().cos(),
            0.472_549_02 + 0.194_117_65 * (40f32.to_radians() + 1.884_955_6).cos(),
        );
        assert!(root.r > plain.r && root.g > plain.g && root.b > plain.b);
    }

    #[test]
    fn hex_is_css_notation() {
        let hex = depth_color(3).to_hex();
        assert_eq!(hex.len(), 7);
        assert!(hex.starts_with('#'));
        assert_eq!(Rgb::new(1.0, 0.0, 0.5).to_hex(), "#ff007f");
    }
}
