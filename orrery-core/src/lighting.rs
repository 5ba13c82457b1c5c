/// Colours and the directional light used by the rasterizers
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from a `0xRRGGBB` literal
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Build a colour from hue, saturation and lightness, all in [0, 1]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);

        if saturation == 0.0 {
            return Self::new(lightness, lightness, lightness);
        }

        let q = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;

        Self::new(
            hue_to_channel(p, q, hue + 1.0 / 3.0),
            hue_to_channel(p, q, hue),
            hue_to_channel(p, q, hue - 1.0 / 3.0),
        )
    }

    /// Scale every channel by `factor`, clamping to [0, 1]
    pub fn shade(&self, factor: f32) -> Self {
        Self::new(
            (self.r * factor).clamp(0.0, 1.0),
            (self.g * factor).clamp(0.0, 1.0),
            (self.b * factor).clamp(0.0, 1.0),
        )
    }

    pub fn to_u8(&self) -> (u8, u8, u8) {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }

    /// CSS `rgb(...)` string
    pub fn to_css(&self) -> String {
        let (r, g, b) = self.to_u8();
        format!("rgb({r}, {g}, {b})")
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// White light shining from `position` towards the origin
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Unit vector pointing from the scene towards the light
    pub direction: Vector3<f32>,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn from_position(position: Point3<f32>, intensity: f32) -> Self {
        let direction = position.coords.try_normalize(1e-6).unwrap_or(Vector3::z());
        Self {
            direction,
            intensity,
        }
    }

    /// Lambert term for a world-space normal, in [0, 1]
    pub fn brightness(&self, normal: &Vector3<f32>) -> f32 {
        (normal.dot(&self.direction) * self.intensity).clamp(0.0, 1.0)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::from_position(Point3::new(0.0, 0.0, 1.0), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(Rgb::from_hsl(0.0, 1.0, 0.5), Rgb::RED));
        assert!(close(Rgb::from_hsl(1.0 / 3.0, 1.0, 0.5), Rgb::GREEN));
        assert!(close(Rgb::from_hsl(2.0 / 3.0, 1.0, 0.5), Rgb::BLUE));
        assert!(close(Rgb::from_hsl(0.3, 0.0, 0.25), Rgb::new(0.25, 0.25, 0.25)));
    }

    #[test]
    fn test_hex_and_css() {
        assert!(close(Rgb::from_hex(0xffff00), Rgb::YELLOW));
        assert_eq!(Rgb::from_hex(0x0000ff).to_css(), "rgb(0, 0, 255)");
    }

    #[test]
    fn test_light_brightness() {
        let light = DirectionalLight::from_position(Point3::new(0.0, 0.0, 30.0), 1.0);
        assert!((light.brightness(&Vector3::z()) - 1.0).abs() < 1e-6);
        assert_eq!(light.brightness(&-Vector3::z()), 0.0);
        assert_eq!(light.brightness(&Vector3::x()), 0.0);
    }
}
