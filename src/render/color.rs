//! Deterministic color mapping
//!
//! Two gradients are provided: a 2D one driven by projected coordinates
//! (topic map) and a 1D hue sweep driven by a per-node metric (timeline).
//! The numbers below are policy, not derived; tests assert them exactly.

use crate::analysis::MetricKind;
use serde::{Serialize, Serializer};
use std::fmt;

/// Lowest channel intensity used by the 2D gradient, so no fill is too dark
pub const BRIGHTNESS_FLOOR: u8 = 50;
/// Channel range above the floor (`FLOOR + SPAN = 255`)
pub const BRIGHTNESS_SPAN: u8 = 205;
/// Channel value for an axis with no spread
pub const CHANNEL_MIDPOINT: u8 = 128;
/// Blue channel of every 2D-gradient color
pub const CONSTANT_BLUE: u8 = 128;

/// Hue (degrees) for a node at zero drift
pub const HUE_NEAR: f64 = 0.0;
/// Hue (degrees) for a node at maximum drift
pub const HUE_FAR: f64 = 240.0;
pub const GRADIENT_SATURATION: f64 = 0.75;
pub const GRADIENT_VALUE: f64 = 0.95;

/// Weights of the red, green and blue channels in perceived luminance
pub const LUMINANCE_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];
/// Fills brighter than this get black text, others white
pub const LUMINANCE_THRESHOLD: f64 = 186.0;

/// Fill for nodes that have no metric to color by
pub const NEUTRAL_FILL: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Weighted channel sum on the 0-255 scale
    pub fn luminance(&self) -> f64 {
        let [wr, wg, wb] = LUMINANCE_WEIGHTS;
        self.r as f64 * wr + self.g as f64 * wg + self.b as f64 * wb
    }

    /// Black or white, whichever stays readable on this fill
    pub fn contrasting_text(&self) -> Rgb {
        if self.luminance() > LUMINANCE_THRESHOLD {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Map each 2D position to a color: x drives red, y drives green, blue is
/// fixed. Each axis is normalized over the batch on its own.
pub fn gradient_2d(positions: &[[f64; 2]]) -> Vec<Rgb> {
    let xs: Vec<f64> = positions.iter().map(|p| p[0]).collect();
    let ys: Vec<f64> = positions.iter().map(|p| p[1]).collect();
    let reds = channel_from_axis(&xs);
    let greens = channel_from_axis(&ys);

    reds.into_iter()
        .zip(greens)
        .map(|(r, g)| Rgb::new(r, g, CONSTANT_BLUE))
        .collect()
}

fn channel_from_axis(values: &[f64]) -> Vec<u8> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range > 0.0 {
                let scaled = (v - min) / range * BRIGHTNESS_SPAN as f64 + BRIGHTNESS_FLOOR as f64;
                // truncation toward zero, like an integer cast
                scaled.clamp(0.0, 255.0) as u8
            } else {
                CHANNEL_MIDPOINT
            }
        })
        .collect()
}

/// Normalize raw metric values to drift in `[0, 1]`, 0 being "closest".
///
/// Similarity maps from `[-1, 1]` (high is close) via `(1 - s) / 2`.
/// Distance is divided by the batch maximum; an all-zero batch maps to 0.
pub fn normalize_drift(values: &[f64], metric: MetricKind) -> Vec<f64> {
    match metric {
        MetricKind::Similarity => values
            .iter()
            .map(|&s| ((1.0 - s) / 2.0).clamp(0.0, 1.0))
            .collect(),
        MetricKind::Distance => {
            let max = values.iter().cloned().fold(0.0f64, f64::max);
            values
                .iter()
                .map(|&d| if max > 0.0 { (d / max).clamp(0.0, 1.0) } else { 0.0 })
                .collect()
        }
    }
}

/// Hue (degrees) for a drift value, moving linearly from [`HUE_NEAR`] to
/// [`HUE_FAR`]
pub fn drift_hue(drift: f64) -> f64 {
    HUE_NEAR + drift.clamp(0.0, 1.0) * (HUE_FAR - HUE_NEAR)
}

/// Color for a drift value on the fixed hue sweep
pub fn drift_color(drift: f64) -> Rgb {
    hsv_to_rgb(drift_hue(drift), GRADIENT_SATURATION, GRADIENT_VALUE)
}

/// Colors for raw metric values, normalized over the batch
pub fn gradient_1d(values: &[f64], metric: MetricKind) -> Vec<Rgb> {
    normalize_drift(values, metric)
        .into_iter()
        .map(drift_color)
        .collect()
}

/// HSV (hue in degrees, s and v in `[0, 1]`) to RGB
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = value * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_constants() {
        assert_eq!(BRIGHTNESS_FLOOR as u16 + BRIGHTNESS_SPAN as u16, 255);
        assert_eq!(LUMINANCE_THRESHOLD, 186.0);
        assert_eq!(LUMINANCE_WEIGHTS, [0.299, 0.587, 0.114]);
    }

    #[test]
    fn test_gradient_2d_extremes() {
        let colors = gradient_2d(&[[0.0, 10.0], [1.0, 0.0], [0.5, 5.0]]);
        assert_eq!(colors[0], Rgb::new(50, 255, 128));
        assert_eq!(colors[1], Rgb::new(255, 50, 128));
        // 0.5 * 205 + 50 = 152.5, truncated
        assert_eq!(colors[2], Rgb::new(152, 152, 128));
    }

    #[test]
    fn test_gradient_2d_degenerate_axis() {
        let colors = gradient_2d(&[[3.0, 0.0], [3.0, 1.0]]);
        assert_eq!(colors[0].r, CHANNEL_MIDPOINT);
        assert_eq!(colors[1].r, CHANNEL_MIDPOINT);
        assert_eq!(colors[0].g, 50);
        assert_eq!(colors[1].g, 255);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(255, 50, 128).to_hex(), "#ff3280");
        assert_eq!(serde_json::to_string(&Rgb::new(0, 0, 0)).unwrap(), "\"#000000\"");
    }

    #[test]
    fn test_contrast_rule() {
        assert_eq!(Rgb::WHITE.contrasting_text(), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.contrasting_text(), Rgb::WHITE);
        // luminance exactly at the threshold is not "above" it
        let grey = Rgb::new(186, 186, 186);
        assert!((grey.luminance() - 186.0).abs() < 1e-9);
        assert_eq!(grey.contrasting_text(), Rgb::WHITE);
        assert_eq!(Rgb::new(187, 187, 187).contrasting_text(), Rgb::BLACK);
    }

    #[test]
    fn test_normalize_similarity() {
        let drift = normalize_drift(&[1.0, 0.0, -1.0], MetricKind::Similarity);
        assert_eq!(drift, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_distance() {
        assert_eq!(normalize_drift(&[0.0, 1.0, 2.0], MetricKind::Distance), vec![0.0, 0.5, 1.0]);
        assert_eq!(normalize_drift(&[0.0, 0.0], MetricKind::Distance), vec![0.0, 0.0]);
    }

    #[test]
    fn test_hue_sweep_is_monotonic() {
        let mut last = drift_hue(0.0);
        assert_eq!(last, HUE_NEAR);
        for step in 1..=20 {
            let hue = drift_hue(step as f64 / 20.0);
            assert!(hue > last);
            last = hue;
        }
        assert_eq!(last, HUE_FAR);
    }

    #[test]
    fn test_sweep_endpoints() {
        // red at zero drift, blue at full drift
        let near = drift_color(0.0);
        assert!(near.r > near.g && near.r > near.b);
        let far = drift_color(1.0);
        assert!(far.b > far.r && far.b > far.g);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
    }
}
