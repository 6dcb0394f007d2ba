//! Synthetic camera for the demo binary and tests

use crate::DemoConfig;
use image::{Rgb, RgbImage};
use std::f64::consts::PI;

/// Endless frames whose green channel pulses at a fixed rate
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    fps: u32,
    pulse_hz: f64,
    start_ms: i64,
    index: u64,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, fps: u32, pulse_hz: f64, start_ms: i64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            fps: fps.max(1),
            pulse_hz,
            start_ms,
            index: 0,
        }
    }

    pub fn from_demo(demo: &DemoConfig, fps: u32, start_ms: i64) -> Self {
        Self::new(demo.frame_width, demo.frame_height, fps, demo.pulse_hz, start_ms)
    }

    /// Capture time of the next frame
    pub fn next_timestamp(&self) -> i64 {
        self.start_ms + (self.index as i64 * 1000) / self.fps as i64
    }

    fn render(&self, t_secs: f64) -> RgbImage {
        let pulse = (2.0 * PI * self.pulse_hz * t_secs).sin();
        let green = (110.0 + 12.0 * pulse).round() as u8;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            // Faint texture so patches are not flat
            let shade = ((x + y) % 8) as u8;
            Rgb([150 + shade, green + shade / 2, 95 + shade])
        })
    }
}

impl Iterator for SyntheticCamera {
    type Item = (RgbImage, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let at_ms = self.next_timestamp();
        let frame = self.render((at_ms - self.start_ms) as f64 / 1000.0);
        self.index += 1;
        Some((frame, at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_follow_rate() {
        let camera = SyntheticCamera::new(8, 8, 30, 1.2, 1_000);
        let stamps: Vec<i64> = camera.take(4).map(|(_, t)| t).collect();
        assert_eq!(stamps, vec![1_000, 1_033, 1_066, 1_100]);
    }

    #[test]
    fn test_green_channel_pulses() {
        let mut camera = SyntheticCamera::new(4, 4, 20, 1.0, 0);
        let greens: Vec<u8> = camera.by_ref().take(20).map(|(f, _)| f.get_pixel(0, 0)[1]).collect();
        let max = *greens.iter().max().unwrap();
        let min = *greens.iter().min().unwrap();
        assert!(max - min >= 20);
    }
}
