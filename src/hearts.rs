//! Celebration particles.

use rand::Rng;

/// Number of hearts in one celebration.
pub const HEART_COUNT: usize = 28;

/// One falling heart. Times are seconds, size is nominal pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heart {
    /// Horizontal position, percent of the screen width.
    pub left: u8,
    pub duration: f32,
    pub delay: f32,
    pub size: f32,
}

/// Generate a fresh set of hearts.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Vec<Heart> {
    (0..HEART_COUNT)
        .map(|_| Heart {
            left: rng.gen_range(0..100),
            duration: rng.gen_range(5.0..9.0),
            delay: rng.gen_range(0.0..3.0),
            size: rng.gen_range(14.0..36.0),
        })
        .collect()
}

impl Heart {
    /// Vertical progress through the fall in `[0, 1)`, or None before the
    /// heart's delay has elapsed.
    pub fn progress(&self, elapsed_secs: f32) -> Option<f32> {
        let t = elapsed_secs - self.delay;
        if t < 0.0 {
            return None;
        }
        Some((t % self.duration) / self.duration)
    }

    /// Large hearts are drawn with emphasis.
    pub fn is_large(&self) -> bool {
        self.size >= 25.0
    }
}
