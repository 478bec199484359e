//! Pointer actuation seam.

use log::{debug, info, warn};
use rand::Rng;

/// Pixels of slack allowed around the screen edge before a target counts as
/// off-screen.
const EDGE_TOLERANCE: i32 = 10;

/// Moves the pointer and clicks. Implementations own their bounds checking;
/// an off-screen target is a `false` return, never a panic.
pub trait Actuator: Send {
    /// Screen extents in pixels.
    fn screen_size(&self) -> (u32, u32);

    /// Click at an absolute coordinate. Returns whether the click happened.
    fn click(&mut self, x: i32, y: i32) -> bool;

    /// Whether a coordinate lies on screen, with edge tolerance.
    fn on_screen(&self, x: i32, y: i32) -> bool {
        let (width, height) = self.screen_size();
        x >= -EDGE_TOLERANCE
            && x <= width as i32 + EDGE_TOLERANCE
            && y >= -EDGE_TOLERANCE
            && y <= height as i32 + EDGE_TOLERANCE
    }

    /// Pick action: bounds check, then click with a uniform random offset of
    /// up to `offset_range` pixels on each axis.
    fn pick(&mut self, x: i32, y: i32, offset_range: i32) -> bool {
        if !self.on_screen(x, y) {
            warn!("pick target ({x}, {y}) is off screen");
            return false;
        }
        let offset_range = offset_range.max(0);
        let mut rng = rand::thread_rng();
        let target_x = x + rng.gen_range(-offset_range..=offset_range);
        let target_y = y + rng.gen_range(-offset_range..=offset_range);
        debug!("picking at ({target_x}, {target_y})");
        self.click(target_x, target_y)
    }
}

/// Dry-run actuator: logs every click and reports success.
pub struct LogActuator {
    width: u32,
    height: u32,
}

impl LogActuator {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Actuator for LogActuator {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn click(&mut self, x: i32, y: i32) -> bool {
        info!("dry-run click at ({x}, {y})");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingActuator {
        width: u32,
        height: u32,
        clicks: Arc<AtomicUsize>,
        last: Option<(i32, i32)>,
    }

    impl Actuator for RecordingActuator {
        fn screen_size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn click(&mut self, x: i32, y: i32) -> bool {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            self.last = Some((x, y));
            true
        }
    }

    fn recording(width: u32, height: u32) -> RecordingActuator {
        RecordingActuator {
            width,
            height,
            clicks: Arc::new(AtomicUsize::new(0)),
            last: None,
        }
    }

    #[test]
    fn off_screen_pick_is_rejected_without_clicking() {
        let mut actuator = recording(800, 600);
        assert!(!actuator.pick(2000, 300, 10));
        assert!(!actuator.pick(400, -100, 10));
        assert_eq!(actuator.clicks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn edge_tolerance_admits_slightly_outside_targets() {
        let actuator = recording(800, 600);
        assert!(actuator.on_screen(805, 300));
        assert!(actuator.on_screen(-5, 0));
        assert!(!actuator.on_screen(811, 300));
    }

    #[test]
    fn pick_offset_stays_within_range() {
        let mut actuator = recording(800, 600);
        for _ in 0..50 {
            assert!(actuator.pick(400, 300, 10));
            let (x, y) = actuator.last.expect("clicked");
            assert!((390..=410).contains(&x));
            assert!((290..=310).contains(&y));
        }
    }

    #[test]
    fn zero_offset_clicks_the_exact_target() {
        let mut actuator = recording(800, 600);
        assert!(actuator.pick(400, 300, 0));
        assert_eq!(actuator.last, Some((400, 300)));
    }
}
