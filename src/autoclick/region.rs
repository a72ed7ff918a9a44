//! Search region handling and coordinate translation.

use serde::{Deserialize, Serialize};

use super::error::{ClickerError, ClickerResult};
use crate::capture::{MonitorInfo, ScreenRect};

/// User-configured sub-rectangle of one monitor to restrict capture and
/// matching to. Offsets are relative to the referenced monitor's origin.
/// Absent region means "entire primary display".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub monitor_idx: usize,
}

impl SearchRegion {
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Resolve the capture rectangle for one iteration: the configured region
/// anchored at its monitor when the index is still valid, otherwise the full
/// primary display. Returns the rect and the index of the monitor to grab
/// from. Non-positive dimensions are a structural error that stops the loop.
pub fn resolve_capture_rect(
    region: Option<&SearchRegion>,
    monitors: &[MonitorInfo],
    primary: &MonitorInfo,
) -> ClickerResult<(ScreenRect, usize)> {
    let (rect, monitor_index) = match region {
        Some(area) if area.monitor_idx < monitors.len() => {
            let monitor = &monitors[area.monitor_idx];
            (
                ScreenRect {
                    left: monitor.left + area.left,
                    top: monitor.top + area.top,
                    width: area.width,
                    height: area.height,
                },
                area.monitor_idx,
            )
        }
        _ => (ScreenRect::of_monitor(primary), primary.index),
    };

    if rect.width == 0 || rect.height == 0 {
        return Err(ClickerError::InvalidRegionSize {
            width: rect.width,
            height: rect.height,
        });
    }
    Ok((rect, monitor_index))
}

/// Translate a point in capture-rect space to primary-display space,
/// clamped to the primary display's bounds.
pub fn to_primary(x: u32, y: u32, rect: &ScreenRect, primary: &MonitorInfo) -> (i32, i32) {
    clamp_to_monitor(
        rect.left + x as i32 - primary.left,
        rect.top + y as i32 - primary.top,
        primary,
    )
}

pub fn clamp_to_monitor(x: i32, y: i32, monitor: &MonitorInfo) -> (i32, i32) {
    (
        x.clamp(0, monitor.width as i32 - 1),
        y.clamp(0, monitor.height as i32 - 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(index: usize, left: i32, top: i32, width: u32, height: u32) -> MonitorInfo {
        MonitorInfo {
            index,
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn configured_region_is_anchored_at_its_monitor() {
        let monitors = vec![monitor(0, 0, 0, 1920, 1080), monitor(1, 1920, 0, 1920, 1080)];
        let region = SearchRegion {
            left: 100,
            top: 50,
            width: 300,
            height: 200,
            monitor_idx: 1,
        };

        let (rect, idx) = resolve_capture_rect(Some(&region), &monitors, &monitors[0]).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(rect.left, 2020);
        assert_eq!(rect.top, 50);
        assert_eq!(rect.width, 300);
        assert_eq!(rect.height, 200);
    }

    #[test]
    fn stale_monitor_index_falls_back_to_primary() {
        let monitors = vec![monitor(0, 0, 0, 1920, 1080)];
        let region = SearchRegion {
            left: 10,
            top: 10,
            width: 100,
            height: 100,
            monitor_idx: 3,
        };

        let (rect, idx) = resolve_capture_rect(Some(&region), &monitors, &monitors[0]).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(rect, ScreenRect::of_monitor(&monitors[0]));
    }

    #[test]
    fn empty_region_is_a_structural_error() {
        let monitors = vec![monitor(0, 0, 0, 1920, 1080)];
        let region = SearchRegion {
            left: 0,
            top: 0,
            width: 0,
            height: 100,
            monitor_idx: 0,
        };
        assert!(!region.is_valid());

        let err = resolve_capture_rect(Some(&region), &monitors, &monitors[0]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn translation_is_relative_to_the_primary_display() {
        let primary = monitor(0, 0, 0, 800, 600);
        let rect = ScreenRect {
            left: 100,
            top: 200,
            width: 400,
            height: 300,
        };
        assert_eq!(to_primary(50, 25, &rect, &primary), (150, 225));
    }

    #[test]
    fn translated_points_are_clamped_to_primary_bounds() {
        let primary = monitor(0, 0, 0, 800, 600);
        let rect = ScreenRect {
            left: 700,
            top: 550,
            width: 400,
            height: 300,
        };
        // 700 + 350 = 1050 clamps to 799; 550 + 200 = 750 clamps to 599.
        assert_eq!(to_primary(350, 200, &rect, &primary), (799, 599));
    }

    #[test]
    fn region_serde_round_trip() {
        let region = SearchRegion {
            left: 5,
            top: 6,
            width: 70,
            height: 80,
            monitor_idx: 2,
        };
        let json = serde_json::to_string(&region).unwrap();
        let back: SearchRegion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, region);

        // monitor_idx defaults to 0 for records written by older versions
        let legacy: SearchRegion =
            serde_json::from_str(r#"{"left":1,"top":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(legacy.monitor_idx, 0);
    }
}
