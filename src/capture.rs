//! Screen capture collaborator.
//!
//! The loop only needs two things from the display stack: the monitor layout
//! and a grayscale grab of a rectangle. Both sit behind [`ScreenGrabber`] so
//! tests can substitute synthetic frames for a real screen.

use image::GrayImage;

use crate::autoclick::error::{ClickerError, ClickerResult};

/// Position and size of one monitor in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    pub index: usize,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// An absolute rectangle in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn of_monitor(monitor: &MonitorInfo) -> Self {
        Self {
            left: monitor.left,
            top: monitor.top,
            width: monitor.width,
            height: monitor.height,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.left + self.width as i32 / 2,
            self.top + self.height as i32 / 2,
        )
    }
}

/// Source of captured frames.
pub trait ScreenGrabber {
    /// Enumerate the current monitor layout.
    fn monitors(&self) -> ClickerResult<Vec<MonitorInfo>>;

    /// Grab `rect` from `monitor` as a grayscale raster. The rect is clipped
    /// to the monitor; a rect entirely off the monitor is a capture error.
    fn grab(&mut self, monitor: &MonitorInfo, rect: &ScreenRect) -> ClickerResult<GrayImage>;
}

/// The monitor nearest the virtual-screen origin. Click coordinates are
/// expressed relative to this display, so its choice must be stable across
/// iterations.
pub fn primary_monitor(monitors: &[MonitorInfo]) -> Option<&MonitorInfo> {
    monitors
        .iter()
        .min_by_key(|m| (m.left as i64).pow(2) + (m.top as i64).pow(2))
}

/// Crop a full-monitor frame down to an absolute rect, clipped to the
/// monitor bounds. `None` when nothing of the rect lies on the monitor.
pub(crate) fn crop_to_rect(
    frame: &GrayImage,
    monitor: &MonitorInfo,
    rect: &ScreenRect,
) -> Option<GrayImage> {
    let x0 = (rect.left - monitor.left).max(0) as u32;
    let y0 = (rect.top - monitor.top).max(0) as u32;
    if x0 >= frame.width() || y0 >= frame.height() {
        return None;
    }
    let width = rect.width.min(frame.width() - x0);
    let height = rect.height.min(frame.height() - y0);
    if width == 0 || height == 0 {
        return None;
    }
    Some(image::imageops::crop_imm(frame, x0, y0, width, height).to_image())
}

/// Production grabber backed by the `xcap` crate.
#[derive(Debug, Default)]
pub struct XcapGrabber;

impl XcapGrabber {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenGrabber for XcapGrabber {
    fn monitors(&self) -> ClickerResult<Vec<MonitorInfo>> {
        let monitors = xcap::Monitor::all().map_err(|e| ClickerError::MonitorEnumeration {
            description: e.to_string(),
        })?;
        Ok(monitors
            .iter()
            .enumerate()
            .map(|(index, m)| MonitorInfo {
                index,
                left: m.x(),
                top: m.y(),
                width: m.width(),
                height: m.height(),
            })
            .collect())
    }

    fn grab(&mut self, monitor: &MonitorInfo, rect: &ScreenRect) -> ClickerResult<GrayImage> {
        let capture_err = |description: String| ClickerError::CaptureFailed {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            description,
        };

        let monitors = xcap::Monitor::all().map_err(|e| ClickerError::MonitorEnumeration {
            description: e.to_string(),
        })?;
        let target = monitors
            .into_iter()
            .nth(monitor.index)
            .ok_or_else(|| capture_err(format!("monitor {} is gone", monitor.index)))?;

        let shot = target
            .capture_image()
            .map_err(|e| capture_err(e.to_string()))?;

        // Rebuild through the raw buffer so xcap's re-exported image version
        // never leaks into our pixel types.
        let (width, height) = (shot.width(), shot.height());
        let rgba = image::RgbaImage::from_raw(width, height, shot.into_raw())
            .ok_or_else(|| capture_err("capture buffer size mismatch".to_string()))?;
        let gray = image::DynamicImage::ImageRgba8(rgba).to_luma8();

        crop_to_rect(&gray, monitor, rect)
            .ok_or_else(|| capture_err("region lies outside the monitor".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

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
    fn primary_is_the_monitor_nearest_the_origin() {
        let monitors = vec![
            monitor(0, 1920, 0, 1920, 1080),
            monitor(1, 0, 0, 1920, 1080),
            monitor(2, -1920, 200, 1920, 1080),
        ];
        assert_eq!(primary_monitor(&monitors).unwrap().index, 1);
    }

    #[test]
    fn primary_handles_offset_layouts() {
        // No monitor at the exact origin; the closest one wins.
        let monitors = vec![monitor(0, 2560, 0, 2560, 1440), monitor(1, 100, 50, 2560, 1440)];
        assert_eq!(primary_monitor(&monitors).unwrap().index, 1);
        assert!(primary_monitor(&[]).is_none());
    }

    #[test]
    fn rect_center() {
        let rect = ScreenRect {
            left: 100,
            top: 100,
            width: 200,
            height: 100,
        };
        assert_eq!(rect.center(), (200, 150));
    }

    #[test]
    fn crop_clips_to_monitor_bounds() {
        let m = monitor(0, 0, 0, 100, 80);
        let frame = GrayImage::from_pixel(100, 80, Luma([7u8]));

        let rect = ScreenRect {
            left: 90,
            top: 70,
            width: 50,
            height: 50,
        };
        let cropped = crop_to_rect(&frame, &m, &rect).unwrap();
        assert_eq!(cropped.dimensions(), (10, 10));

        let off = ScreenRect {
            left: 200,
            top: 0,
            width: 10,
            height: 10,
        };
        assert!(crop_to_rect(&frame, &m, &off).is_none());
    }

    #[test]
    fn crop_is_relative_to_the_monitor_origin() {
        let m = monitor(1, 1000, 500, 100, 100);
        let mut frame = GrayImage::new(100, 100);
        frame.put_pixel(20, 30, Luma([255u8]));

        let rect = ScreenRect {
            left: 1020,
            top: 530,
            width: 10,
            height: 10,
        };
        let cropped = crop_to_rect(&frame, &m, &rect).unwrap();
        assert_eq!(cropped.get_pixel(0, 0)[0], 255);
    }
}
