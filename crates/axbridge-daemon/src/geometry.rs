//! Device-coordinate mapping.

use axbridge_core::geometry::absolute_position;
use axbridge_core::{Point, Rect, Size};

use crate::error::BridgeError;
use crate::platform::AutomationPlatform;
use crate::settings::ConfigRegistry;

/// Stateless view over the platform display and the `useDeviceRealSize`
/// setting.
#[derive(Clone, Copy)]
pub struct GeometryHelper<'a> {
    platform: &'a dyn AutomationPlatform,
    registry: &'a ConfigRegistry,
}

impl<'a> GeometryHelper<'a> {
    pub fn new(platform: &'a dyn AutomationPlatform, registry: &'a ConfigRegistry) -> Self {
        Self { platform, registry }
    }

    pub fn device_size(&self) -> Size {
        if self.registry.use_device_real_size() {
            self.platform.real_display_size()
        } else {
            self.platform.display_size()
        }
    }

    pub fn screen_rect(&self) -> Rect {
        self.device_size().as_rect()
    }

    /// Map a screen point to absolute device pixels. Fractions in (0, 1)
    /// are relative to the device size; the result must land on screen.
    pub fn device_abs_pos(&self, point: Point) -> Result<Point, BridgeError> {
        Ok(absolute_position(
            point,
            self.screen_rect(),
            Point::default(),
            true,
        )?)
    }

    /// Offset inside `bounds`, relative to its top-left corner.
    pub fn absolute_position_in(bounds: Rect, offset: Point) -> Result<Point, BridgeError> {
        let origin = Point::new(f64::from(bounds.left), f64::from(bounds.top));
        Ok(absolute_position(offset, bounds, origin, false)?)
    }
}
