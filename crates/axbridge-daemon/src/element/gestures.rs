//! Gestures on an element. Bounds are read fresh for every call.

use std::time::Duration;

use axbridge_core::{Direction, Gesture, Point, Rect, DEFAULT_LONG_CLICK};
use tracing::debug;

use super::ElementHandle;
use crate::bridge::AutomationBridge;
use crate::error::BridgeError;

pub const DEFAULT_DRAG_STEPS: u32 = 20;

fn check_percent(percent: f32) -> Result<f32, BridgeError> {
    if !(0.0..=1.0).contains(&percent) {
        return Err(BridgeError::InvalidArgument(format!(
            "percent must be within [0, 1], got {percent}"
        )));
    }
    Ok(percent)
}

impl ElementHandle {
    fn visible_bounds(&self, bridge: &AutomationBridge) -> Result<Rect, BridgeError> {
        let bounds = self.get_bounds(bridge)?;
        if bounds.is_empty() {
            return Err(BridgeError::InvalidState {
                message: format!("element {} has no on-screen area", self.id),
            });
        }
        Ok(bounds)
    }

    fn perform(&self, bridge: &AutomationBridge, gesture: Gesture) -> Result<(), BridgeError> {
        debug!(element_id = %self.id, gesture = gesture.name(), "Performing gesture");
        if bridge.platform().perform_gesture(&gesture) {
            Ok(())
        } else {
            Err(BridgeError::InvalidState {
                message: format!("{} was not performed by the platform", gesture.name()),
            })
        }
    }

    pub fn click(&self, bridge: &AutomationBridge) -> Result<(), BridgeError> {
        let at = self.visible_bounds(bridge)?.center();
        self.perform(bridge, Gesture::Click { at })
    }

    pub fn long_click(
        &self,
        bridge: &AutomationBridge,
        duration: Option<Duration>,
    ) -> Result<(), BridgeError> {
        let at = self.visible_bounds(bridge)?.center();
        self.perform(
            bridge,
            Gesture::LongClick {
                at,
                duration: duration.unwrap_or(DEFAULT_LONG_CLICK),
            },
        )
    }

    /// Drag from the element center to a screen point. Fractions in (0, 1)
    /// are relative to the device size.
    pub fn drag_to_point(
        &self,
        bridge: &AutomationBridge,
        point: Point,
        steps: Option<u32>,
    ) -> Result<(), BridgeError> {
        let from = self.visible_bounds(bridge)?.center();
        let to = bridge.geometry().device_abs_pos(point)?;
        self.perform(
            bridge,
            Gesture::Drag {
                from,
                to,
                steps: steps.unwrap_or(DEFAULT_DRAG_STEPS),
            },
        )
    }

    /// Drag onto another element, of either backend, at its current center.
    pub fn drag_to_element(
        &self,
        bridge: &AutomationBridge,
        target: &ElementHandle,
        steps: Option<u32>,
    ) -> Result<(), BridgeError> {
        let from = self.visible_bounds(bridge)?.center();
        let to = target.visible_bounds(bridge)?.center();
        self.perform(
            bridge,
            Gesture::Drag {
                from,
                to,
                steps: steps.unwrap_or(DEFAULT_DRAG_STEPS),
            },
        )
    }

    pub fn pinch_open(
        &self,
        bridge: &AutomationBridge,
        percent: f32,
        speed: Option<u32>,
    ) -> Result<(), BridgeError> {
        let percent = check_percent(percent)?;
        let area = self.visible_bounds(bridge)?;
        self.perform(
            bridge,
            Gesture::PinchOpen {
                area,
                percent,
                speed,
            },
        )
    }

    pub fn pinch_close(
        &self,
        bridge: &AutomationBridge,
        percent: f32,
        speed: Option<u32>,
    ) -> Result<(), BridgeError> {
        let percent = check_percent(percent)?;
        let area = self.visible_bounds(bridge)?;
        self.perform(
            bridge,
            Gesture::PinchClose {
                area,
                percent,
                speed,
            },
        )
    }

    pub fn swipe(
        &self,
        bridge: &AutomationBridge,
        direction: Direction,
        percent: f32,
        speed: Option<u32>,
    ) -> Result<(), BridgeError> {
        let percent = check_percent(percent)?;
        let area = self.visible_bounds(bridge)?;
        self.perform(
            bridge,
            Gesture::Swipe {
                area,
                direction,
                percent,
                speed,
            },
        )
    }

    pub fn scroll(
        &self,
        bridge: &AutomationBridge,
        direction: Direction,
        percent: f32,
        speed: Option<u32>,
    ) -> Result<(), BridgeError> {
        let percent = check_percent(percent)?;
        let area = self.visible_bounds(bridge)?;
        self.perform(
            bridge,
            Gesture::Scroll {
                area,
                direction,
                percent,
                speed,
            },
        )
    }

    pub fn fling(
        &self,
        bridge: &AutomationBridge,
        direction: Direction,
        speed: Option<u32>,
    ) -> Result<(), BridgeError> {
        let area = self.visible_bounds(bridge)?;
        self.perform(
            bridge,
            Gesture::Fling {
                area,
                direction,
                speed,
            },
        )
    }
}
