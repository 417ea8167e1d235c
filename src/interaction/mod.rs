mod locator;

pub use locator::{CrosshairLocator, Tooltip};

use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrosshairPhase {
    /// No pointer over the plot; crosshair hidden, tooltip empty.
    #[default]
    Idle,
    /// Pointer horizontally inside the plot; tooltip populated.
    Tracking,
}

/// Pointer input in plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Enter { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Leave,
}

/// Public crosshair state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub phase: CrosshairPhase,
    /// Last pointer position, kept while the pointer is over the surface.
    pub pointer: Option<(f64, f64)>,
    pub tooltip: Option<Tooltip>,
}

impl CrosshairState {
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.phase == CrosshairPhase::Tracking
    }
}

/// Idle/tracking state machine driven by pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    crosshair: CrosshairState,
}

impl InteractionState {
    #[must_use]
    pub fn crosshair(self) -> CrosshairState {
        self.crosshair
    }

    #[must_use]
    pub fn phase(self) -> CrosshairPhase {
        self.crosshair.phase
    }

    #[must_use]
    pub fn tooltip(self) -> Option<Tooltip> {
        self.crosshair.tooltip
    }

    /// Applies one pointer event. `locator` is `None` when nothing is laid out.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        locator: Option<&CrosshairLocator<'_>>,
    ) -> CrosshairPhase {
        match event {
            PointerEvent::Enter { x, y } | PointerEvent::Move { x, y } => {
                self.on_pointer_move(x, y, locator);
            }
            PointerEvent::Leave => self.on_pointer_leave(),
        }
        self.crosshair.phase
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64, locator: Option<&CrosshairLocator<'_>>) {
        self.crosshair.pointer = Some((x, y));
        self.resolve(locator);
    }

    pub fn on_pointer_leave(&mut self) {
        self.crosshair.pointer = None;
        self.go_idle();
    }

    /// Re-resolves the last pointer position against a freshly committed layout.
    pub fn relocate(&mut self, locator: Option<&CrosshairLocator<'_>>) {
        if self.crosshair.pointer.is_some() {
            self.resolve(locator);
        }
    }

    fn resolve(&mut self, locator: Option<&CrosshairLocator<'_>>) {
        let Some((x, _)) = self.crosshair.pointer else {
            self.go_idle();
            return;
        };
        match locator.and_then(|locator| locator.locate(x)) {
            Some(tooltip) => {
                if self.crosshair.phase == CrosshairPhase::Idle {
                    trace!(x, index = tooltip.index, "crosshair tracking");
                }
                self.crosshair.phase = CrosshairPhase::Tracking;
                self.crosshair.tooltip = Some(tooltip);
            }
            None => self.go_idle(),
        }
    }

    fn go_idle(&mut self) {
        if self.crosshair.phase == CrosshairPhase::Tracking {
            trace!("crosshair idle");
        }
        self.crosshair.phase = CrosshairPhase::Idle;
        self.crosshair.tooltip = None;
    }
}
