//! The GPIO panel behind the window
//!
//! One panel per process, chosen at startup. Command handlers reach it
//! through [`PanelState`], whose mutex serializes every pin change.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pinlab_core::{Dimmer, LabConfig, LedSelector, Level, PinError};
use pinlab_gpio::BoxedDriver;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    /// Radio buttons, exactly one LED lit
    Selector,
    /// One brightness slider per LED
    Dimmer,
}

impl PanelKind {
    pub fn title(self) -> &'static str {
        match self {
            PanelKind::Selector => "RPi LED Controller",
            PanelKind::Dimmer => "LED Intensity Control",
        }
    }
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("{0}")]
    Pin(#[from] PinError),

    #[error("this action needs the {expected:?} panel, but the {open:?} panel is open")]
    WrongPanel { expected: PanelKind, open: PanelKind },

    #[error("the panel has been closed")]
    Closed,
}

/// One control as the frontend draws it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlView {
    pub index: usize,
    pub label: String,
    pub pin: u8,
    pub level: Option<Level>,
    /// Percent, dimmer only
    pub duty: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub kind: PanelKind,
    pub title: &'static str,
    pub selected: Option<String>,
    pub controls: Vec<ControlView>,
}

pub enum Panel {
    Selector(LedSelector<BoxedDriver>),
    Dimmer(Dimmer<BoxedDriver>),
}

impl Panel {
    /// Claim the configured LEDs for `kind`
    ///
    /// The selector starts with the first LED lit; the dimmer starts dark.
    pub fn open(kind: PanelKind, driver: BoxedDriver, config: &LabConfig) -> Result<Self, PanelError> {
        let panel = match kind {
            PanelKind::Selector => {
                let mut selector = LedSelector::new(driver, config.leds.clone())?;
                selector.select_default()?;
                Panel::Selector(selector)
            }
            PanelKind::Dimmer => Panel::Dimmer(Dimmer::new(
                driver,
                config.leds.clone(),
                config.dimmer.frequency_hz,
            )?),
        };
        info!(panel = ?kind, leds = config.leds.len(), "Panel opened");
        Ok(panel)
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::Selector(_) => PanelKind::Selector,
            Panel::Dimmer(_) => PanelKind::Dimmer,
        }
    }

    pub fn view(&self) -> PanelView {
        match self {
            Panel::Selector(selector) => PanelView {
                kind: PanelKind::Selector,
                title: PanelKind::Selector.title(),
                selected: selector.selected().map(str::to_string),
                controls: selector
                    .leds()
                    .iter()
                    .enumerate()
                    .map(|(index, led)| ControlView {
                        index,
                        label: led.label.clone(),
                        pin: led.pin.number(),
                        level: selector.level(&led.label),
                        duty: None,
                    })
                    .collect(),
            },
            Panel::Dimmer(dimmer) => PanelView {
                kind: PanelKind::Dimmer,
                title: PanelKind::Dimmer.title(),
                selected: None,
                controls: dimmer
                    .leds()
                    .iter()
                    .enumerate()
                    .map(|(index, led)| ControlView {
                        index,
                        label: format!("LED {} ({})", index + 1, led.pin),
                        pin: led.pin.number(),
                        level: None,
                        duty: dimmer.duty(index).map(|duty| duty.percent()),
                    })
                    .collect(),
            },
        }
    }

    pub fn select_led(&mut self, label: &str) -> Result<(), PanelError> {
        match self {
            Panel::Selector(selector) => Ok(selector.select(label)?),
            Panel::Dimmer(_) => Err(PanelError::WrongPanel {
                expected: PanelKind::Selector,
                open: PanelKind::Dimmer,
            }),
        }
    }

    /// Returns the applied duty in percent
    pub fn set_duty(&mut self, index: usize, value: f64) -> Result<f64, PanelError> {
        match self {
            Panel::Dimmer(dimmer) => Ok(dimmer.set_duty(index, value)?.percent()),
            Panel::Selector(_) => Err(PanelError::WrongPanel {
                expected: PanelKind::Dimmer,
                open: PanelKind::Selector,
            }),
        }
    }

    /// Turn every LED off and release the pins
    pub fn release(self) -> pinlab_core::Result<()> {
        match self {
            Panel::Selector(selector) => selector.release(),
            Panel::Dimmer(dimmer) => dimmer.release(),
        }
    }
}

/// Tauri-managed panel state
pub struct PanelState {
    panel: Mutex<Option<Panel>>,
}

impl PanelState {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel: Mutex::new(Some(panel)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Panel>> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_panel<T>(
        &self,
        f: impl FnOnce(&mut Panel) -> Result<T, PanelError>,
    ) -> Result<T, PanelError> {
        let mut guard = self.lock();
        let panel = guard.as_mut().ok_or(PanelError::Closed)?;
        f(panel)
    }

    pub fn view(&self) -> Result<PanelView, PanelError> {
        self.with_panel(|panel| Ok(panel.view()))
    }

    pub fn select_led(&self, label: &str) -> Result<PanelView, PanelError> {
        self.with_panel(|panel| {
            panel.select_led(label)?;
            Ok(panel.view())
        })
    }

    pub fn set_duty(&self, index: usize, value: f64) -> Result<f64, PanelError> {
        self.with_panel(|panel| panel.set_duty(index, value))
    }

    /// Release the pins once
    ///
    /// Returns `false` when the panel was already released. Safe to call from
    /// every exit path.
    pub fn shutdown(&self) -> pinlab_core::Result<bool> {
        let Some(panel) = self.lock().take() else {
            return Ok(false);
        };

        let kind = panel.kind();
        match panel.release() {
            Ok(()) => {
                info!(panel = ?kind, "Panel closed, pins released");
                Ok(true)
            }
            Err(e) => {
                warn!(panel = ?kind, error = %e, "Panel cleanup failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinlab_core::{PinId, SimulatedBoard};

    const RED: PinId = PinId::new(17);
    const GREEN: PinId = PinId::new(27);
    const YELLOW: PinId = PinId::new(22);

    fn open(kind: PanelKind) -> (SimulatedBoard, PanelState) {
        let board = SimulatedBoard::new();
        let driver: BoxedDriver = Box::new(board.driver());
        let panel = Panel::open(kind, driver, &LabConfig::default()).unwrap();
        (board, PanelState::new(panel))
    }

    #[test]
    fn test_selector_starts_on_first_led() {
        let (board, state) = open(PanelKind::Selector);

        let view = state.view().unwrap();
        assert_eq!(view.kind, PanelKind::Selector);
        assert_eq!(view.title, "RPi LED Controller");
        assert_eq!(view.selected.as_deref(), Some("Red"));
        assert_eq!(view.controls.len(), 3);
        assert_eq!(board.high_pins(), vec![RED]);
    }

    #[test]
    fn test_select_led_lights_only_that_led() {
        let (board, state) = open(PanelKind::Selector);

        let view = state.select_led("Yellow").unwrap();
        assert_eq!(view.selected.as_deref(), Some("Yellow"));
        assert_eq!(board.high_pins(), vec![YELLOW]);

        let yellow = view.controls.iter().find(|c| c.label == "Yellow").unwrap();
        assert_eq!(yellow.level, Some(Level::High));
    }

    #[test]
    fn test_unknown_label_changes_nothing() {
        let (board, state) = open(PanelKind::Selector);
        state.select_led("Green").unwrap();

        let err = state.select_led("Blue").unwrap_err();
        assert!(matches!(err, PanelError::Pin(PinError::UnknownLabel(_))));
        assert_eq!(board.high_pins(), vec![GREEN]);
    }

    #[test]
    fn test_dimmer_sliders_are_independent() {
        let (board, state) = open(PanelKind::Dimmer);

        assert_eq!(state.set_duty(2, 40.0).unwrap(), 40.0);
        assert_eq!(state.set_duty(0, 75.5).unwrap(), 75.5);

        let view = state.view().unwrap();
        let duties: Vec<_> = view.controls.iter().map(|c| c.duty).collect();
        assert_eq!(duties, vec![Some(75.5), Some(0.0), Some(40.0)]);
        assert_eq!(view.controls[0].label, "LED 1 (GPIO 17)");

        assert_eq!(board.duty_cycle(RED).map(|d| d.percent()), Some(75.5));
        assert_eq!(board.duty_cycle(YELLOW).map(|d| d.percent()), Some(40.0));
    }

    #[test]
    fn test_dimmer_rejects_bad_input() {
        let (_board, state) = open(PanelKind::Dimmer);

        assert!(matches!(
            state.set_duty(3, 10.0),
            Err(PanelError::Pin(PinError::UnknownControl(3)))
        ));
        assert!(matches!(
            state.set_duty(0, 101.0),
            Err(PanelError::Pin(PinError::InvalidDutyCycle(_)))
        ));
    }

    #[test]
    fn test_wrong_panel_action() {
        let (_board, state) = open(PanelKind::Dimmer);
        assert!(matches!(
            state.select_led("Red"),
            Err(PanelError::WrongPanel {
                expected: PanelKind::Selector,
                open: PanelKind::Dimmer
            })
        ));

        let (_board, state) = open(PanelKind::Selector);
        assert!(matches!(
            state.set_duty(0, 50.0),
            Err(PanelError::WrongPanel { .. })
        ));
    }

    #[test]
    fn test_shutdown_releases_once() {
        let (board, state) = open(PanelKind::Dimmer);
        state.set_duty(1, 90.0).unwrap();

        assert!(state.shutdown().unwrap());
        for pin in [RED, GREEN, YELLOW] {
            assert!(!board.is_claimed(pin));
            assert_eq!(board.level(pin), Some(Level::Low));
            assert!(board.duty_cycle(pin).is_none());
        }

        // Window close and app exit both call shutdown
        assert!(!state.shutdown().unwrap());
        assert!(matches!(state.view(), Err(PanelError::Closed)));
    }
}
