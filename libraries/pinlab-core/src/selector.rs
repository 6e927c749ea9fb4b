//! Radio-button LED selector
//!
//! Exactly one LED of the map is lit at a time: selecting a label drives its
//! pin high and every other mapped pin low.

use tracing::info;

use crate::error::{PinError, Result};
use crate::session::PinSession;
use crate::traits::PinDriver;
use crate::types::{LedMap, Level};

pub struct LedSelector<D: PinDriver> {
    session: PinSession<D>,
    leds: LedMap,
    selected: Option<String>,
}

impl<D: PinDriver> LedSelector<D> {
    /// Claim every mapped pin, all low, with nothing selected
    pub fn new(driver: D, leds: LedMap) -> Result<Self> {
        let mut session = PinSession::new(driver);
        session.claim_all(leds.pins())?;
        info!(leds = leds.len(), "LED selector ready");

        Ok(Self {
            session,
            leds,
            selected: None,
        })
    }

    /// Light `label` and turn every other LED off
    ///
    /// # Errors
    /// `UnknownLabel` if the label is not mapped; no pin is touched then.
    pub fn select(&mut self, label: &str) -> Result<()> {
        if self.leds.get(label).is_none() {
            return Err(PinError::UnknownLabel(label.to_string()));
        }

        for binding in &self.leds {
            let level = Level::from(binding.label == label);
            self.session.set_level(binding.pin, level)?;
        }

        self.selected = Some(label.to_string());
        info!(led = label, "Selected LED");
        Ok(())
    }

    /// Select the first LED of the map (the startup choice)
    pub fn select_default(&mut self) -> Result<()> {
        let first = self
            .leds
            .labels()
            .next()
            .map(str::to_string)
            .ok_or_else(|| PinError::InvalidLedMap("no LEDs to select".into()))?;
        self.select(&first)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn leds(&self) -> &LedMap {
        &self.leds
    }

    /// Level of the LED wired to `label`
    pub fn level(&self, label: &str) -> Option<Level> {
        self.leds
            .get(label)
            .and_then(|pin| self.session.level(pin))
    }

    /// Turn everything off and release the pins
    pub fn release(self) -> Result<()> {
        self.session.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedBoard;
    use crate::types::PinId;

    #[test]
    fn test_starts_all_low_with_nothing_selected() {
        let board = SimulatedBoard::new();
        let selector = LedSelector::new(board.driver(), LedMap::default()).unwrap();

        assert_eq!(selector.selected(), None);
        assert!(board.high_pins().is_empty());
        assert_eq!(board.claimed_pins().len(), 3);
    }

    #[test]
    fn test_select_default_lights_first_led() {
        let board = SimulatedBoard::new();
        let mut selector = LedSelector::new(board.driver(), LedMap::default()).unwrap();
        selector.select_default().unwrap();

        assert_eq!(selector.selected(), Some("Red"));
        assert_eq!(board.high_pins(), vec![PinId::new(17)]);
    }

    #[test]
    fn test_switching_selection_turns_previous_off() {
        let board = SimulatedBoard::new();
        let mut selector = LedSelector::new(board.driver(), LedMap::default()).unwrap();

        selector.select("Red").unwrap();
        selector.select("Yellow").unwrap();

        assert_eq!(selector.level("Red"), Some(Level::Low));
        assert_eq!(selector.level("Yellow"), Some(Level::High));
        assert_eq!(board.high_pins(), vec![PinId::new(22)]);
    }

    #[test]
    fn test_unknown_label_changes_nothing() {
        let board = SimulatedBoard::new();
        let mut selector = LedSelector::new(board.driver(), LedMap::default()).unwrap();
        selector.select("Green").unwrap();

        let result = selector.select("Blue");

        assert_eq!(result, Err(PinError::UnknownLabel("Blue".into())));
        assert_eq!(selector.selected(), Some("Green"));
        assert_eq!(board.high_pins(), vec![PinId::new(27)]);
    }
}
