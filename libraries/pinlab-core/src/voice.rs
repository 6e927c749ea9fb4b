//! Voice-controlled light switch
//!
//! One linear step per recognized phrase: match the transcript against the
//! two command phrases, drive the pin, report what happened. Nothing is
//! retained between phrases apart from the pin level itself.

use tracing::{info, warn};

use crate::error::Result;
use crate::session::PinSession;
use crate::traits::PinDriver;
use crate::types::{Level, PinId};

/// A recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    TurnOn,
    TurnOff,
}

impl VoiceCommand {
    pub const TURN_ON_PHRASE: &'static str = "turn on";
    pub const TURN_OFF_PHRASE: &'static str = "turn off";

    /// Find a command phrase anywhere in `text` (case-insensitive)
    ///
    /// "turn on" is checked before "turn off"; the first match wins.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains(Self::TURN_ON_PHRASE) {
            Some(Self::TurnOn)
        } else if text.contains(Self::TURN_OFF_PHRASE) {
            Some(Self::TurnOff)
        } else {
            None
        }
    }

    /// Level the light ends up at
    pub fn level(self) -> Level {
        match self {
            Self::TurnOn => Level::High,
            Self::TurnOff => Level::Low,
        }
    }
}

/// Result of one transcription attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// The service returned text
    Heard(String),
    /// The service could not make out any words
    Unintelligible,
    /// The request itself failed
    RequestFailed(String),
}

/// What the switch did with a transcription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A command matched and the pin was driven to this level
    Switched(Level),
    /// Text was heard but contained no command
    NotRecognized(String),
    /// No usable text (unintelligible audio or a failed request)
    NoCommand,
}

/// The LED driven by voice commands
pub struct LightSwitch<D: PinDriver> {
    session: PinSession<D>,
    pin: PinId,
}

impl<D: PinDriver> LightSwitch<D> {
    /// Claim `pin` with the light off
    pub fn new(driver: D, pin: PinId) -> Result<Self> {
        let mut session = PinSession::new(driver);
        session.claim_output(pin, Level::Low)?;
        Ok(Self { session, pin })
    }

    /// Act on one transcription
    ///
    /// Only a matched command touches the pin; everything else is logged and
    /// leaves the level as it was.
    pub fn handle(&mut self, transcription: &Transcription) -> Result<CommandOutcome> {
        match transcription {
            Transcription::Heard(text) => {
                info!(text = %text, "You said");
                match VoiceCommand::parse(text) {
                    Some(command) => {
                        let level = command.level();
                        self.session.set_level(self.pin, level)?;
                        match command {
                            VoiceCommand::TurnOn => info!("LED turned ON"),
                            VoiceCommand::TurnOff => info!("LED turned OFF"),
                        }
                        Ok(CommandOutcome::Switched(level))
                    }
                    None => {
                        info!("Command not recognized. Please say 'turn on' or 'turn off'.");
                        Ok(CommandOutcome::NotRecognized(text.clone()))
                    }
                }
            }
            Transcription::Unintelligible => {
                warn!("Sorry, I could not understand the audio.");
                info!("No valid command received.");
                Ok(CommandOutcome::NoCommand)
            }
            Transcription::RequestFailed(message) => {
                warn!(error = %message, "Could not request results");
                info!("No valid command received.");
                Ok(CommandOutcome::NoCommand)
            }
        }
    }

    pub fn level(&self) -> Level {
        self.session.level(self.pin).unwrap_or_default()
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Turn the light off and release the pin
    pub fn release(self) -> Result<()> {
        self.session.release()
    }
}
