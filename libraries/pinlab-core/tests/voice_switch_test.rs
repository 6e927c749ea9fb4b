//! Voice light switch scenarios against the simulated board

use pinlab_core::{
    CommandOutcome, Level, LightSwitch, PinError, PinId, SimulatedBoard, Transcription,
};

const LED: PinId = PinId::new(17);

fn heard(text: &str) -> Transcription {
    Transcription::Heard(text.to_string())
}

fn switch(board: &SimulatedBoard) -> LightSwitch<pinlab_core::SimulatedDriver> {
    LightSwitch::new(board.driver(), LED).unwrap()
}

#[test]
fn test_light_starts_off() {
    let board = SimulatedBoard::new();
    let light = switch(&board);

    assert_eq!(light.level(), Level::Low);
    assert_eq!(board.level(LED), Some(Level::Low));
    assert!(board.is_claimed(LED));
}

#[test]
fn test_turn_on_phrase_in_sentence() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);

    let outcome = light.handle(&heard("please turn on the light")).unwrap();

    assert_eq!(outcome, CommandOutcome::Switched(Level::High));
    assert_eq!(board.level(LED), Some(Level::High));
}

#[test]
fn test_turn_off_phrase() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);
    light.handle(&heard("turn on")).unwrap();

    let outcome = light.handle(&heard("turn off now")).unwrap();

    assert_eq!(outcome, CommandOutcome::Switched(Level::Low));
    assert_eq!(board.level(LED), Some(Level::Low));
}

#[test]
fn test_unrelated_phrase_leaves_pin_alone() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);
    light.handle(&heard("turn on")).unwrap();
    let writes_before = board.pin_state(LED).unwrap().writes;

    let outcome = light.handle(&heard("hello there")).unwrap();

    assert_eq!(outcome, CommandOutcome::NotRecognized("hello there".into()));
    assert_eq!(board.level(LED), Some(Level::High));
    assert_eq!(board.pin_state(LED).unwrap().writes, writes_before);
}

#[test]
fn test_transcription_failures_run_no_branch() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);
    light.handle(&heard("turn on")).unwrap();
    let writes_before = board.pin_state(LED).unwrap().writes;

    let unintelligible = light.handle(&Transcription::Unintelligible).unwrap();
    let failed = light
        .handle(&Transcription::RequestFailed("connection reset".into()))
        .unwrap();

    assert_eq!(unintelligible, CommandOutcome::NoCommand);
    assert_eq!(failed, CommandOutcome::NoCommand);
    assert_eq!(board.level(LED), Some(Level::High));
    assert_eq!(board.pin_state(LED).unwrap().writes, writes_before);
}

#[test]
fn test_commands_are_idempotent() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);

    light.handle(&heard("turn on")).unwrap();
    light.handle(&heard("turn on")).unwrap();
    assert_eq!(board.level(LED), Some(Level::High));

    light.handle(&heard("turn off")).unwrap();
    light.handle(&heard("turn off")).unwrap();
    assert_eq!(board.level(LED), Some(Level::Low));
}

#[test]
fn test_driver_error_propagates() {
    let board = SimulatedBoard::new();
    let mut light = switch(&board);
    board.fail_next_operation("line busy");

    let result = light.handle(&heard("turn on"));

    assert_eq!(result, Err(PinError::driver("line busy")));
    assert_eq!(light.level(), Level::Low);
}

#[test]
fn test_cleanup_leaves_pin_low_and_claimable() {
    let board = SimulatedBoard::new();
    {
        let mut light = switch(&board);
        light.handle(&heard("turn on")).unwrap();
        // Dropped without an explicit release, as on an error path
    }

    assert_eq!(board.level(LED), Some(Level::Low));
    assert!(!board.is_claimed(LED));

    let next_process = switch(&board);
    assert!(board.is_claimed(LED));
    next_process.release().unwrap();
    assert!(board.claimed_pins().is_empty());
}
