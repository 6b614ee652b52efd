//! PX4 tune strings playable through the command queue.

/// Number of entries in [`TUNES`].
pub const TUNE_COUNT: usize = 19;

/// PX4 default tune definitions, indexed by tune number.
pub const TUNES: [(&str, &str); TUNE_COUNT] = [
    ("startup", "MFT240L8 O4aO5dc O4aO5dc O4aO5dc L16dcdcdcdc"),
    ("error", "MBT200a8a8a8PaaaP"),
    ("notify positive", "MFT200e8a8a"),
    ("notify neutral", "MFT200e8e"),
    ("notify negative", "MFT200e8c8e8c8e8c8"),
    ("arming warning", "MNT75L1O2G"),
    ("battery warning slow", "MBNT100a8"),
    ("battery warning fast", "MBNT255a8a8a8a8a8a8a8a8a8a8a8a8a8a8a8a8"),
    ("gps warning slow", "MFT255L4AAAL1F#"),
    ("arming failure", "MFT255L4<<<BAP"),
    ("parachute release", "MFT255L16agagagag"),
    ("single beep", "MFT100a8"),
    ("home set", "MFT100L4>G#6A#6B#4"),
    ("make fs", "MFAGPAG"),
    ("format failed", "MNBG"),
    ("program px4io", "MLL32CP8MB"),
    ("program px4io success", "MLL8CDE"),
    ("program px4io fail", "ML<<CP4CP4CP4CP4CP4"),
    ("power off", "MFT255a8g8f8e8c8<b8a8g4"),
];

/// Tune string for `index`, if it is in range.
pub fn tune(index: i32) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| TUNES.get(i))
        .map(|(_, tune)| *tune)
}

/// Descriptive name for `index`, if it is in range.
pub fn tune_name(index: i32) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| TUNES.get(i))
        .map(|(name, _)| *name)
}
