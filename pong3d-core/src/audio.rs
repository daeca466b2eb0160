/// Sound effects fired by the choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Ball touches the table
    TableBounce,
    /// Ball turns around at a paddle
    PaddleStrike,
}

impl AudioCue {
    pub fn id(self) -> u8 {
        match self {
            AudioCue::TableBounce => 0,
            AudioCue::PaddleStrike => 1,
        }
    }
}

/// Fire-and-forget playback. No completion is reported and a cue may still
/// be sounding when the next one arrives.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Sink that drops every cue.
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: AudioCue) {}
}
