//! Audio Turn Buffering
//!
//! Live capture streams many small binary frames per spoken answer. The
//! session state machine only ever sees one complete clip per turn, so this
//! buffer accumulates frames during the turn and finalizes them into a
//! single `AudioClip` at end-of-turn.

use bytes::BytesMut;
use quizdrill_core::transcription::AudioClip;

/// Accumulates streamed audio frames for one spoken answer.
#[derive(Debug, Default)]
pub struct AudioTurnBuffer {
    frames: BytesMut,
    filename: Option<String>,
}

impl AudioTurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the container format for the clip under construction
    /// (e.g. "answer.wav"). Defaults to WAV if never set.
    pub fn set_format(&mut self, filename: String) {
        self.filename = Some(filename);
    }

    /// Appends one captured frame to the current turn.
    pub fn push_frame(&mut self, frame: &[u8]) {
        self.frames.extend_from_slice(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Finalizes the accumulated frames into one complete clip and resets
    /// the buffer for the next turn.
    pub fn finalize(&mut self) -> AudioClip {
        let bytes = self.frames.split().to_vec();
        let filename = self
            .filename
            .clone()
            .unwrap_or_else(|| "answer.wav".to_string());
        AudioClip::new(filename, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_accumulate_in_order() {
        let mut buffer = AudioTurnBuffer::new();
        buffer.push_frame(&[1, 2]);
        buffer.push_frame(&[3]);
        buffer.push_frame(&[4, 5, 6]);

        let clip = buffer.finalize();
        assert_eq!(clip.bytes, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(clip.filename, "answer.wav");
    }

    #[test]
    fn finalize_resets_the_buffer_for_the_next_turn() {
        let mut buffer = AudioTurnBuffer::new();
        buffer.push_frame(&[7, 8]);
        let first = buffer.finalize();
        assert_eq!(first.bytes, vec![7, 8]);
        assert!(buffer.is_empty());

        buffer.push_frame(&[9]);
        let second = buffer.finalize();
        assert_eq!(second.bytes, vec![9]);
    }

    #[test]
    fn format_hint_is_carried_into_the_clip() {
        let mut buffer = AudioTurnBuffer::new();
        buffer.set_format("answer.mp3".to_string());
        buffer.push_frame(&[1]);

        assert_eq!(buffer.finalize().filename, "answer.mp3");
    }

    #[test]
    fn empty_turn_finalizes_to_an_empty_clip() {
        let mut buffer = AudioTurnBuffer::new();
        assert!(buffer.is_empty());

        let clip = buffer.finalize();
        assert!(clip.bytes.is_empty());
    }
}
