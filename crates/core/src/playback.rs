//! Transport state for the single audio player.
//!
//! [`PlaybackController`] owns the play/pause/seek/time state and drives
//! an [`AudioSink`], the handle to whatever actually produces sound. The
//! sink reports back through [`PlaybackController::on_time_update`],
//! [`PlaybackController::on_loaded`] and [`PlaybackController::on_ended`].

use serde::Serialize;

use crate::generation::GenerationResult;

/// The underlying audio resource.
pub trait AudioSink {
    /// Point the sink at a new resource and start loading it.
    fn load(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to `seconds` from the start.
    fn seek(&mut self, seconds: f64);
}

/// Snapshot of the transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    pub active_result: Option<GenerationResult>,
    pub is_playing: bool,
    pub current_time_seconds: f64,
    /// Zero until the sink has reported the track length.
    pub total_duration_seconds: f64,
}

pub struct PlaybackController<S: AudioSink> {
    sink: S,
    state: PlaybackState,
}

impl<S: AudioSink> PlaybackController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: PlaybackState::default(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn active(&self) -> Option<&GenerationResult> {
        self.state.active_result.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Bind `result` as the current track: reset the transport and tell
    /// the sink to load the new resource.
    pub fn set_active(&mut self, result: GenerationResult) {
        self.sink.load(&result.audio_reference);
        self.state = PlaybackState {
            active_result: Some(result),
            ..PlaybackState::default()
        };
    }

    /// Unbind the current track, pausing the sink if it was playing.
    pub fn clear(&mut self) {
        if self.state.is_playing {
            self.sink.pause();
        }
        self.state = PlaybackState::default();
    }

    /// Flip between playing and paused. No-op without an active track.
    pub fn toggle_playback(&mut self) {
        if self.state.active_result.is_none() {
            return;
        }
        if self.state.is_playing {
            self.sink.pause();
        } else {
            self.sink.play();
        }
        self.state.is_playing = !self.state.is_playing;
    }

    /// Seek to `fraction` of the track (clamped to `[0, 1]`).
    ///
    /// No-op while the length is unknown.
    pub fn seek(&mut self, fraction: f64) {
        if self.state.active_result.is_none() || self.state.total_duration_seconds <= 0.0 {
            return;
        }
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let target = fraction * self.state.total_duration_seconds;
        self.state.current_time_seconds = target;
        self.sink.seek(target);
    }

    pub fn on_time_update(&mut self, current: f64, total: f64) {
        self.state.current_time_seconds = sanitize(current);
        self.state.total_duration_seconds = sanitize(total);
    }

    /// Metadata arrived; only the length is known so far.
    pub fn on_loaded(&mut self, total: f64) {
        self.state.total_duration_seconds = sanitize(total);
    }

    /// Track finished. Stays on the same track.
    pub fn on_ended(&mut self) {
        self.state.is_playing = false;
    }

    /// Position as a fraction of the length, 0 when unknown.
    pub fn progress_fraction(&self) -> f64 {
        if self.state.total_duration_seconds > 0.0 {
            (self.state.current_time_seconds / self.state.total_duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

// Media elements report NaN/inf durations before metadata loads.
fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = sanitize(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Sink that drops every command. Useful for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn load(&mut self, _url: &str) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _seconds: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationParameters;

    #[derive(Debug, Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl AudioSink for RecordingSink {
        fn load(&mut self, url: &str) {
            self.calls.push(format!("load {url}"));
        }
        fn play(&mut self) {
            self.calls.push("play".into());
        }
        fn pause(&mut self) {
            self.calls.push("pause".into());
        }
        fn seek(&mut self, seconds: f64) {
            self.calls.push(format!("seek {seconds}"));
        }
    }

    fn result(job_id: &str) -> GenerationResult {
        GenerationResult {
            job_id: job_id.into(),
            success: true,
            prompt_used: "bachata".into(),
            antigravity_params: GenerationParameters::default(),
            audio_reference: format!("http://host/audio/{job_id}.wav"),
            error: None,
            seed: None,
            lyrics_used: None,
            duration_seconds: None,
            received_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn set_active_resets_and_loads() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.on_time_update(12.0, 60.0);
        player.toggle_playback();

        player.set_active(result("b"));
        let state = player.state();
        assert_eq!(state.active_result.as_ref().unwrap().job_id, "b");
        assert!(!state.is_playing);
        assert_eq!(state.current_time_seconds, 0.0);
        assert_eq!(player.sink().calls.last().unwrap(), "load http://host/audio/b.wav");
    }

    #[test]
    fn toggle_without_track_is_noop() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.toggle_playback();
        assert!(!player.state().is_playing);
        assert!(player.sink().calls.is_empty());
    }

    #[test]
    fn toggle_alternates_play_and_pause() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.toggle_playback();
        assert!(player.state().is_playing);
        player.toggle_playback();
        assert!(!player.state().is_playing);
        assert_eq!(player.sink().calls[1..], ["play", "pause"]);
    }

    #[test]
    fn seek_before_length_known_is_noop() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.seek(0.5);
        assert_eq!(player.state().current_time_seconds, 0.0);
        assert_eq!(player.sink().calls.len(), 1);
    }

    #[test]
    fn seek_jumps_to_fraction_of_length() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.on_loaded(120.0);
        player.seek(0.25);
        assert_eq!(player.state().current_time_seconds, 30.0);
        assert_eq!(player.sink().calls.last().unwrap(), "seek 30");

        player.seek(4.0);
        assert_eq!(player.state().current_time_seconds, 120.0);
    }

    #[test]
    fn ended_stops_without_advancing() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.toggle_playback();
        player.on_ended();
        assert!(!player.state().is_playing);
        assert_eq!(player.active().unwrap().job_id, "a");
    }

    #[test]
    fn clear_pauses_and_unbinds() {
        let mut player = PlaybackController::new(RecordingSink::default());
        player.set_active(result("a"));
        player.toggle_playback();
        player.clear();
        assert!(player.active().is_none());
        assert!(!player.state().is_playing);
        assert_eq!(player.sink().calls.last().unwrap(), "pause");
    }

    #[test]
    fn nan_duration_reads_as_unknown() {
        let mut player = PlaybackController::new(NullSink);
        player.set_active(result("a"));
        player.on_time_update(0.0, f64::NAN);
        assert_eq!(player.state().total_duration_seconds, 0.0);
        assert_eq!(player.progress_fraction(), 0.0);
    }

    #[test]
    fn progress_and_time_formatting() {
        let mut player = PlaybackController::new(NullSink);
        player.set_active(result("a"));
        player.on_time_update(45.0, 180.0);
        assert_eq!(player.progress_fraction(), 0.25);
        assert_eq!(format_time(45.0), "0:45");
        assert_eq!(format_time(204.9), "3:24");
        assert_eq!(format_time(f64::NAN), "0:00");
    }
}
