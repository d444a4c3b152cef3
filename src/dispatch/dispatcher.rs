//! The dispatcher aggregate
//!
//! Owns all mutable home state (devices, playlist, audio backend, emergency
//! sequence). Exactly one owner exists at a time, so dispatching needs no
//! locking of its own.

use tracing::{debug, info, warn};

use super::effect::Effect;
use super::messages;
use crate::audio::AudioBackend;
use crate::commands::Intent;
use crate::devices::{Device, DeviceStore};
use crate::emergency::{EmergencySequencer, Tick};
use crate::playlist::Playlist;

pub struct Dispatcher {
    devices: DeviceStore,
    playlist: Playlist,
    audio: Box<dyn AudioBackend>,
    emergency: EmergencySequencer,
    /// Next supportive message to use (round-robin)
    support_cursor: usize,
}

impl Dispatcher {
    pub fn new(
        playlist: Playlist,
        audio: Box<dyn AudioBackend>,
        emergency: EmergencySequencer,
    ) -> Self {
        Self {
            devices: DeviceStore::new(),
            playlist,
            audio,
            emergency,
            support_cursor: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn devices(&self) -> &DeviceStore {
        &self.devices
    }

    #[cfg(test)]
    pub(crate) fn emergency_state(&self) -> crate::emergency::EmergencyState {
        self.emergency.state()
    }

    /// Apply an intent
    pub fn dispatch(&mut self, intent: Intent) -> Vec<Effect> {
        debug!(%intent, "dispatching");

        match intent {
            Intent::DeviceOn(device) => self.switch(device, true),
            Intent::DeviceOff(device) => self.switch(device, false),
            Intent::DeviceToggle(device) => self.toggle(device),
            Intent::Emergency => self.trigger_emergency(),
            Intent::EmotionalSupport => vec![Effect::Speak(self.next_supportive_message())],
            Intent::Help => vec![Effect::Speak(messages::HELP.to_string())],
            Intent::Unknown => vec![Effect::Speak(messages::UNKNOWN.to_string())],
        }
    }

    /// Set an absolute state; nothing happens if the device is already there
    fn switch(&mut self, device: Device, on: bool) -> Vec<Effect> {
        if self.devices.get_state(device) == on {
            debug!(%device, on, "device already in requested state");
            return Vec::new();
        }
        self.apply(device, on)
    }

    /// Flip a device unconditionally
    pub fn toggle(&mut self, device: Device) -> Vec<Effect> {
        let on = !self.devices.get_state(device);
        self.apply(device, on)
    }

    fn apply(&mut self, device: Device, on: bool) -> Vec<Effect> {
        let mut effects = Vec::new();

        if device == Device::Music {
            if on {
                effects.push(self.start_playback());
            } else {
                self.audio.stop();
                effects.push(Effect::NowPlaying(messages::MUSIC_STOPPED.to_string()));
            }
        }

        let transition = self.devices.set_state(device, on);
        info!(%device, on, "device switched");

        effects.push(Effect::DeviceChanged { device, on });
        if let Some(notice) = transition.notice() {
            effects.push(Effect::Speak(notice.to_string()));
        }
        effects
    }

    /// Play the current track, falling back to simulated playback
    fn start_playback(&mut self) -> Effect {
        let Some(track) = self.playlist.current() else {
            return Effect::NowPlaying(messages::simulating(""));
        };
        let name = track.display_name().to_string();
        if !track.has_file() {
            return Effect::NowPlaying(messages::simulating(&name));
        }

        let result = self
            .audio
            .load_track(track.path())
            .and_then(|handle| self.audio.play(&handle, true));

        match result {
            Ok(()) => Effect::NowPlaying(messages::playing(&name)),
            Err(e) => {
                warn!(track = %name, error = %e, "playback unavailable, simulating");
                Effect::NowPlaying(messages::simulating(&name))
            }
        }
    }

    fn next_supportive_message(&mut self) -> String {
        let message = messages::SUPPORTIVE_MESSAGES[self.support_cursor];
        self.support_cursor = (self.support_cursor + 1) % messages::SUPPORTIVE_MESSAGES.len();
        message.to_string()
    }

    /// Arm the emergency countdown unless one is already running
    pub fn trigger_emergency(&mut self) -> Vec<Effect> {
        if !self.emergency.trigger() {
            return Vec::new();
        }

        let seconds = self.emergency.countdown_secs();
        let mut effects = vec![
            Effect::EmergencyChanged(self.emergency.state()),
            Effect::Speak(messages::emergency_warning(seconds)),
        ];

        if seconds == 0 {
            effects.push(Effect::ContactEmergency(self.emergency.contact_id().to_string()));
        } else {
            effects.push(Effect::Display(messages::emergency_countdown(seconds)));
            effects.push(Effect::StartCountdown);
        }
        effects
    }

    /// Advance the countdown by one second
    pub fn emergency_tick(&mut self) -> Vec<Effect> {
        match self.emergency.tick() {
            Some(Tick::Remaining(seconds)) => vec![
                Effect::EmergencyChanged(self.emergency.state()),
                Effect::Display(messages::emergency_countdown(seconds)),
            ],
            Some(Tick::Contact) => vec![
                Effect::EmergencyChanged(self.emergency.state()),
                Effect::ContactEmergency(self.emergency.contact_id().to_string()),
            ],
            None => Vec::new(),
        }
    }

    /// Finish the sequence once the contact attempt is over.
    ///
    /// A failed contact is terminal: the user is told to call manually and
    /// the sequence still completes.
    pub fn emergency_contact_finished(&mut self, contacted: bool) -> Vec<Effect> {
        if !self.emergency.complete(contacted) {
            return Vec::new();
        }

        let mut effects = vec![Effect::EmergencyChanged(self.emergency.state())];
        if contacted {
            effects.push(Effect::Display(messages::HELP_ON_THE_WAY.to_string()));
        } else {
            effects.push(Effect::Speak(messages::CALL_MANUALLY.to_string()));
        }

        self.emergency.reset();
        effects.push(Effect::EmergencyChanged(self.emergency.state()));
        effects.push(Effect::Display(messages::EMERGENCY_DONE.to_string()));
        effects
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::audio::{write_tone, AudioError, SimulatedBackend, TrackHandle};
    use crate::emergency::EmergencyState;
    use crate::playlist::MusicTrack;

    /// Records backend calls; fails to load when `available` is false
    #[derive(Clone, Default)]
    struct FakeAudio {
        available: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl AudioBackend for FakeAudio {
        fn load_track(&mut self, path: &Path) -> Result<TrackHandle, AudioError> {
            self.calls.lock().unwrap().push(format!("load {}", path.display()));
            if self.available {
                Ok(TrackHandle::new(path))
            } else {
                Err(AudioError::NotFound(path.to_owned()))
            }
        }

        fn play(&mut self, handle: &TrackHandle, looped: bool) -> Result<(), AudioError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("play {} {}", handle.path().display(), looped));
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.lock().unwrap().push("stop".to_string());
        }
    }

    fn dispatcher_with(audio: FakeAudio) -> Dispatcher {
        let playlist = Playlist::new(vec![MusicTrack::new(PathBuf::from("song.mp3"), "song")]);
        Dispatcher::new(playlist, Box::new(audio), EmergencySequencer::new(5, "tel:112"))
    }

    fn dispatcher() -> Dispatcher {
        dispatcher_with(FakeAudio::default())
    }

    fn spoken(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Speak(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_device_on_is_idempotent() {
        for device in Device::ALL {
            let mut d = dispatcher();

            let first = d.dispatch(Intent::DeviceOn(device));
            assert!(d.devices().get_state(device));
            assert_eq!(spoken(&first), vec![device.notice(true)]);

            let second = d.dispatch(Intent::DeviceOn(device));
            assert!(d.devices().get_state(device));
            assert!(second.is_empty());
        }
    }

    #[test]
    fn test_device_off_when_already_off() {
        let mut d = dispatcher();
        assert!(d.dispatch(Intent::DeviceOff(Device::Fan)).is_empty());
        assert!(!d.devices().get_state(Device::Fan));
    }

    #[test]
    fn test_device_off_after_on() {
        let mut d = dispatcher();
        d.dispatch(Intent::DeviceOn(Device::Fan));
        let effects = d.dispatch(Intent::DeviceOff(Device::Fan));
        assert_eq!(spoken(&effects), vec!["Fan turned off"]);
        assert!(!d.devices().get_state(Device::Fan));
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        for device in Device::ALL {
            let mut d = dispatcher();
            d.dispatch(Intent::DeviceToggle(device));
            assert!(d.devices().get_state(device));
            d.dispatch(Intent::DeviceToggle(device));
            assert!(!d.devices().get_state(device));
        }
    }

    #[test]
    fn test_turn_on_light_utterance() {
        let mut d = dispatcher();
        let effects = d.dispatch(crate::commands::classify("turn on light"));

        assert_eq!(spoken(&effects), vec!["Light turned on"]);
        assert!(effects.contains(&Effect::DeviceChanged {
            device: Device::Light,
            on: true
        }));
    }

    #[test]
    fn test_bare_light_utterance_toggles() {
        let mut d = dispatcher();
        d.dispatch(crate::commands::classify("light"));
        assert!(d.devices().get_state(Device::Light));
        d.dispatch(crate::commands::classify("light"));
        assert!(!d.devices().get_state(Device::Light));
    }

    #[test]
    fn test_music_plays_available_track() {
        let audio = FakeAudio {
            available: true,
            ..Default::default()
        };
        let calls = audio.calls.clone();
        let mut d = dispatcher_with(audio);

        let effects = d.dispatch(Intent::DeviceOn(Device::Music));

        assert!(effects.contains(&Effect::NowPlaying("Playing: song".to_string())));
        assert_eq!(spoken(&effects), vec!["Music started"]);
        assert_eq!(*calls.lock().unwrap(), vec!["load song.mp3", "play song.mp3 true"]);
    }

    #[test]
    fn test_music_falls_back_to_simulation() {
        let mut d = dispatcher();
        let effects = d.dispatch(Intent::DeviceToggle(Device::Music));

        assert!(d.devices().get_state(Device::Music));
        assert!(effects.contains(&Effect::NowPlaying("Simulating: song".to_string())));
        assert_eq!(spoken(&effects), vec!["Music started"]);
    }

    fn simulated_dispatcher(track: MusicTrack) -> Dispatcher {
        Dispatcher::new(
            Playlist::new(vec![track]),
            Box::new(SimulatedBackend::new()),
            EmergencySequencer::new(5, "tel:112"),
        )
    }

    #[test]
    fn test_simulated_backend_reports_real_track_as_simulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_tone(&path, 800);

        let mut d = simulated_dispatcher(MusicTrack::new(path, "tone"));
        let effects = d.dispatch(Intent::DeviceOn(Device::Music));

        assert!(d.devices().get_state(Device::Music));
        assert_eq!(
            effects.first(),
            Some(&Effect::NowPlaying("Simulating: tone".to_string()))
        );
        assert_eq!(spoken(&effects), vec!["Music started"]);
    }

    #[test]
    fn test_non_audio_track_is_simulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"not audio at all").unwrap();

        let mut d = simulated_dispatcher(MusicTrack::new(path, "song"));
        let effects = d.dispatch(Intent::DeviceOn(Device::Music));

        assert_eq!(
            effects.first(),
            Some(&Effect::NowPlaying("Simulating: song".to_string()))
        );
    }

    #[test]
    fn test_music_off_always_stops_backend() {
        let audio = FakeAudio::default();
        let calls = audio.calls.clone();
        let mut d = dispatcher_with(audio);

        // Simulated playback, nothing was really playing
        d.dispatch(Intent::DeviceOn(Device::Music));
        let effects = d.dispatch(Intent::DeviceOff(Device::Music));

        assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("stop"));
        assert!(effects.contains(&Effect::NowPlaying("Music stopped".to_string())));
        assert_eq!(spoken(&effects), vec!["Music stopped"]);
    }

    #[test]
    fn test_supportive_messages_rotate() {
        let mut d = dispatcher();
        let mut heard = Vec::new();
        for _ in 0..messages::SUPPORTIVE_MESSAGES.len() + 1 {
            let effects = d.dispatch(Intent::EmotionalSupport);
            heard.push(spoken(&effects)[0].to_string());
        }

        assert_eq!(heard[0], messages::SUPPORTIVE_MESSAGES[0]);
        assert_eq!(heard[1], messages::SUPPORTIVE_MESSAGES[1]);
        assert_eq!(heard.last().unwrap(), messages::SUPPORTIVE_MESSAGES[0]);
        assert!(heard
            .iter()
            .all(|m| messages::SUPPORTIVE_MESSAGES.contains(&m.as_str())));
        assert!(Device::ALL.iter().all(|&dev| !d.devices().get_state(dev)));
    }

    #[test]
    fn test_help_and_unknown() {
        let mut d = dispatcher();
        assert_eq!(spoken(&d.dispatch(Intent::Help)), vec![messages::HELP]);
        assert_eq!(spoken(&d.dispatch(Intent::Unknown)), vec![messages::UNKNOWN]);
    }

    #[test]
    fn test_emergency_trigger_and_reentry() {
        let mut d = dispatcher();

        let effects = d.dispatch(Intent::Emergency);
        assert_eq!(
            effects,
            vec![
                Effect::EmergencyChanged(EmergencyState::CountingDown(5)),
                Effect::Speak("Emergency! Calling for help in 5 seconds.".to_string()),
                Effect::Display("EMERGENCY: Calling in 5 seconds...".to_string()),
                Effect::StartCountdown,
            ]
        );

        // Second trigger: no new sequence, no second warning
        assert!(d.dispatch(Intent::Emergency).is_empty());
        assert_eq!(d.emergency_state(), EmergencyState::CountingDown(5));
    }

    #[test]
    fn test_other_intents_during_countdown() {
        let mut d = dispatcher();
        d.dispatch(Intent::Emergency);
        d.emergency_tick();

        let effects = d.dispatch(Intent::DeviceOn(Device::Light));
        assert_eq!(spoken(&effects), vec!["Light turned on"]);
        assert_eq!(d.emergency_state(), EmergencyState::CountingDown(4));
    }

    #[test]
    fn test_emergency_full_cycle() {
        let mut d = dispatcher();
        d.dispatch(Intent::Emergency);

        for remaining in (1..5).rev() {
            let effects = d.emergency_tick();
            assert!(effects.contains(&Effect::Display(messages::emergency_countdown(remaining))));
        }

        let effects = d.emergency_tick();
        assert!(effects.contains(&Effect::ContactEmergency("tel:112".to_string())));

        let effects = d.emergency_contact_finished(true);
        assert_eq!(
            effects,
            vec![
                Effect::EmergencyChanged(EmergencyState::Completed),
                Effect::Display(messages::HELP_ON_THE_WAY.to_string()),
                Effect::EmergencyChanged(EmergencyState::Idle),
                Effect::Display(messages::EMERGENCY_DONE.to_string()),
            ]
        );
        assert_eq!(d.emergency_state(), EmergencyState::Idle);

        // Can be armed again
        assert!(!d.dispatch(Intent::Emergency).is_empty());
    }

    #[test]
    fn test_emergency_contact_failure_speaks_fallback() {
        let mut d = dispatcher();
        d.dispatch(Intent::Emergency);
        while !d.emergency_tick().is_empty() {}

        let effects = d.emergency_contact_finished(false);
        assert_eq!(spoken(&effects), vec![messages::CALL_MANUALLY]);
        assert_eq!(d.emergency_state(), EmergencyState::Idle);
    }

    #[test]
    fn test_zero_second_countdown_contacts_immediately() {
        let playlist = Playlist::new(Vec::new());
        let mut d = Dispatcher::new(
            playlist,
            Box::new(FakeAudio::default()),
            EmergencySequencer::new(0, "tel:112"),
        );

        let effects = d.dispatch(Intent::Emergency);
        assert!(effects.contains(&Effect::ContactEmergency("tel:112".to_string())));
        assert!(!effects.contains(&Effect::StartCountdown));
    }
}
