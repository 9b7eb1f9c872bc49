use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("no voice recognizer configured")]
    NotConfigured,
    #[error("failed to start voice recognizer: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("voice recognizer has no stdout")]
    NoStdout,
}

/// A live listening session. The recognizer writes one transcript-so-far
/// snapshot per stdout line; snapshots are forwarded over a channel.
pub struct VoiceSession {
    rx: mpsc::Receiver<String>,
    child: Option<Child>,
    ended: bool,
}

impl VoiceSession {
    pub fn is_supported(config: &Config) -> bool {
        config
            .voice_command
            .first()
            .is_some_and(|program| !program.trim().is_empty())
    }

    /// Start listening. Any failure means voice is unavailable; it is
    /// logged and otherwise ignored.
    pub fn start(config: &Config) -> Option<Self> {
        match Self::spawn(config) {
            Ok(session) => {
                info!(locale = %config.voice_locale, "voice session started");
                Some(session)
            }
            Err(e) => {
                debug!("voice unavailable: {e}");
                None
            }
        }
    }

    fn spawn(config: &Config) -> Result<Self, VoiceError> {
        let (program, args) = config
            .voice_command
            .split_first()
            .filter(|(program, _)| !program.trim().is_empty())
            .ok_or(VoiceError::NotConfigured)?;

        let mut child = Command::new(program)
            .args(args)
            .env("TABLAS_VOICE_LOCALE", &config.voice_locale)
            .env("TABLAS_VOICE_INTERIM", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(VoiceError::NoStdout);
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { return };
                if tx.send(line).is_err() {
                    return;
                }
            }
        });

        Ok(Self {
            rx,
            child: Some(child),
            ended: false,
        })
    }

    /// Session fed from an arbitrary transcript channel.
    pub fn from_receiver(rx: mpsc::Receiver<String>) -> Self {
        Self {
            rx,
            child: None,
            ended: false,
        }
    }

    /// Newest snapshot received since the last call, if any.
    pub fn latest(&mut self) -> Option<String> {
        let mut newest = None;
        loop {
            match self.rx.try_recv() {
                Ok(line) => newest = Some(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.ended = true;
                    break;
                }
            }
        }
        newest
    }

    /// True once the recognizer closed its output; no more snapshots will come.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Release the recognizer. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            info!("voice session stopped");
        }
    }
}

impl Drop for VoiceSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn config_with(command: &[&str]) -> Config {
        Config {
            voice_command: command.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_unconfigured_voice_is_unsupported() {
        let config = config_with(&[]);
        assert!(!VoiceSession::is_supported(&config));
        assert!(VoiceSession::start(&config).is_none());
        assert!(!VoiceSession::is_supported(&config_with(&["  "])));
    }

    #[test]
    fn test_missing_program_degrades_silently() {
        let config = config_with(&["tablas-no-such-recognizer-binary"]);
        assert!(VoiceSession::is_supported(&config));
        assert!(VoiceSession::start(&config).is_none());
    }

    #[test]
    fn test_latest_returns_newest_snapshot() {
        let (tx, rx) = mpsc::channel();
        let mut session = VoiceSession::from_receiver(rx);
        assert_eq!(session.latest(), None);
        tx.send("tengo".to_string()).unwrap();
        tx.send("tengo cinco".to_string()).unwrap();
        assert_eq!(session.latest(), Some("tengo cinco".to_string()));
        assert_eq!(session.latest(), None);
        assert!(!session.has_ended());
    }

    #[test]
    fn test_closed_stream_marks_session_ended() {
        let (tx, rx) = mpsc::channel();
        let mut session = VoiceSession::from_receiver(rx);
        tx.send("treinta".to_string()).unwrap();
        drop(tx);
        assert_eq!(session.latest(), Some("treinta".to_string()));
        assert!(session.has_ended());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (_tx, rx) = mpsc::channel();
        let mut session = VoiceSession::from_receiver(rx);
        session.stop();
        session.stop();
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_recognizer_streams_lines() {
        let config = config_with(&["echo", "veinte"]);
        let mut session = VoiceSession::start(&config).expect("echo should spawn");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut heard = None;
        while heard.is_none() && Instant::now() < deadline {
            heard = session.latest();
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(heard.as_deref(), Some("veinte"));

        session.stop();
        session.stop();
    }
}
