use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::EngineError;

use super::types::{EngineEvent, EngineMeta, EventSink, MediaId};

/// Requests served by the output thread, which owns the `OutputStream`.
pub(super) enum OutputCmd {
    /// Create a sink connected to the stream's mixer.
    NewSink(Sender<Sink>),
    Quit,
}

/// Open the default output device on a dedicated thread.
///
/// The stream is not `Send` on every platform, so it never leaves this thread;
/// other threads ask it for sinks instead.
pub(super) fn spawn_output_thread() -> Result<(Sender<OutputCmd>, JoinHandle<()>), EngineError> {
    let (tx, rx) = mpsc::channel::<OutputCmd>();
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), EngineError>>();

    let handle = thread::Builder::new()
        .name("tonearm-output".into())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(EngineError::NoOutputDevice(e.to_string())));
                    return;
                }
            };
            // rodio logs to stderr when the stream is dropped; stderr belongs to the TUI.
            stream.log_on_drop(false);
            let _ = ready_tx.send(Ok(()));

            while let Ok(cmd) = rx.recv() {
                match cmd {
                    OutputCmd::NewSink(reply) => {
                        let _ = reply.send(Sink::connect_new(stream.mixer()));
                    }
                    OutputCmd::Quit => break,
                }
            }
            debug!("output thread exiting");
        })
        .map_err(|e| EngineError::NoOutputDevice(e.to_string()))?;

    ready_rx.recv().map_err(|_| EngineError::Disconnected)??;
    Ok((tx, handle))
}

/// What the ticker last reported for the loaded resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) enum Phase {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Default)]
pub(super) struct Reported {
    pub phase: Phase,
    pub pos_ms: Option<u64>,
}

/// One observation of the sink.
#[derive(Debug, Clone, Copy)]
pub(super) struct Sample {
    pub loaded: bool,
    pub paused: bool,
    pub drained: bool,
    pub pos_ms: u64,
}

/// Compare a fresh sample against what was last reported and return the
/// events describing the difference, updating `reported` in place.
pub(super) fn diff(reported: &mut Reported, sample: Sample) -> Vec<EngineEvent> {
    let phase = if !sample.loaded {
        Phase::Idle
    } else if sample.drained {
        match reported.phase {
            Phase::Playing | Phase::Ended => Phase::Ended,
            _ => Phase::Idle,
        }
    } else if sample.paused {
        Phase::Paused
    } else {
        Phase::Playing
    };

    let mut events = Vec::new();
    if phase != reported.phase {
        match (reported.phase, phase) {
            (_, Phase::Playing) => events.push(EngineEvent::Playing),
            // A freshly loaded resource sits paused; that is not a transition.
            (Phase::Idle, Phase::Paused) => {}
            (_, Phase::Paused) => events.push(EngineEvent::Paused),
            (_, Phase::Ended) => {
                events.push(EngineEvent::EndReached);
                events.push(EngineEvent::Stopped);
            }
            (Phase::Playing | Phase::Paused, Phase::Idle) => events.push(EngineEvent::Stopped),
            (_, Phase::Idle) => {}
        }
        reported.phase = phase;
    }

    if matches!(phase, Phase::Playing | Phase::Paused) && reported.pos_ms != Some(sample.pos_ms) {
        reported.pos_ms = Some(sample.pos_ms);
        events.push(EngineEvent::TimeChanged);
    }

    events
}

/// Mutable engine state shared between the transport methods and the ticker.
#[derive(Default)]
pub(super) struct EngineState {
    pub media: Option<MediaId>,
    pub path: Option<PathBuf>,
    pub sink: Option<Sink>,
    pub length: Option<Duration>,
    pub volume: u8,
    pub muted: bool,
    pub meta: EngineMeta,
    pub reported: Reported,
}

impl EngineState {
    /// Resource `play` has to reopen: something is loaded but its sink is
    /// gone or has drained. `None` while a live sink exists or nothing is loaded.
    pub fn restart_target(&self) -> Option<(MediaId, PathBuf)> {
        if self.sink.as_ref().is_some_and(|s| !s.empty()) {
            return None;
        }
        self.media.zip(self.path.clone())
    }

    /// Make `sink` the live sink for `media`. A sink opened for a resource
    /// that has been replaced in the meantime is stopped instead.
    pub fn install_sink(&mut self, media: MediaId, sink: Sink, length: Option<Duration>) -> bool {
        if self.media != Some(media) {
            sink.stop();
            return false;
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.length = self.length.or(length);
        true
    }

    pub fn sample(&self) -> Sample {
        match &self.sink {
            Some(sink) => Sample {
                loaded: true,
                paused: sink.is_paused(),
                drained: sink.empty(),
                pos_ms: sink.get_pos().as_millis() as u64,
            },
            None => Sample {
                loaded: false,
                paused: true,
                drained: true,
                pos_ms: 0,
            },
        }
    }
}

pub(super) type SharedState = Arc<Mutex<EngineState>>;
pub(super) type Subscriber = Arc<Mutex<Option<EventSink>>>;

pub(super) fn emit(subscriber: &Subscriber, media: MediaId, events: &[EngineEvent]) {
    let sink = subscriber
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match sink {
        Some(sink) => events.iter().for_each(|&e| sink.emit(media, e)),
        None => debug!(%media, ?events, "no subscriber for engine events"),
    }
}

/// Periodically sample the sink and raise state/time/end events.
pub(super) fn spawn_ticker(
    state: SharedState,
    subscriber: Subscriber,
    shutdown: Arc<AtomicBool>,
    tick: Duration,
) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("tonearm-ticker".into())
        .spawn(move || {
            while !shutdown.load(Ordering::Acquire) {
                thread::sleep(tick);

                let (media, events) = {
                    let mut st = state.lock().unwrap_or_else(PoisonError::into_inner);
                    let Some(media) = st.media else {
                        continue;
                    };
                    let sample = st.sample();
                    (media, diff(&mut st.reported, sample))
                };

                if !events.is_empty() {
                    emit(&subscriber, media, &events);
                }
            }
        });

    match spawned {
        Ok(h) => Some(h),
        Err(e) => {
            warn!(error = %e, "failed to spawn engine ticker; no position updates");
            None
        }
    }
}
