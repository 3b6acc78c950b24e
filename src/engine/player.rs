use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lofty::prelude::*;
use rodio::Sink;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::metadata::non_blank;

use super::NativeEngine;
use super::sink::{effective_volume, open_source, prime_sink};
use super::thread::{
    EngineState, OutputCmd, Reported, SharedState, Subscriber, emit, spawn_output_thread,
    spawn_ticker,
};
use super::types::{EngineEvent, EngineMeta, EventSink, MediaId};

/// [`NativeEngine`] backed by `rodio`.
///
/// Threads:
/// - output thread: owns the output stream and hands out sinks;
/// - ticker: samples the current sink and raises state/time/end events;
/// - one short-lived parse thread per load, raising length/parsed events.
pub struct RodioEngine {
    output: Sender<OutputCmd>,
    state: SharedState,
    subscriber: Subscriber,
    shutdown: Arc<AtomicBool>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl RodioEngine {
    /// Open the default output device and start the engine threads.
    pub fn new(tick: Duration) -> Result<Self, EngineError> {
        let (output, output_handle) = spawn_output_thread()?;
        let state: SharedState = Arc::new(Mutex::new(EngineState {
            volume: 100,
            ..EngineState::default()
        }));
        let subscriber: Subscriber = Arc::new(Mutex::new(None));
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut threads = vec![output_handle];
        threads.extend(spawn_ticker(
            state.clone(),
            subscriber.clone(),
            shutdown.clone(),
            tick,
        ));

        Ok(Self {
            output,
            state,
            subscriber,
            shutdown,
            threads: Mutex::new(threads),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn new_sink(&self) -> Result<Sink, EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.output
            .send(OutputCmd::NewSink(reply_tx))
            .map_err(|_| EngineError::Disconnected)?;
        reply_rx.recv().map_err(|_| EngineError::Disconnected)
    }

    /// Build a paused sink for `path` at the current volume.
    fn open_sink(&self, path: &Path, volume: f32) -> Result<(Sink, Option<Duration>), EngineError> {
        let (source, length) = open_source(path)?;
        let sink = self.new_sink()?;
        prime_sink(&sink, source, volume);
        Ok((sink, length))
    }

    /// Read length and tags off the caller's thread, then announce the resource as parsed.
    fn spawn_parse(&self, media: MediaId, path: &Path) {
        let state = self.state.clone();
        let subscriber = self.subscriber.clone();
        let path = path.to_path_buf();

        let spawned = thread::Builder::new()
            .name("tonearm-parse".into())
            .spawn(move || {
                let (length, meta) = match lofty::read_from_path(&path) {
                    Ok(tagged) => {
                        let length = Some(tagged.properties().duration()).filter(|d| !d.is_zero());
                        let meta = tagged
                            .primary_tag()
                            .or_else(|| tagged.first_tag())
                            .map(|tag| EngineMeta {
                                title: non_blank(tag.title()),
                                artist: non_blank(tag.artist()),
                                artwork_url: None,
                            })
                            .unwrap_or_default();
                        (length, meta)
                    }
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "engine could not read tags");
                        (None, EngineMeta::default())
                    }
                };

                {
                    let mut st = state.lock().unwrap_or_else(PoisonError::into_inner);
                    if st.media != Some(media) {
                        return;
                    }
                    if st.length.is_none() {
                        st.length = length;
                    }
                    st.meta = meta;
                }

                emit(
                    &subscriber,
                    media,
                    &[EngineEvent::LengthChanged, EngineEvent::MediaParsed],
                );
            });

        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn parse thread");
        }
    }
}

impl NativeEngine for RodioEngine {
    fn subscribe(&self, sink: EventSink) {
        *self.subscriber.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    fn load_media(&self, media: MediaId, path: &Path) -> Result<(), EngineError> {
        let volume = {
            let mut st = self.lock();
            if let Some(old) = st.sink.take() {
                old.stop();
            }
            // Claim the id first so late events for the old resource stop here.
            st.media = Some(media);
            st.path = Some(path.to_path_buf());
            st.length = None;
            st.meta = EngineMeta::default();
            st.reported = Reported::default();
            effective_volume(st.volume, st.muted)
        };

        let (sink, length) = self.open_sink(path, volume)?;

        if !self.lock().install_sink(media, sink, length) {
            // Superseded while decoding.
            return Ok(());
        }

        debug!(%media, path = %path.display(), "media loaded");
        self.spawn_parse(media, path);
        Ok(())
    }

    fn play(&self) {
        let restart = {
            let st = self.lock();
            match st.restart_target() {
                Some(target) => target,
                None => {
                    if let Some(sink) = &st.sink {
                        sink.play();
                    }
                    return;
                }
            }
        };

        // Stopped or finished: start the same resource over, decoding outside the lock.
        let (media, path) = restart;
        let (sink, length) = match self.open_sink(&path, 0.0) {
            Ok(opened) => opened,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not restart media");
                return;
            }
        };

        let mut st = self.lock();
        sink.set_volume(effective_volume(st.volume, st.muted));
        if st.install_sink(media, sink, length) {
            if let Some(sink) = &st.sink {
                sink.play();
            }
        }
    }

    fn pause(&self) {
        if let Some(sink) = &self.lock().sink {
            sink.pause();
        }
    }

    fn stop(&self) {
        if let Some(sink) = self.lock().sink.take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.lock()
            .sink
            .as_ref()
            .is_some_and(|s| !s.is_paused() && !s.empty())
    }

    fn is_seekable(&self) -> bool {
        let st = self.lock();
        st.sink.is_some() && st.length.is_some()
    }

    fn set_position(&self, fraction: f32) {
        let st = self.lock();
        let (Some(sink), Some(length)) = (&st.sink, st.length) else {
            return;
        };
        let target = length.mul_f32(fraction.clamp(0.0, 1.0));
        if let Err(e) = sink.try_seek(target) {
            warn!(?target, error = %e, "seek failed");
        }
    }

    fn time_ms(&self) -> u64 {
        self.lock()
            .sink
            .as_ref()
            .map(|s| s.get_pos().as_millis() as u64)
            .unwrap_or(0)
    }

    fn length_ms(&self) -> u64 {
        self.lock()
            .length
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn set_volume(&self, level: u8) {
        let mut st = self.lock();
        st.volume = level.min(100);
        let gain = effective_volume(st.volume, st.muted);
        if let Some(sink) = &st.sink {
            sink.set_volume(gain);
        }
    }

    fn set_mute(&self, muted: bool) {
        let mut st = self.lock();
        st.muted = muted;
        let gain = effective_volume(st.volume, st.muted);
        if let Some(sink) = &st.sink {
            sink.set_volume(gain);
        }
    }

    fn media_meta(&self) -> EngineMeta {
        self.lock().meta.clone()
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(sink) = self.lock().sink.take() {
            sink.stop();
        }
        let _ = self.output.send(OutputCmd::Quit);

        let handles = std::mem::take(
            &mut *self.threads.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for h in handles {
            let _ = h.join();
        }
    }
}
