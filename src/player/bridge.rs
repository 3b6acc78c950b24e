//! Marshals engine events onto one dispatcher thread.
//!
//! Engine threads, metadata workers and the controller itself all post into a
//! single inbox. The dispatcher drains it in arrival order, drops anything that
//! refers to a resource which is no longer loaded, and turns the rest into
//! [`Notification`]s for the consumer.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::engine::{EngineEvent, EngineMeta, EventSink, MediaId, NativeEngine};
use crate::library::Track;
use crate::metadata::{MetadataProvider, TrackMetadata};

use super::cursor::PlaylistCursor;
use super::notify::{ArtworkRef, Notification, Notifications, Tagged, TrackInfo};

/// Controller state the dispatcher needs to read.
#[derive(Debug)]
pub(super) struct Shared {
    pub cursor: PlaylistCursor,
    /// Resource currently loaded in the engine, if any.
    pub current: Option<MediaId>,
    /// Last id handed out; ids are never reused.
    pub last_media: MediaId,
    pub muted: bool,
    pub volume: u8,
}

impl Shared {
    pub fn new(cursor: PlaylistCursor) -> Self {
        Self {
            cursor,
            current: None,
            last_media: MediaId::new(0),
            muted: false,
            volume: 0,
        }
    }

    /// Claim a fresh id for the resource about to be loaded.
    pub fn claim_media(&mut self) -> MediaId {
        self.last_media = self.last_media.next();
        self.current = Some(self.last_media);
        self.last_media
    }
}

pub(super) type SharedHandle = Arc<Mutex<Shared>>;

pub(super) fn lock(shared: &SharedHandle) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(super) enum BridgeMsg {
    Engine { media: MediaId, event: EngineEvent },
    Metadata { media: MediaId, info: TrackInfo },
    Mute(bool),
    Shutdown,
}

pub(super) struct EventBridge {
    inbox: Sender<BridgeMsg>,
    handle: Option<JoinHandle<()>>,
}

impl EventBridge {
    pub fn spawn<E: NativeEngine>(
        engine: Arc<E>,
        provider: Arc<dyn MetadataProvider>,
        shared: SharedHandle,
    ) -> io::Result<(Self, Notifications)> {
        let (inbox, rx) = mpsc::channel::<BridgeMsg>();
        let (out, notifications) = mpsc::channel::<Tagged>();

        let dispatcher = Dispatcher {
            engine,
            provider,
            shared: shared.clone(),
            inbox: inbox.clone(),
            out,
            consumer_gone: false,
        };
        let handle = thread::Builder::new()
            .name("tonearm-bridge".into())
            .spawn(move || dispatcher.run(rx))?;

        Ok((
            Self {
                inbox,
                handle: Some(handle),
            },
            Notifications::new(notifications, shared),
        ))
    }

    /// Sink to subscribe the engine with.
    pub fn event_sink(&self) -> EventSink {
        let inbox = self.inbox.clone();
        EventSink::new(move |media, event| {
            let _ = inbox.send(BridgeMsg::Engine { media, event });
        })
    }

    pub fn post(&self, msg: BridgeMsg) {
        if self.inbox.send(msg).is_err() {
            warn!("event bridge is gone; message dropped");
        }
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        let _ = self.inbox.send(BridgeMsg::Shutdown);
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                warn!("event bridge thread panicked");
            }
        }
    }
}

struct Dispatcher<E> {
    engine: Arc<E>,
    provider: Arc<dyn MetadataProvider>,
    shared: SharedHandle,
    inbox: Sender<BridgeMsg>,
    out: Sender<Tagged>,
    consumer_gone: bool,
}

impl<E: NativeEngine> Dispatcher<E> {
    fn run(mut self, rx: Receiver<BridgeMsg>) {
        while let Ok(msg) = rx.recv() {
            match msg {
                BridgeMsg::Shutdown => break,
                BridgeMsg::Mute(muted) => self.notify(None, Notification::MuteChanged(muted)),
                BridgeMsg::Engine { media, event } => {
                    if !self.is_current(media) {
                        trace!(%media, ?event, "dropping event for replaced media");
                        continue;
                    }
                    self.on_engine_event(media, event);
                }
                BridgeMsg::Metadata { media, info } => {
                    // Checked at delivery time: the fetch may have outlived its track.
                    if !self.is_current(media) {
                        debug!(%media, title = %info.title, "discarding stale metadata");
                        continue;
                    }
                    self.deliver_info(media, info);
                }
            }
        }
        debug!("event bridge exiting");
    }

    fn is_current(&self, media: MediaId) -> bool {
        lock(&self.shared).current == Some(media)
    }

    fn notify(&mut self, media: Option<MediaId>, notification: Notification) {
        let tagged = Tagged {
            media,
            notification,
        };
        if self.out.send(tagged).is_err() && !self.consumer_gone {
            self.consumer_gone = true;
            debug!("notification receiver dropped; further notifications discarded");
        }
    }

    /// Art first, then title and artist.
    fn deliver_info(&mut self, media: MediaId, info: TrackInfo) {
        self.notify(Some(media), Notification::AlbumArtChanged(info.artwork));
        self.notify(
            Some(media),
            Notification::TrackInfoChanged {
                title: info.title,
                artist: info.artist,
            },
        );
    }

    fn on_engine_event(&mut self, media: MediaId, event: EngineEvent) {
        let tag = Some(media);
        match event {
            EngineEvent::Playing => self.notify(tag, Notification::StateChanged(true)),
            EngineEvent::Paused | EngineEvent::Stopped => {
                self.notify(tag, Notification::StateChanged(false))
            }
            EngineEvent::TimeChanged | EngineEvent::LengthChanged => {
                let duration_ms = self.engine.length_ms();
                if duration_ms > 0 {
                    let current_ms = self.engine.time_ms();
                    self.notify(
                        tag,
                        Notification::PositionChanged {
                            current_ms,
                            duration_ms,
                        },
                    );
                }
            }
            EngineEvent::EndReached => self.notify(tag, Notification::EndReached),
            EngineEvent::MediaParsed => self.fetch_metadata(media),
        }
    }

    /// Resolve track info on a worker; the result re-enters the inbox.
    fn fetch_metadata(&mut self, media: MediaId) {
        let Some(track) = lock(&self.shared).cursor.current().cloned() else {
            return;
        };
        let engine_meta = self.engine.media_meta();
        let provider = self.provider.clone();
        let inbox = self.inbox.clone();

        let worker = {
            let track = track.clone();
            let engine_meta = engine_meta.clone();
            thread::Builder::new()
                .name("tonearm-metadata".into())
                .spawn(move || {
                    let info = resolve_track_info(provider.as_ref(), &engine_meta, &track);
                    let _ = inbox.send(BridgeMsg::Metadata { media, info });
                })
        };

        if let Err(e) = worker {
            warn!(error = %e, "metadata worker unavailable; resolving inline");
            let info = resolve_track_info(self.provider.as_ref(), &engine_meta, &track);
            self.deliver_info(media, info);
        }
    }
}

/// Combine provider metadata with engine-reported metadata and the file name.
///
/// Provider failures (including panics inside tag parsers) count as "nothing found".
pub(super) fn resolve_track_info(
    provider: &dyn MetadataProvider,
    engine_meta: &EngineMeta,
    track: &Track,
) -> TrackInfo {
    let fetched = match panic::catch_unwind(AssertUnwindSafe(|| provider.extract(track.path()))) {
        Ok(Ok(meta)) => meta,
        Ok(Err(e)) => {
            debug!(path = %track.path().display(), error = %e, "no embedded metadata");
            TrackMetadata::default()
        }
        Err(_) => {
            warn!(path = %track.path().display(), "metadata provider panicked");
            TrackMetadata::default()
        }
    };

    let artwork = fetched
        .artwork
        .map(|a| ArtworkRef::Embedded(Arc::new(a)))
        .or_else(|| engine_meta.artwork_url.clone().map(ArtworkRef::Remote));

    TrackInfo {
        title: fetched
            .title
            .or_else(|| engine_meta.title.clone())
            .unwrap_or_else(|| track.file_name()),
        artist: fetched.artist.or_else(|| engine_meta.artist.clone()),
        artwork,
    }
}
