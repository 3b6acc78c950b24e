use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Sink;
use rodio::source::SineWave;

use super::sink::effective_volume;
use super::thread::{EngineState, Phase, Reported, Sample, diff};
use super::{EngineEvent, EventSink, MediaId};

fn sample(paused: bool, drained: bool, pos_ms: u64) -> Sample {
    Sample {
        loaded: true,
        paused,
        drained,
        pos_ms,
    }
}

fn unloaded() -> Sample {
    Sample {
        loaded: false,
        paused: true,
        drained: true,
        pos_ms: 0,
    }
}

#[test]
fn fresh_paused_load_reports_time_but_no_state_change() {
    let mut r = Reported::default();
    assert_eq!(diff(&mut r, sample(true, false, 0)), vec![EngineEvent::TimeChanged]);
    assert_eq!(r.phase, Phase::Paused);

    // Nothing new to say.
    assert!(diff(&mut r, sample(true, false, 0)).is_empty());
}

#[test]
fn play_pause_transitions_raise_state_events() {
    let mut r = Reported::default();
    diff(&mut r, sample(true, false, 0));

    assert_eq!(
        diff(&mut r, sample(false, false, 250)),
        vec![EngineEvent::Playing, EngineEvent::TimeChanged]
    );
    assert_eq!(diff(&mut r, sample(false, false, 500)), vec![EngineEvent::TimeChanged]);
    assert_eq!(diff(&mut r, sample(true, false, 500)), vec![EngineEvent::Paused]);
}

#[test]
fn draining_while_playing_reports_end_then_stopped_once() {
    let mut r = Reported::default();
    diff(&mut r, sample(false, false, 100));

    assert_eq!(
        diff(&mut r, sample(false, true, 100)),
        vec![EngineEvent::EndReached, EngineEvent::Stopped]
    );
    assert_eq!(r.phase, Phase::Ended);
    assert!(diff(&mut r, sample(false, true, 100)).is_empty());
}

#[test]
fn dropping_the_sink_reports_stopped() {
    let mut r = Reported::default();
    diff(&mut r, sample(false, false, 100));
    assert_eq!(diff(&mut r, unloaded()), vec![EngineEvent::Stopped]);
    assert!(diff(&mut r, unloaded()).is_empty());
}

#[test]
fn unloaded_from_idle_is_silent() {
    let mut r = Reported::default();
    assert!(diff(&mut r, unloaded()).is_empty());
}

#[test]
fn seeking_while_paused_reports_time() {
    let mut r = Reported::default();
    diff(&mut r, sample(true, false, 0));
    assert_eq!(diff(&mut r, sample(true, false, 30_000)), vec![EngineEvent::TimeChanged]);
}

#[test]
fn effective_volume_scales_and_mutes() {
    assert_eq!(effective_volume(100, false), 1.0);
    assert_eq!(effective_volume(0, false), 0.0);
    assert!((effective_volume(70, false) - 0.7).abs() < 1e-6);
    assert_eq!(effective_volume(70, true), 0.0);
    assert_eq!(effective_volume(250, false), 1.0);
}

#[test]
fn media_ids_are_ordered_generations() {
    let a = MediaId::new(1);
    let b = a.next();
    assert!(b > a);
    assert_eq!(b.get(), 2);
    assert_eq!(b.to_string(), "#2");
}

#[test]
fn event_sink_forwards_from_any_thread() {
    let seen: Arc<Mutex<Vec<(MediaId, EngineEvent)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_by_sink = seen.clone();
    let sink = EventSink::new(move |m, e| seen_by_sink.lock().unwrap().push((m, e)));

    let remote = sink.clone();
    std::thread::spawn(move || remote.emit(MediaId::new(3), EngineEvent::Playing))
        .join()
        .unwrap();
    sink.emit(MediaId::new(3), EngineEvent::Paused);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (MediaId::new(3), EngineEvent::Playing),
            (MediaId::new(3), EngineEvent::Paused)
        ]
    );
}

fn loaded_state(media: MediaId) -> EngineState {
    EngineState {
        media: Some(media),
        path: Some(PathBuf::from("/music/a.flac")),
        ..EngineState::default()
    }
}

/// A sink fed by a detached queue, so no output device is needed.
fn detached_sink() -> Sink {
    Sink::new().0
}

#[test]
fn restart_target_only_when_the_sink_is_gone_or_drained() {
    let media = MediaId::new(3);
    assert_eq!(EngineState::default().restart_target(), None);

    let mut st = loaded_state(media);
    assert_eq!(
        st.restart_target(),
        Some((media, PathBuf::from("/music/a.flac")))
    );

    st.sink = Some(detached_sink());
    assert_eq!(st.restart_target().map(|(m, _)| m), Some(media));

    let live = detached_sink();
    live.append(SineWave::new(440.0));
    st.sink = Some(live);
    assert_eq!(st.restart_target(), None);
}

#[test]
fn install_sink_rejects_a_sink_for_replaced_media() {
    let old = MediaId::new(1);
    let mut st = loaded_state(old.next());

    assert!(!st.install_sink(old, detached_sink(), Some(Duration::from_secs(9))));
    assert!(st.sink.is_none());
    assert_eq!(st.length, None);

    assert!(st.install_sink(old.next(), detached_sink(), Some(Duration::from_secs(9))));
    assert!(st.sink.is_some());
    assert_eq!(st.length, Some(Duration::from_secs(9)));
}

#[test]
fn install_sink_keeps_a_length_already_known() {
    let media = MediaId::new(1);
    let mut st = loaded_state(media);
    st.length = Some(Duration::from_secs(200));

    assert!(st.install_sink(media, detached_sink(), Some(Duration::from_secs(1))));
    assert_eq!(st.length, Some(Duration::from_secs(200)));
}
