//! Backend adapters and the selector, without the controller.

mod support;

use bridge_traits::media::{MediaSignal, WaveformStyle};
use core_playback::backend::{BackendSelector, PlainBackend, WaveformSettings};
use core_playback::{BackendKind, LoadRequest, LoadTicket, PlaybackBackend};
use futures::channel::mpsc;
use std::sync::Arc;
use support::*;

fn settings() -> WaveformSettings {
    WaveformSettings {
        sources: vec![PRIMARY_SOURCE.to_string()],
        container: "#waveform".to_string(),
        style: WaveformStyle::default(),
    }
}

fn request(ticket: u64, compact: bool) -> LoadRequest {
    LoadRequest {
        url: "https://cdn.test/a1.mp3".to_string(),
        ticket: LoadTicket(ticket),
        compact,
    }
}

#[tokio::test]
async fn signals_are_tagged_with_their_ticket() {
    let controls = Arc::new(Controls::default());
    let library = Arc::new(FakeLibrary::new(controls.clone(), &[PRIMARY_SOURCE]));
    let factory = Arc::new(FakeFactory::new(controls));
    let (tx, mut rx) = mpsc::unbounded();
    let selector = BackendSelector::new(Some(library.clone()), factory.clone(), settings(), tx);

    let acquired = selector.acquire().await.unwrap();
    assert!(acquired.switched.is_none());
    acquired.backend.load(&request(7, true)).unwrap();

    let engine = library.engines.lock().last().cloned().unwrap();
    assert_eq!(engine.options.as_ref().map(|o| o.height), Some(42));
    engine.emit(MediaSignal::Finished);

    let event = rx.try_next().unwrap().unwrap();
    assert_eq!(event.ticket, LoadTicket(7));
    assert_eq!(event.backend, BackendKind::Waveform);
    assert_eq!(event.signal, MediaSignal::Finished);
}

#[tokio::test]
async fn downgrade_is_one_way() {
    let controls = Arc::new(Controls::default());
    let library = Arc::new(FakeLibrary::new(controls.clone(), &[PRIMARY_SOURCE]));
    let factory = Arc::new(FakeFactory::new(controls));
    let (tx, _rx) = mpsc::unbounded();
    let selector = BackendSelector::new(Some(library.clone()), factory.clone(), settings(), tx);

    selector.acquire().await.unwrap();
    assert_eq!(selector.current_kind(), Some(BackendKind::Waveform));

    let plain = selector.downgrade("decode failed").unwrap();
    assert_eq!(plain.kind(), BackendKind::Plain);
    assert!(selector.is_downgraded());
    assert!(selector.downgrade("again").is_none());

    let acquired = selector.acquire().await.unwrap();
    assert_eq!(acquired.backend.kind(), BackendKind::Plain);
    assert_eq!(library.attempts.lock().len(), 1);
}

#[tokio::test]
async fn plain_seek_scales_by_duration() {
    let controls = Arc::new(Controls::default());
    let factory = Arc::new(FakeFactory::new(controls));
    let (tx, _rx) = mpsc::unbounded();
    let backend = PlainBackend::new(factory.clone(), tx);

    backend.load(&request(1, false)).unwrap();
    let element = factory.last();

    backend.seek(0.5);
    assert!(element.positions.lock().is_empty());

    element.ready(200.0);
    backend.seek(0.25);
    backend.seek(-3.0);
    assert_eq!(*element.positions.lock(), vec![50.0, 0.0]);

    backend.load(&request(2, false)).unwrap();
    assert!(element.destroyed.load(std::sync::atomic::Ordering::SeqCst));
}
