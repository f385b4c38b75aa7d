use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rect_dissect_core::config::DissectConfig;
use rect_dissect_core::controller::MaskController;
use rect_dissect_core::model::Rect;

fn page() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 600.0)
}

#[test]
fn inactive_controller_has_no_layout() {
    let mut c = MaskController::new();
    let id = c.register();
    c.notify(id, false, vec![Rect::new(0.0, 0.0, 10.0, 10.0)])
        .unwrap();
    assert!(!c.is_active());
    assert!(c.layout(page(), &DissectConfig::default()).unwrap().is_none());
}

#[test]
fn bounds_are_joined_in_registration_order() {
    let mut c = MaskController::new();
    let a = c.register();
    let b = c.register();
    c.notify(b, false, vec![Rect::new(200.0, 0.0, 10.0, 10.0)])
        .unwrap();
    c.notify(a, true, vec![Rect::new(0.0, 0.0, 10.0, 10.0)])
        .unwrap();

    assert!(c.is_active());
    assert_eq!(
        c.bounds(),
        vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(200.0, 0.0, 10.0, 10.0),
        ]
    );

    let layout = c.layout(page(), &DissectConfig::default()).unwrap().unwrap();
    assert_eq!(layout.masked_area(), page().area() - 200.0);
}

#[test]
fn unregister_drops_bounds() {
    let mut c = MaskController::new();
    let a = c.register();
    let b = c.register();
    c.notify(a, true, vec![Rect::new(0.0, 0.0, 10.0, 10.0)])
        .unwrap();
    c.notify(b, true, vec![Rect::new(20.0, 0.0, 10.0, 10.0)])
        .unwrap();
    c.unregister(a).unwrap();
    assert_eq!(c.bounds(), vec![Rect::new(20.0, 0.0, 10.0, 10.0)]);
    assert!(c.notify(a, true, vec![]).is_err());
}

#[test]
fn click_reaches_every_handler() {
    let mut c = MaskController::new();
    let a = c.register();
    let b = c.register();
    c.notify(a, true, vec![Rect::new(0.0, 0.0, 100.0, 100.0)])
        .unwrap();

    let masked_hits = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    for id in [a, b] {
        let masked_hits = masked_hits.clone();
        let calls = calls.clone();
        c.on_click(id, move |masked| {
            calls.fetch_add(1, Ordering::SeqCst);
            if masked {
                masked_hits.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap();
    }

    assert!(!c.click(50.0, 50.0));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(masked_hits.load(Ordering::SeqCst), 0);

    assert!(c.click(500.0, 500.0));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(masked_hits.load(Ordering::SeqCst), 2);
}
