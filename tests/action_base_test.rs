//! Tests for the wait/done bookkeeping shared by all actions.

use rgraph_exec::{ActionBase, Event};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn ev(s: &str) -> Event {
    Event::string(s)
}

struct Case {
    name: &'static str,
    want: Vec<Event>,
    signals: Vec<Event>,
    want_signal_ret: Vec<bool>,
    want_pending: Vec<Event>,
    want_done: Vec<Event>,
    want_can_run: bool,
}

#[test]
fn signal_table() {
    let cases = vec![
        Case {
            name: "signal one event",
            want: vec![ev("a")],
            signals: vec![ev("a")],
            want_signal_ret: vec![true],
            want_pending: vec![],
            want_done: vec![ev("a")],
            want_can_run: true,
        },
        Case {
            name: "signal one event ignored",
            want: vec![ev("a")],
            signals: vec![ev("b")],
            want_signal_ret: vec![false],
            want_pending: vec![ev("a")],
            want_done: vec![],
            want_can_run: false,
        },
        Case {
            name: "multiple events out of order",
            want: vec![ev("a"), ev("b")],
            signals: vec![ev("b"), ev("a")],
            want_signal_ret: vec![true, true],
            want_pending: vec![],
            want_done: vec![ev("a"), ev("b")],
            want_can_run: true,
        },
        Case {
            name: "multiple events pending",
            want: vec![ev("a"), ev("b")],
            signals: vec![ev("b"), ev("c")],
            want_signal_ret: vec![true, false],
            want_pending: vec![ev("a")],
            want_done: vec![ev("b")],
            want_can_run: false,
        },
    ];

    for case in cases {
        let base = ActionBase::new(case.want);
        let got: Vec<bool> = case.signals.iter().map(|e| base.signal(e)).collect();

        assert_eq!(got, case.want_signal_ret, "{}: signal results", case.name);
        assert_eq!(base.pending_events(), case.want_pending, "{}: pending", case.name);
        assert_eq!(base.done(), case.want_done, "{}: done", case.name);
        assert_eq!(base.can_run(), case.want_can_run, "{}: can_run", case.name);
    }
}

#[test]
fn empty_want_is_runnable() {
    let base = ActionBase::default();
    assert!(base.can_run());
    assert!(base.pending_events().is_empty());
    assert!(!base.signal(&ev("anything")));
    assert!(base.done().is_empty());
}

#[test]
fn repeated_signal_is_ignored() {
    let base = ActionBase::new(vec![ev("a"), ev("b")]);
    assert!(base.signal(&ev("a")));
    assert!(!base.signal(&ev("a")));
    assert_eq!(base.done(), vec![ev("a")]);
    assert_eq!(base.pending_events(), vec![ev("b")]);
}

#[test]
fn duplicate_wants_need_one_signal() {
    let base = ActionBase::new(vec![ev("a"), ev("b"), ev("a")]);
    assert_eq!(base.pending_events(), vec![ev("a"), ev("b")]);

    assert!(base.signal(&ev("a")));
    assert!(!base.signal(&ev("a")));
    assert_eq!(base.pending_events(), vec![ev("b")]);
    assert!(!base.can_run());

    assert!(base.signal(&ev("b")));
    assert!(base.can_run());
    assert_eq!(base.done(), vec![ev("a"), ev("b")]);
}

#[test]
fn want_keeps_declaration() {
    let want = vec![ev("x"), ev("y"), ev("x")];
    let base = ActionBase::new(want.clone());
    base.signal(&ev("y"));
    assert_eq!(base.want(), want);
}

#[test]
fn runnable_is_permanent() {
    let base = ActionBase::new(vec![ev("a")]);
    base.signal(&ev("a"));
    assert!(base.can_run());
    for other in ["a", "b", "c"] {
        base.signal(&ev(other));
        assert!(base.can_run());
    }
}

#[test]
fn concurrent_signals_consume_each_event_once() {
    let want: Vec<Event> = (0..64).map(|i| ev(&format!("e{i}"))).collect();
    let base = Arc::new(ActionBase::new(want.clone()));
    let consumed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let base = Arc::clone(&base);
            let consumed = Arc::clone(&consumed);
            let mut order = want.clone();
            order.rotate_left(t * 8);
            if t % 2 == 1 {
                order.reverse();
            }
            std::thread::spawn(move || {
                for event in &order {
                    if base.signal(event) {
                        consumed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("signal thread panicked");
    }

    assert_eq!(consumed.load(Ordering::SeqCst), want.len());
    assert!(base.can_run());
    assert_eq!(base.done(), want);
    assert!(base.pending_events().is_empty());
}
