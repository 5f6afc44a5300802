use super::*;
use crate::animation::clock::FrameClock;

fn timeline(duration_secs: f64, hold_ms: u64) -> Timeline {
    Timeline {
        fps: Fps::CAPTURE,
        duration_secs,
        trailing_delay: Duration::from_millis(hold_ms),
        instant: false,
    }
}

fn drain(d: &mut AnimationDriver<FrameClock>) -> Vec<Tick> {
    let mut out = Vec::new();
    loop {
        match d.tick() {
            Tick::Stopped => return out,
            t => out.push(t),
        }
        assert!(out.len() < 100_000, "driver never stopped");
    }
}

fn progresses(ticks: &[Tick]) -> Vec<f64> {
    ticks
        .iter()
        .filter_map(|t| match t {
            Tick::Frame { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect()
}

#[test]
fn three_second_run_emits_one_frame_per_interval_and_ends_at_one() {
    let tl = timeline(3.0, 0);
    let mut d = AnimationDriver::new(FrameClock::new(), tl).unwrap();
    let ticks = drain(&mut d);

    assert_eq!(ticks.len() as u64, tl.offline_frame_count());
    assert_eq!(ticks.len(), 181);
    let p = progresses(&ticks);
    assert_eq!(p[0], 0.0);
    assert_eq!(*p.last().unwrap(), 1.0);
    assert!(p.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(d.state(), DriverState::Stopped);
}

#[test]
fn frame_indices_are_contiguous_across_hold() {
    let tl = timeline(0.5, 250);
    let mut d = AnimationDriver::new(FrameClock::new(), tl).unwrap();
    let ticks = drain(&mut d);

    let holds = ticks
        .iter()
        .filter(|t| matches!(t, Tick::Hold { .. }))
        .count();
    assert_eq!(holds, 15);
    assert_eq!(ticks.len() as u64, tl.offline_frame_count());
    for (i, t) in ticks.iter().enumerate() {
        let idx = match t {
            Tick::Frame { index, .. } | Tick::Hold { index } => index.0,
            Tick::Stopped => unreachable!(),
        };
        assert_eq!(idx, i as u64);
    }
    assert!(matches!(ticks.last(), Some(Tick::Hold { .. })));
}

#[test]
fn instant_timeline_emits_single_final_frame() {
    let tl = Timeline {
        instant: true,
        ..timeline(3.0, 0)
    };
    let mut d = AnimationDriver::new(FrameClock::new(), tl).unwrap();
    let ticks = drain(&mut d);
    assert_eq!(
        ticks,
        vec![Tick::Frame {
            index: FrameIndex(0),
            progress: 1.0
        }]
    );
}

#[test]
fn stop_is_terminal() {
    let mut d = AnimationDriver::new(FrameClock::new(), timeline(1.0, 0)).unwrap();
    assert!(matches!(d.tick(), Tick::Frame { .. }));
    d.stop();
    assert_eq!(d.tick(), Tick::Stopped);
    assert_eq!(d.tick(), Tick::Stopped);
    assert_eq!(d.frames_emitted(), 1);
}

#[test]
fn non_multiple_duration_still_reaches_one() {
    let tl = timeline(1.234, 0);
    let mut d = AnimationDriver::new(FrameClock::new(), tl).unwrap();
    let ticks = drain(&mut d);
    assert_eq!(ticks.len(), 76);
    assert_eq!(*progresses(&ticks).last().unwrap(), 1.0);
}

#[test]
fn invalid_duration_is_rejected() {
    assert!(AnimationDriver::new(FrameClock::new(), timeline(0.0, 0)).is_err());
    assert!(AnimationDriver::new(FrameClock::new(), timeline(f64::NAN, 0)).is_err());
}
