use std::collections::BTreeSet;

use afterglow_core::{
    DecayField, ItemFrame, LifecycleEvent, NoJitter, PointerEvent, TrailConfig, TrailEngine,
    TrailMode,
};
use afterglow_platform::{Result, Scheduler, TaskHandle, TrailMount, TrailPresenter};

#[derive(Default)]
struct FakeScheduler {
    next: u64,
    running: BTreeSet<u64>,
    intervals: Vec<u64>,
    fail_interval: bool,
    fail_cancel: bool,
}

impl Scheduler for FakeScheduler {
    fn start_frame_loop(&mut self) -> Result<TaskHandle> {
        self.next += 1;
        self.running.insert(self.next);
        Ok(TaskHandle(self.next))
    }

    fn start_interval(&mut self, period_ms: u64) -> Result<TaskHandle> {
        if self.fail_interval {
            return Err("timer unavailable".into());
        }
        self.next += 1;
        self.running.insert(self.next);
        self.intervals.push(period_ms);
        Ok(TaskHandle(self.next))
    }

    fn cancel(&mut self, handle: TaskHandle) -> Result<()> {
        if self.fail_cancel {
            return Err("cancel refused".into());
        }
        self.running.remove(&handle.0);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPresenter {
    field_uploads: usize,
    item_frames: Vec<usize>,
    events: Vec<LifecycleEvent>,
    display_grids: Vec<u32>,
    released: bool,
}

impl TrailPresenter for RecordingPresenter {
    fn configure(&mut self, config: &TrailConfig) -> Result<()> {
        self.display_grids.push(config.display_grid);
        Ok(())
    }

    fn present_field(&mut self, field: &DecayField, _now_ms: u64) -> Result<()> {
        assert_eq!(field.as_bytes().len(), field.size() * field.size() * 4);
        self.field_uploads += 1;
        Ok(())
    }

    fn present_items(&mut self, frames: &[ItemFrame], events: &[LifecycleEvent], _now_ms: u64) -> Result<()> {
        self.item_frames.push(frames.len());
        self.events.extend_from_slice(events);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

fn queue_engine() -> TrailEngine {
    let config = TrailConfig {
        spacing: 20.0,
        removal_interval_ms: 30,
        jitter_enabled: false,
        ..TrailConfig::queue()
    };
    TrailEngine::with_jitter(config, 640.0, 480.0, NoJitter).unwrap()
}

fn field_engine() -> TrailEngine {
    let config = TrailConfig {
        grid_resolution: 16,
        ..TrailConfig::default()
    };
    TrailEngine::with_jitter(config, 640.0, 480.0, NoJitter).unwrap()
}

#[test]
fn queue_mount_runs_frame_loop_and_idle_timer() {
    let mut scheduler = FakeScheduler::default();
    let mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    assert_eq!(scheduler.running.len(), 2);
    assert_eq!(scheduler.intervals, vec![30]);
    assert!(mount.frame_task().is_some());
    assert!(mount.idle_task().is_some());
}

#[test]
fn field_mount_has_no_idle_timer() {
    let mut scheduler = FakeScheduler::default();
    let mount = TrailMount::mount(field_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    assert_eq!(scheduler.running.len(), 1);
    assert!(mount.idle_task().is_none());
}

#[test]
fn failed_idle_timer_rolls_back_frame_loop() {
    let mut scheduler = FakeScheduler {
        fail_interval: true,
        ..FakeScheduler::default()
    };
    let result = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler);
    assert!(result.is_err());
    assert!(scheduler.running.is_empty());
}

#[test]
fn dispose_stops_both_tasks_and_releases_engine() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let frame = mount.frame_task().unwrap();

    mount.dispose(&mut scheduler).unwrap();
    assert!(scheduler.running.is_empty());
    assert!(!mount.is_mounted());
    assert!(mount.engine().is_none());
    assert!(mount.pointer_sender().is_none());
    assert!(mount.presenter().released);

    // Late callbacks and a second dispose are harmless.
    mount.on_task(frame, 1_000).unwrap();
    mount.dispose(&mut scheduler).unwrap();
}

#[test]
fn frame_and_idle_callbacks_reach_the_engine() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let frame = mount.frame_task().unwrap();
    let idle = mount.idle_task().unwrap();

    let sender = mount.pointer_sender().unwrap();
    sender.send(PointerEvent::pixel(0.0, 0.0, 0));
    sender.send(PointerEvent::pixel(40.0, 0.0, 5));
    mount.on_task(frame, 16).unwrap();
    assert_eq!(mount.presenter().item_frames, vec![3]);

    mount.on_task(idle, 200).unwrap();
    let queue = mount.engine().unwrap().queue().unwrap();
    assert_eq!(queue.active_len(), 2);

    mount.on_task(frame, 216).unwrap();
    assert_eq!(mount.presenter().events.len(), 3 + 1);
}

#[test]
fn field_frames_upload_when_dirty() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(field_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let frame = mount.frame_task().unwrap();
    mount
        .engine_mut()
        .unwrap()
        .pointer_move(PointerEvent::pixel(320.0, 240.0, 0));
    mount.on_task(frame, 16).unwrap();
    mount.on_task(frame, 32).unwrap();
    assert_eq!(mount.presenter().field_uploads, 2);
}

#[test]
fn switching_to_field_mode_stops_idle_timer() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    mount
        .set_config(
            TrailConfig {
                grid_resolution: 8,
                ..TrailConfig::default()
            },
            &mut scheduler,
        )
        .unwrap();
    assert!(mount.idle_task().is_none());
    assert_eq!(scheduler.running.len(), 1);

    mount.set_config(TrailConfig::queue(), &mut scheduler).unwrap();
    assert!(mount.idle_task().is_some());
    assert_eq!(scheduler.running.len(), 2);
}

#[test]
fn invalid_config_is_surfaced() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let bad = TrailConfig {
        spacing: -3.0,
        ..TrailConfig::queue()
    };
    assert!(mount.set_config(bad, &mut scheduler).is_err());
    assert_eq!(scheduler.running.len(), 2);
}

#[test]
fn failed_idle_timer_keeps_the_previous_config() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(field_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    scheduler.fail_interval = true;

    assert!(mount.set_config(TrailConfig::queue(), &mut scheduler).is_err());
    let engine = mount.engine().unwrap();
    assert_eq!(engine.mode(), TrailMode::Field);
    assert_eq!(engine.field().unwrap().size(), 16);
    assert!(mount.idle_task().is_none());
    assert_eq!(scheduler.running.len(), 1);

    scheduler.fail_interval = false;
    mount.set_config(TrailConfig::queue(), &mut scheduler).unwrap();
    assert_eq!(mount.engine().unwrap().mode(), TrailMode::Queue);
    assert_eq!(scheduler.running.len(), 2);
}

#[test]
fn changed_removal_interval_swaps_the_idle_timer() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let old = mount.idle_task().unwrap();

    let config = TrailConfig {
        removal_interval_ms: 50,
        ..mount.engine().unwrap().config().clone()
    };
    mount.set_config(config, &mut scheduler).unwrap();
    let new = mount.idle_task().unwrap();
    assert_ne!(old, new);
    assert_eq!(scheduler.intervals, vec![30, 50]);
    assert!(!scheduler.running.contains(&old.0));
    assert!(scheduler.running.contains(&new.0));
}

#[test]
fn failed_cancel_still_leaves_mode_and_timers_matched() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(queue_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let old = mount.idle_task().unwrap();
    scheduler.fail_cancel = true;

    let field = TrailConfig {
        grid_resolution: 8,
        ..TrailConfig::default()
    };
    assert!(mount.set_config(field, &mut scheduler).is_err());
    assert_eq!(mount.engine().unwrap().mode(), TrailMode::Field);
    assert!(mount.idle_task().is_none());

    // The stale timer's callback no longer reaches the engine.
    mount.on_task(old, 1_000).unwrap();
    assert!(mount.engine().unwrap().queue().is_none());
}

#[test]
fn presenter_sees_every_accepted_config() {
    let mut scheduler = FakeScheduler::default();
    let mut mount = TrailMount::mount(field_engine(), RecordingPresenter::default(), &mut scheduler).unwrap();
    let config = TrailConfig {
        display_grid: 12,
        ..mount.engine().unwrap().config().clone()
    };
    mount.set_config(config, &mut scheduler).unwrap();
    let bad = TrailConfig {
        display_grid: 0,
        ..TrailConfig::default()
    };
    assert!(mount.set_config(bad, &mut scheduler).is_err());
    assert_eq!(mount.presenter().display_grids, vec![40, 12]);
}
