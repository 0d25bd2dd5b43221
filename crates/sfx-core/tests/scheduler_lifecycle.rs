mod common;

use common::fake_backend::{clip_with_odds, ms, FakeBackend, TICK};
use sfx_core::Scheduler;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn activate_twice_spawns_one_task() {
    let backend = FakeBackend::instant();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("a.mp3", 1);

    scheduler.activate(&clip);
    scheduler.activate(&clip);

    assert!(clip.is_active());
    assert_eq!(scheduler.live_tasks(), 1);

    // Odds of 1 play on every tick; a second task would double the count.
    tokio::time::sleep(TICK * 4 + ms(10)).await;
    assert_eq!(backend.play_count(), 4);
    assert!(backend
        .paths()
        .iter()
        .all(|p| p == std::path::Path::new("sfx/a.mp3")));
}

#[tokio::test(start_paused = true)]
async fn deactivate_then_activate_leaves_exactly_one_task() {
    let backend = FakeBackend::instant();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("a.mp3", 1);

    scheduler.activate(&clip);
    tokio::time::sleep(TICK * 2 + ms(10)).await;

    scheduler.deactivate(&clip);
    assert!(!clip.is_active());
    scheduler.activate(&clip);
    assert!(clip.is_active());

    // Give the cancelled task a chance to observe cancellation and exit.
    tokio::time::sleep(ms(10)).await;
    assert_eq!(scheduler.live_tasks(), 1);

    let before = backend.play_count();
    tokio::time::sleep(TICK * 10 + ms(10)).await;
    assert_eq!(backend.play_count() - before, 10);
}

#[tokio::test(start_paused = true)]
async fn deactivate_is_idempotent() {
    let backend = FakeBackend::instant();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("a.mp3", 1);

    scheduler.deactivate(&clip);
    assert!(!clip.is_active());

    scheduler.activate(&clip);
    scheduler.deactivate(&clip);
    scheduler.deactivate(&clip);
    tokio::time::sleep(TICK * 3).await;

    assert_eq!(scheduler.live_tasks(), 0);
    assert_eq!(backend.play_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_playback_stops_audio_and_does_not_replay() {
    let backend = FakeBackend::lasting(Duration::from_secs(10));
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("long.mp3", 1);

    scheduler.activate(&clip);
    tokio::time::sleep(TICK + ms(10)).await;
    assert_eq!(backend.play_count(), 1);
    assert_eq!(backend.stop_count(), 0);

    scheduler.deactivate(&clip);
    tokio::time::sleep(ms(5)).await;
    assert_eq!(backend.stop_count(), 1);
    assert_eq!(scheduler.live_tasks(), 0);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(backend.play_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn playback_blocks_the_loop_until_finished() {
    let backend = FakeBackend::lasting(Duration::from_secs(1));
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("a.mp3", 1);

    scheduler.activate(&clip);
    // Play at 250ms, finishes at 1250ms, next tick 1500ms.
    tokio::time::sleep(ms(1400)).await;
    assert_eq!(backend.play_count(), 1);
    tokio::time::sleep(ms(200)).await;
    assert_eq!(backend.play_count(), 2);
    assert_eq!(backend.stop_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn playback_failure_keeps_polling() {
    let backend = FakeBackend::failing();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let broken = clip_with_odds("missing.mp3", 1);

    scheduler.activate(&broken);
    tokio::time::sleep(TICK * 4 + ms(10)).await;

    assert_eq!(backend.play_count(), 4);
    assert!(broken.is_active());
    assert_eq!(scheduler.live_tasks(), 1);
}

#[tokio::test(start_paused = true)]
async fn volume_edit_is_seen_on_a_later_tick() {
    let backend = FakeBackend::instant();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("a.mp3", 1);

    scheduler.activate(&clip);
    tokio::time::sleep(TICK * 2 + ms(10)).await;
    clip.set_volume(0.25);
    tokio::time::sleep(TICK * 3).await;

    let volumes = backend.volumes();
    assert_eq!(volumes.first(), Some(&1.0));
    assert!(volumes.contains(&0.25), "volumes seen: {:?}", volumes);
}

#[tokio::test(start_paused = true)]
async fn odds_edit_is_seen_on_a_later_tick() {
    let backend = FakeBackend::instant();
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clip = clip_with_odds("rare.mp3", u32::MAX);

    scheduler.activate(&clip);
    tokio::time::sleep(TICK * 8).await;
    assert_eq!(backend.play_count(), 0);

    clip.set_play_odds(1);
    tokio::time::sleep(TICK * 4).await;
    assert!(backend.play_count() >= 3);
}

#[tokio::test(start_paused = true)]
async fn clips_poll_independently() {
    let backend = FakeBackend::lasting(Duration::from_secs(5));
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clips = vec![
        clip_with_odds("a.mp3", 1),
        clip_with_odds("b.mp3", 1),
        clip_with_odds("c.mp3", 1),
    ];

    scheduler.activate_all(&clips);
    assert_eq!(scheduler.live_tasks(), 3);

    // One clip playing a long file does not hold the others back.
    tokio::time::sleep(TICK + ms(10)).await;
    assert_eq!(backend.play_count(), 3);

    scheduler.deactivate(&clips[1]);
    tokio::time::sleep(ms(5)).await;
    assert_eq!(backend.stop_count(), 1);
    assert_eq!(scheduler.live_tasks(), 2);
    assert!(clips[0].is_active() && clips[2].is_active());

    scheduler.deactivate_all(&clips);
    tokio::time::sleep(ms(5)).await;
    assert_eq!(scheduler.live_tasks(), 0);
    assert_eq!(backend.stop_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_every_task() {
    let backend = FakeBackend::lasting(Duration::from_secs(30));
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);
    let clips: Vec<_> = ["a.mp3", "b.mp3"]
        .iter()
        .map(|name| clip_with_odds(name, 1))
        .collect();

    scheduler.activate_all(&clips);
    tokio::time::sleep(TICK + ms(10)).await;

    scheduler.shutdown(&clips).await;
    assert_eq!(scheduler.live_tasks(), 0);
    assert!(clips.iter().all(|c| !c.is_active()));

    tokio::time::sleep(ms(5)).await;
    assert_eq!(backend.stop_count(), 2);

    // Reactivation after shutdown works.
    scheduler.activate(&clips[0]);
    assert_eq!(scheduler.live_tasks(), 1);
}

#[tokio::test(start_paused = true)]
async fn deactivate_on_tick_boundary_starts_no_playback() {
    let backend = FakeBackend::lasting(Duration::from_secs(10));
    let scheduler = Scheduler::new(backend.clone()).with_tick(TICK);

    for i in 0..100 {
        let clip = clip_with_odds(&format!("clip{i}.mp3"), 1);
        scheduler.activate(&clip);
        // Let the task register its first tick, then wake on the same instant.
        tokio::task::yield_now().await;
        tokio::time::sleep(TICK).await;

        let before = backend.play_count();
        scheduler.deactivate(&clip);
        tokio::time::sleep(ms(50)).await;

        assert_eq!(backend.play_count(), before, "trial {i} played after deactivate");
        assert_eq!(scheduler.live_tasks(), 0);
    }
}
