use crate::{ElapsedClock, format_elapsed};

use std::time::Duration;

use tokio_stream::StreamExt;

/// WHAT: Elapsed time excludes paused intervals
/// WHY: The displayed time is recording time, not wall time
#[tokio::test(start_paused = true)]
async fn given_pause_resume_when_stopped_then_paused_time_excluded() {
    // Given: A running clock
    let clock = ElapsedClock::new();
    clock.start();

    // When: Running 2.5s, paused 30s, running 1s, stopped
    tokio::time::sleep(Duration::from_millis(2500)).await;
    clock.freeze();
    assert_eq!(clock.display(), "00:00:02");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(clock.elapsed(), Duration::from_millis(2500));

    clock.resume();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    clock.stop();

    // Then: 3.5s recorded, 30s paused
    assert_eq!(clock.elapsed(), Duration::from_millis(3500));
    assert_eq!(clock.display(), "00:00:03");
    assert_eq!(clock.paused_duration(), Duration::from_secs(30));
    assert!(!clock.is_running());
}

/// WHAT: A stopped clock ignores resume
/// WHY: The stop value must stay on screen until the recording is cleared
#[tokio::test(start_paused = true)]
async fn given_stopped_clock_when_resumed_then_value_held() {
    // Given: A clock stopped at 5s
    let clock = ElapsedClock::new();
    clock.start();
    tokio::time::sleep(Duration::from_secs(5)).await;
    clock.stop();

    // When: Resuming and waiting
    clock.resume();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Then: Still 5s, not running
    assert!(!clock.is_running());
    assert_eq!(clock.elapsed(), Duration::from_secs(5));

    // And: Reset returns to zero
    clock.reset();
    assert_eq!(clock.display(), "00:00:00");
}

/// WHAT: Resume without a prior start does nothing
/// WHY: A stray resume must not start counting
#[tokio::test(start_paused = true)]
async fn given_fresh_clock_when_resumed_then_not_running() {
    let clock = ElapsedClock::new();

    clock.resume();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(!clock.is_running());
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

/// WHAT: Durations format as zero-padded HH:MM:SS
/// WHY: Sub-second values truncate and hours do not wrap
#[test]
fn given_durations_when_formatting_then_hh_mm_ss() {
    assert_eq!(format_elapsed(Duration::ZERO), "00:00:00");
    assert_eq!(format_elapsed(Duration::from_millis(999)), "00:00:00");
    assert_eq!(format_elapsed(Duration::from_secs(3661)), "01:01:01");
    assert_eq!(format_elapsed(Duration::from_secs(100 * 3600)), "100:00:00");
}

/// WHAT: The display feed ticks every period and repeats while frozen
/// WHY: The UI redraws from the feed without asking the controller
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_clock_when_sampling_then_feed_tracks_elapsed() {
    // Given: A running clock and a one-second feed
    let clock = ElapsedClock::new();
    clock.start();
    let mut feed = Box::pin(clock.sample(Duration::from_secs(1)));

    // When: Taking three samples
    let first = feed.next().await.unwrap();
    let second = feed.next().await.unwrap();
    let third = feed.next().await.unwrap();

    // Then: Immediate first value, then one per second
    assert_eq!(
        vec![first, second, third],
        vec!["00:00:00", "00:00:01", "00:00:02"]
    );

    // When: Freezing and sampling again
    clock.freeze();
    let frozen = feed.next().await.unwrap();
    let repeated = feed.next().await.unwrap();

    // Then: The frozen value repeats
    assert_eq!(frozen, "00:00:02");
    assert_eq!(repeated, "00:00:02");
}
