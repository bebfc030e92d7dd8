//! Demo that plays one full prank session against the library, logging to stdout.
//!
//! `MOOD_TIME_UNIT_MS` shortens the theatrical pauses (default here: 200 ms).

use std::time::Duration;

use mood_prank_analyzer::phase::Phase;
use mood_prank_analyzer::{ImageHandle, MoodConfig, MoodSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut cfg = MoodConfig::from_env()?;
    if std::env::var(mood_prank_analyzer::config::ENV_MOOD_TIME_UNIT_MS).is_err() {
        cfg.timing.time_unit_ms = 200;
    }
    let session = MoodSession::new(&cfg);
    println!("time unit: {} ms", session.timing().time_unit_ms);
    let mut updates = session.subscribe();

    session.image_selected(ImageHandle::new("file:///tmp/selfie.png"));
    println!("upload -> {}", session.snapshot().phase);
    session.cheer_accepted();
    println!("cheer accepted -> {}", session.snapshot().phase);

    session.message_sent("You are amazing");
    report(&session, "message \"You are amazing\"");
    session.quick_reply_at(1);
    report(&session, "quick reply \"You're annoying!\"");
    let joke = session.tell_joke();
    println!("joke: {joke}");
    report(&session, "joke");

    while session.snapshot().phase == Phase::Cheering && session.pending_timers() == 0 {
        session.quick_reply(true);
        report(&session, "positive quick reply");
    }

    // follow the timers until the prank is revealed
    while !updates.borrow_and_update().fooled_revealed {
        tokio::select! {
            changed = updates.changed() => changed?,
            _ = tokio::time::sleep(Duration::from_secs(30)) => anyhow::bail!("demo stalled"),
        }
        let snap = updates.borrow().clone();
        println!("timer -> phase {}", snap.phase);
        if let Some(r) = &snap.result {
            println!(
                "  analysis: {} {} ({:.0}% confidence) {}",
                r.emotion.emoji(),
                r.emotion,
                r.confidence * 100.0,
                r.description
            );
        }
    }

    println!("Gotcha! The website never needed cheering up. You were fooled.");
    session.acknowledge_disclosure();
    println!("back to {}", session.snapshot().phase);
    Ok(())
}

fn report(session: &MoodSession, what: &str) {
    let s = session.snapshot();
    println!(
        "{what}: mood {} {} ({})",
        s.mood_level, s.mood_emoji, s.mood_tier
    );
}
