//! Link events arriving while the scheduler is suspended on the store.
//!
//! The gate holds a sweep or an occupation attempt inside its protection
//! lookup; the test then delivers an event through the normal path and
//! lets the lookup finish. Whatever the scheduler decided before the event
//! must not be applied to the session as it is afterwards.

mod common;
use common::{Harness, kills, notices_to};
use slirc_nickguard::services::ServiceEffect;
use std::time::Duration;

const GRACE: Duration = Duration::from_secs(60);
const EVIL_HOST: &str = "evil@bad.example";

/// Start a sweep and wait until it is held at the gate.
async fn parked_sweep(h: &Harness) -> tokio::task::JoinHandle<Vec<ServiceEffect>> {
    h.gate.arm();
    let guard = h.guard.clone();
    let sweep = tokio::spawn(async move { guard.sweep().await });
    h.gate.parked.notified().await;
    sweep
}

#[tokio::test]
async fn owner_identifying_during_sweep_is_not_killed() -> anyhow::Result<()> {
    let h = Harness::live(&["alice"]).await?;
    h.connect("001AAAAAA", "alice", "evil", "bad.example").await?;
    h.advance(GRACE);

    let sweep = parked_sweep(&h).await;
    h.login("001AAAAAA", Some("alice")).await?;
    h.gate.release.notify_one();
    let effects = sweep.await?;

    assert!(kills(&effects).is_empty(), "owner killed: {:?}", effects);
    let notices = notices_to(&effects, "001AAAAAA");
    assert!(notices.iter().any(|n| n.contains("recognized as the owner")));
    assert!(h.guard.sessions().contains("001AAAAAA"));
    assert!(h.guard.tracker().is_empty());
    assert!(h.db.abuse().get(EVIL_HOST).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn renaming_away_during_sweep_is_not_killed() -> anyhow::Result<()> {
    let h = Harness::live(&["alice"]).await?;
    h.connect("001AAAAAA", "alice", "evil", "bad.example").await?;
    h.advance(GRACE);

    let sweep = parked_sweep(&h).await;
    h.rename("001AAAAAA", "guest1").await?;
    h.gate.release.notify_one();
    let effects = sweep.await?;

    assert!(kills(&effects).is_empty(), "renamed session killed: {:?}", effects);
    assert!(h.guard.sessions().contains("001AAAAAA"));
    assert!(h.db.abuse().get(EVIL_HOST).await?.is_none());

    // Nothing left on the clock either
    h.advance(GRACE);
    assert!(kills(&h.tick().await).is_empty());
    Ok(())
}

#[tokio::test]
async fn wrong_account_during_sweep_is_still_killed() -> anyhow::Result<()> {
    let h = Harness::live(&["alice", "carol"]).await?;
    h.connect("001AAAAAA", "alice", "evil", "bad.example").await?;
    h.advance(GRACE);

    let sweep = parked_sweep(&h).await;
    h.login("001AAAAAA", Some("carol")).await?;
    h.gate.release.notify_one();
    let effects = sweep.await?;

    assert_eq!(kills(&effects), vec!["001AAAAAA"]);
    let record = h.db.abuse().get(EVIL_HOST).await?.expect("abuse recorded");
    assert_eq!(record.attempts, 1);
    Ok(())
}

#[tokio::test]
async fn owner_identifying_during_contest_is_not_killed() -> anyhow::Result<()> {
    let h = Harness::live(&["alice"]).await?;
    for uid in ["001AAAAAA", "001AAAAAB", "001AAAAAC"] {
        h.connect(uid, "alice", "evil", "bad.example").await?;
        h.advance(GRACE);
        h.tick().await;
    }
    assert_eq!(h.guard.deferred().len(), 1);

    h.connect("003AAAAAA", "alice", "other", "elsewhere.example").await?;
    h.advance(Duration::from_secs(1));

    h.gate.arm();
    let guard = h.guard.clone();
    let attempt = tokio::spawn(async move { guard.run_deferred().await });
    h.gate.parked.notified().await;
    h.login("003AAAAAA", Some("alice")).await?;
    h.gate.release.notify_one();
    let effects = attempt.await?;
    assert!(kills(&effects).is_empty(), "owner killed: {:?}", effects);

    // The retried attempt sees the owner and stands down
    h.advance(Duration::from_secs(3));
    let effects = h.tick().await;
    assert!(kills(&effects).is_empty());
    assert!(h.guard.deferred().is_empty());
    assert!(h.guard.dummies().is_empty());
    assert!(h.guard.sessions().contains("003AAAAAA"));
    Ok(())
}

#[tokio::test]
async fn failed_block_leaves_no_placeholder() -> anyhow::Result<()> {
    let h = Harness::live(&["alice"]).await?;
    for uid in ["001AAAAAA", "001AAAAAB", "001AAAAAC"] {
        h.connect(uid, "alice", "evil", "bad.example").await?;
        h.advance(GRACE);
        h.tick().await;
    }

    h.gate.fail_blocks(true);
    h.advance(Duration::from_secs(1));
    let effects = h.tick().await;

    assert!(
        !effects
            .iter()
            .any(|e| matches!(e, ServiceEffect::IntroducePlaceholder { .. })),
        "placeholder introduced: {:?}",
        effects
    );
    assert!(h.guard.dummies().is_empty());
    assert!(h.guard.sessions().by_nick("alice").is_none());

    let record = h.db.abuse().get(EVIL_HOST).await?.expect("abuse recorded");
    assert!(!record.is_blocked(h.clock_unix()));
    Ok(())
}
