//! Queue, stats, history and moderation hand-off as a juror sees them.

use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;
use tribunal_consensus::Rank;
use tribunal_court::events;
use tribunal_court::{
    AiAnalysis, CaseStatus, ContentLookup, CourtSettings, Error, LiveContent, ModerationAction,
    ModerationExecutor, Result, StatsTracker, Storage, TargetType, Tribunal, UnknownAuthorPolicy,
    Vote,
};
use tribunal_integration_tests::{report, Court};

#[test]
fn queue_is_oldest_first_and_excludes_reviewed_and_own() {
    let court = Court::new();
    let first = court.open("p1", Some("author"));
    sleep(Duration::from_millis(3));
    let own = court.open("p2", Some("ann"));
    sleep(Duration::from_millis(3));
    let second = court.open("p3", Some("author"));
    sleep(Duration::from_millis(3));
    let third = court.open("p4", Some("author"));

    let ids: Vec<_> = court
        .tribunal
        .fetch_case_queue("ann", 10)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![first.id.clone(), second.id.clone(), third.id.clone()]);
    assert!(!ids.contains(&own.id));

    court.tribunal.submit_verdict("ann", &first.id, Vote::Guilty).unwrap();
    let ids: Vec<_> = court
        .tribunal
        .fetch_case_queue("ann", 1)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![second.id.clone()]);

    assert!(court.tribunal.fetch_case_queue("ann", 0).unwrap().is_empty());
    assert_eq!(court.tribunal.fetch_juror_stats("ann").unwrap().pending_cases_available, 2);
}

#[test]
fn unknown_author_policy_controls_eligibility() {
    let permit = Court::new();
    let case = permit.open("p1", None);
    assert_eq!(permit.tribunal.fetch_case_queue("ann", 10).unwrap().len(), 1);
    permit.tribunal.submit_verdict("ann", &case.id, Vote::Guilty).unwrap();

    let block = Court::with_settings(CourtSettings {
        unknown_author: UnknownAuthorPolicy::Block,
        ..CourtSettings::default()
    });
    let case = block.open("p1", None);
    assert!(block.tribunal.fetch_case_queue("ann", 10).unwrap().is_empty());
    assert!(block.tribunal.submit_verdict("ann", &case.id, Vote::Guilty).is_err());
}

#[test]
fn rank_climbs_with_cases_reviewed() {
    let court = Court::new();
    for i in 0..10 {
        let case = court.open(&format!("p{}", i), Some("author"));
        let out = court.tribunal.submit_verdict("ann", &case.id, Vote::Guilty).unwrap();
        let expected = if i < 9 { Rank::Novice } else { Rank::Associate };
        let stats = out.updated_stats.unwrap();
        assert_eq!(stats.rank, expected);
        assert_eq!(stats.cases_reviewed, i + 1);
    }

    let stats = court.tribunal.fetch_juror_stats("ann").unwrap();
    let next = stats.next_rank.unwrap();
    assert_eq!(next.rank, Rank::Senior);
    assert_eq!(next.cases_remaining, 40);
    assert_eq!(stats.total_resolved_votes, 0);
    assert_eq!(stats.accuracy, 0.0);
}

#[test]
fn accuracy_counts_only_resolved_cases() {
    let court = Court::new();
    let won = court.open("p1", Some("author"));
    let lost = court.open("p2", Some("author"));
    let open = court.open("p3", Some("author"));

    court.tribunal.submit_verdict("ann", &won.id, Vote::Guilty).unwrap();
    court.tribunal.submit_verdict("ann", &lost.id, Vote::Guilty).unwrap();
    court.tribunal.submit_verdict("ann", &open.id, Vote::Guilty).unwrap();
    for juror in ["bob", "cat"] {
        court.tribunal.submit_verdict(juror, &won.id, Vote::Guilty).unwrap();
        court.tribunal.submit_verdict(juror, &lost.id, Vote::Innocent).unwrap();
    }

    let stats = court.tribunal.fetch_juror_stats("ann").unwrap();
    assert_eq!(stats.cases_reviewed, 3);
    assert_eq!(stats.guilty_votes, 3);
    assert_eq!(stats.total_resolved_votes, 2);
    assert_eq!(stats.correct_verdicts, 1);
    assert_eq!(stats.accuracy, 0.5);

    let history = court.tribunal.fetch_juror_history("ann").unwrap();
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].voted_at >= pair[1].voted_at);
    }
    let by_case = |id: &str| history.iter().find(|e| e.case_id == id).unwrap();
    assert_eq!(by_case(&won.id).outcome.was_correct, Some(true));
    assert_eq!(by_case(&lost.id).outcome.was_correct, Some(false));
    assert_eq!(by_case(&lost.id).status, CaseStatus::Dismissed);
    assert_eq!(by_case(&open.id).outcome.was_correct, None);
    assert!(history.iter().all(|e| e.live_content == LiveContent::Unavailable));
}

#[derive(Default)]
struct Recording {
    actions: Mutex<Vec<ModerationAction>>,
}

impl ModerationExecutor for Recording {
    fn execute(&self, action: &ModerationAction) -> Result<()> {
        self.actions.lock().unwrap().push(action.clone());
        Ok(())
    }
}

#[tokio::test]
async fn guilty_resolution_reaches_executor_once() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::open(dir.path()).unwrap());
    let (tx, rx) = events::channel();
    let tribunal = Tribunal::new(storage, CourtSettings::default()).with_events(tx);

    let recording = Arc::new(Recording::default());
    let dispatcher = events::spawn_dispatcher(rx, recording.clone());

    let guilty = tribunal
        .open_case(report("p1", Some("author")), AiAnalysis::default())
        .unwrap();
    let innocent = tribunal
        .open_case(report("p2", Some("author")), AiAnalysis::default())
        .unwrap();
    for juror in ["a", "b", "c"] {
        tribunal.submit_verdict(juror, &guilty.id, Vote::Guilty).unwrap();
        tribunal.submit_verdict(juror, &innocent.id, Vote::Innocent).unwrap();
    }

    // Closing the channel lets the dispatcher drain and exit.
    drop(tribunal);
    dispatcher.await.unwrap();

    let actions = recording.actions.lock().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].case_id, guilty.id);
    assert_eq!(actions[0].target_id, "p1");
}

/// Content store where only `p1` is still up and `p3` times out.
struct Upstream;

impl ContentLookup for Upstream {
    fn exists(&self, _target_type: TargetType, target_id: &str) -> Result<bool> {
        match target_id {
            "p1" => Ok(true),
            "p3" => Err(Error::Unavailable("content store timeout".into())),
            _ => Ok(false),
        }
    }
}

#[test]
fn history_reports_live_content_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::open(dir.path()).unwrap());
    let tribunal =
        Tribunal::new(storage, CourtSettings::default()).with_content_lookup(Arc::new(Upstream));

    for target in ["p1", "p2", "p3"] {
        let case = tribunal
            .open_case(report(target, Some("author")), AiAnalysis::default())
            .unwrap();
        tribunal.submit_verdict("ann", &case.id, Vote::Guilty).unwrap();
    }

    let mut seen: Vec<_> = tribunal
        .fetch_juror_history("ann")
        .unwrap()
        .into_iter()
        .map(|e| (e.snapshot.text, e.live_content))
        .collect();
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        seen,
        vec![
            ("body of p1".to_string(), LiveContent::Available),
            ("body of p2".to_string(), LiveContent::Deleted),
            ("body of p3".to_string(), LiveContent::Unavailable),
        ]
    );
}

#[test]
fn incremental_stats_match_full_recompute() {
    let court = Court::new();
    let mut tracker = StatsTracker::new();
    let a = court.open("p1", Some("author"));
    let b = court.open("p2", Some("author"));

    // Drive the ledger directly so each accepted submission can be applied.
    let ledger = tribunal_court::VerdictLedger::new(
        Arc::clone(court.tribunal.storage()),
        tribunal_court::ConsensusResolver::default(),
        UnknownAuthorPolicy::Permit,
    );
    for (juror, case, vote) in [
        ("ann", &a, Vote::Guilty),
        ("bob", &a, Vote::Guilty),
        ("ann", &b, Vote::Innocent),
        ("cat", &a, Vote::Innocent),
        ("bob", &b, Vote::Guilty),
        ("cat", &b, Vote::Guilty),
    ] {
        let recorded = ledger.record_verdict(juror, &case.id, vote).unwrap();
        tracker.apply(&recorded, court.tribunal.storage()).unwrap();
    }

    let engine = court.tribunal.stats_engine();
    for juror in ["ann", "bob", "cat"] {
        assert_eq!(tracker.profile(juror), engine.profile(juror).unwrap(), "{}", juror);
    }
    assert_eq!(tracker.reconcile(engine).unwrap(), 0);

    let ann = court.tribunal.fetch_juror_stats("ann").unwrap();
    assert_eq!(ann.cases_reviewed, 2);
    assert_eq!(ann.correct_verdicts, 1);
}
