//! Racing submissions against one store.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tribunal_court::{CaseStatus, Error, ErrorClass, Result, SubmitOutcome, Tribunal, Vote};
use tribunal_integration_tests::Court;

/// Submit, retrying while the store reports lock contention.
fn submit(tribunal: &Tribunal, juror: &str, case_id: &str, vote: Vote) -> Result<SubmitOutcome> {
    loop {
        match tribunal.submit_verdict(juror, case_id, vote) {
            Err(e) if e.class() == ErrorClass::Unavailable => thread::yield_now(),
            other => return other,
        }
    }
}

#[test]
fn same_juror_double_submit_records_once() {
    for round in 0..20 {
        let court = Court::new();
        let case = court.open(&format!("post-{}", round), Some("author"));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [Vote::Guilty, Vote::Innocent]
            .into_iter()
            .map(|vote| {
                let tribunal = Arc::clone(&court.tribunal);
                let barrier = Arc::clone(&barrier);
                let case_id = case.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    submit(&tribunal, "ann", &case_id, vote)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(Error::DuplicateVote { .. })))
            .count();
        assert_eq!((ok, dup), (1, 1));

        let verdicts = court.tribunal.storage().verdicts_for_case(&case.id).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert_eq!(court.tribunal.get_case(&case.id).unwrap().tally.total(), 1);
        assert_eq!(court.tribunal.fetch_juror_stats("ann").unwrap().cases_reviewed, 1);
    }
}

#[test]
fn many_jurors_resolve_exactly_once() {
    const JURORS: usize = 12;

    let court = Court::new();
    let case = court.open("post-1", Some("author"));
    let barrier = Arc::new(Barrier::new(JURORS));

    let handles: Vec<_> = (0..JURORS)
        .map(|i| {
            let tribunal = Arc::clone(&court.tribunal);
            let barrier = Arc::clone(&barrier);
            let case_id = case.id.clone();
            thread::spawn(move || {
                let juror = format!("juror{}", i);
                barrier.wait();
                (juror.clone(), submit(&tribunal, &juror, &case_id, Vote::Guilty))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let accepted: Vec<_> = results
        .iter()
        .filter_map(|(juror, r)| r.as_ref().ok().map(|o| (juror.clone(), o)))
        .collect();
    let resolved = accepted.iter().filter(|(_, o)| o.resolved).count();
    assert_eq!(resolved, 1);
    assert_eq!(accepted.len(), 3);

    for (_, r) in &results {
        if let Err(e) = r {
            assert!(matches!(e, Error::CaseAlreadyResolved(_)), "unexpected {:?}", e);
        }
    }

    let stored = court.tribunal.get_case(&case.id).unwrap();
    assert_eq!(stored.status, CaseStatus::Reviewed);
    assert_eq!(stored.tally.total(), 3);

    let verdicts = court.tribunal.storage().verdicts_for_case(&case.id).unwrap();
    let voters: HashSet<_> = verdicts.iter().map(|v| v.juror_id.clone()).collect();
    assert_eq!(verdicts.len(), 3);
    assert_eq!(voters.len(), 3);
    let winners: HashSet<_> = accepted.into_iter().map(|(j, _)| j).collect();
    assert_eq!(voters, winners);

    assert!(court.tribunal.storage().pending_case_ids().unwrap().is_empty());
}

#[test]
fn split_race_never_reverses_a_resolution() {
    const JURORS: usize = 10;

    let court = Court::new();
    let case = court.open("post-1", Some("author"));
    let barrier = Arc::new(Barrier::new(JURORS));

    let handles: Vec<_> = (0..JURORS)
        .map(|i| {
            let tribunal = Arc::clone(&court.tribunal);
            let barrier = Arc::clone(&barrier);
            let case_id = case.id.clone();
            let vote = if i % 2 == 0 { Vote::Guilty } else { Vote::Innocent };
            thread::spawn(move || {
                barrier.wait();
                submit(&tribunal, &format!("juror{}", i), &case_id, vote)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap().ok())
        .collect();

    let resolving: Vec<_> = outcomes.iter().filter(|o| o.resolved).collect();
    assert_eq!(resolving.len(), 1);

    let stored = court.tribunal.get_case(&case.id).unwrap();
    assert_eq!(stored.status, resolving[0].status);
    assert_eq!(Some(stored.tally), stored.final_tally);
    assert_eq!(stored.tally.total() as usize, outcomes.len());
    assert!(outcomes.len() <= 7);
}
