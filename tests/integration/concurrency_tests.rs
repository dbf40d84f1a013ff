//! Provider and repository under parallel callers
use crate::test_utils::test_tollgate;
use backend_lib::crypto::CryptoProvider;
use chrono::{TimeDelta, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tollgate_common::Descriptor;

#[test]
fn test_parallel_signing_and_sessions() {
    let tollgate = Arc::new(test_tollgate());

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let tollgate = Arc::clone(&tollgate);
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..25 {
                    let session = tollgate.sessions.create_session(Descriptor::new()).unwrap();
                    let id = session.id().as_str().to_string();

                    let signature = tollgate.crypto.make_signature(&id).unwrap();
                    assert!(tollgate.crypto.test_signature(&id, &signature).unwrap());

                    let secret = format!("worker-{worker}-{i}");
                    let ciphertext = tollgate.crypto.encrypt(&secret).unwrap();
                    assert_eq!(tollgate.crypto.decrypt(&ciphertext).unwrap(), secret);

                    tollgate.sessions.touch(&id).unwrap();
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let sweepers: Vec<_> = (0..2)
        .map(|_| {
            let tollgate = Arc::clone(&tollgate);
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(tollgate.sessions.clean_expired_sessions(), 0);
                }
            })
        })
        .collect();

    let ids: HashSet<String> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    for sweeper in sweepers {
        sweeper.join().unwrap();
    }

    // ids are never reused
    assert_eq!(ids.len(), 200);
    assert_eq!(tollgate.sessions.len(), 200);
}

#[test]
fn test_touch_racing_sweep_never_loses_live_session() {
    let tollgate = Arc::new(test_tollgate());
    let session = tollgate.sessions.create_session(Descriptor::new()).unwrap();
    let id = session.id().as_str().to_string();
    let idle = session.max_idle();

    // Sweep at a time that is only in the past for a session never touched
    // after creation; concurrent touches keep moving the deadline forward.
    let sweep_at = session.last_accessed() + idle;
    let toucher = {
        let tollgate = Arc::clone(&tollgate);
        let id = id.clone();
        thread::spawn(move || {
            for step in 1..=200 {
                let at = session.last_accessed() + TimeDelta::milliseconds(step);
                // fails only once the sweep has removed it
                if tollgate.sessions.touch_at(&id, at).is_err() {
                    return false;
                }
            }
            true
        })
    };

    let mut removed = 0;
    for _ in 0..200 {
        removed += tollgate.sessions.clean_expired_sessions_at(sweep_at);
    }
    let survived_all_touches = toucher.join().unwrap();

    // Either the session was swept before the first touch landed, or every
    // touch got in and the session outlived the sweep.
    let present = tollgate.sessions.find_by_id_at(&id, Utc::now()).is_some();
    assert_eq!(present, removed == 0);
    assert!(removed <= 1);
    if present {
        assert!(survived_all_touches);
    }
}
