use dialdesk_core::domain::{AgentId, DialRecord, DialState, OrganizationId};
use dialdesk_store::error::StoreError;
use dialdesk_store::repo::{FinalizeOutcome, ImportBatch, ImportEntry};
use dialdesk_store::Store;

const NOW: i64 = 1_700_000_000;

fn org() -> OrganizationId {
    OrganizationId::new("acme").expect("org")
}

fn agent(name: &str) -> AgentId {
    AgentId::new(name).expect("agent")
}

fn store_with_leased_record(owner: &AgentId) -> (Store, DialRecord) {
    let store = Store::open_in_memory().expect("open store");
    store.migrate().expect("migrate");
    store
        .records()
        .import(
            NOW,
            ImportBatch {
                organization_id: org(),
                assigned_to: owner.clone(),
                uploaded_by: None,
                entries: vec![ImportEntry {
                    notes: Some("imported note".to_string()),
                    ..ImportEntry::new("+44 20 7946 0000")
                }],
            },
        )
        .expect("import");
    let leased = store
        .leases()
        .lease_next(NOW + 1, &org(), owner)
        .expect("lease")
        .expect("record");
    (store, leased)
}

#[test]
fn finalize_completes_whatever_the_disposition() {
    for disposition in ["Interested", "No Answer", "no_answer", "", "   "] {
        let a = agent("agent-a");
        let (store, leased) = store_with_leased_record(&a);

        let finalized = store
            .outcomes()
            .finalize(NOW + 60, leased.id, &a, FinalizeOutcome::new(disposition))
            .expect("finalize");

        assert_eq!(finalized.state, DialState::Completed, "{disposition:?}");
        assert_eq!(finalized.currently_dialing_by(), None);
        assert_eq!(finalized.completed_at, Some(NOW + 60));
        assert_eq!(finalized.disposition.as_deref(), Some(disposition.trim()));
        assert_eq!(finalized.attempts, 1);
    }
}

#[test]
fn finalize_by_other_agent_leaves_lease_in_place() {
    let a = agent("agent-a");
    let b = agent("agent-b");
    let (store, leased) = store_with_leased_record(&a);

    let err = store
        .outcomes()
        .finalize(NOW + 60, leased.id, &b, FinalizeOutcome::new("Sale"))
        .expect_err("not owner");
    assert!(matches!(err, StoreError::NotFoundOrNotOwned(id) if id == leased.id));

    let stored = store
        .records()
        .get(leased.id)
        .expect("get")
        .expect("record");
    assert_eq!(stored.state, DialState::Dialing { agent: a });
    assert_eq!(stored.disposition, None);
    assert_eq!(stored.completed_at, None);
}

#[test]
fn finalize_keeps_notes_unless_given_and_links_call_log() {
    let a = agent("agent-a");
    let (store, leased) = store_with_leased_record(&a);

    let finalized = store
        .outcomes()
        .finalize(
            NOW + 60,
            leased.id,
            &a,
            FinalizeOutcome {
                disposition: "Callback".to_string(),
                notes: None,
                comments: Some("call after 5pm".to_string()),
                call_log_id: Some("CA123".to_string()),
            },
        )
        .expect("finalize");

    assert_eq!(finalized.notes.as_deref(), Some("imported note"));
    assert_eq!(finalized.comments.as_deref(), Some("call after 5pm"));
    assert_eq!(finalized.call_log_id.as_deref(), Some("CA123"));
}

#[test]
fn finalize_after_release_is_rejected() {
    let a = agent("agent-a");
    let (store, leased) = store_with_leased_record(&a);
    store.leases().release(NOW + 2, leased.id, &a).expect("release");

    let err = store
        .outcomes()
        .finalize(NOW + 3, leased.id, &a, FinalizeOutcome::new("Sale"))
        .expect_err("lease gone");
    assert!(matches!(err, StoreError::NotFoundOrNotOwned(_)));
}

#[test]
fn second_finalize_is_rejected_and_keeps_first_outcome() {
    let a = agent("agent-a");
    let (store, leased) = store_with_leased_record(&a);
    store
        .outcomes()
        .finalize(NOW + 10, leased.id, &a, FinalizeOutcome::new("Sale"))
        .expect("finalize");

    let err = store
        .outcomes()
        .finalize(NOW + 20, leased.id, &a, FinalizeOutcome::new("Not Interested"))
        .expect_err("already finalized");
    assert!(matches!(err, StoreError::NotFoundOrNotOwned(_)));

    let stored = store
        .records()
        .get(leased.id)
        .expect("get")
        .expect("record");
    assert_eq!(stored.disposition.as_deref(), Some("Sale"));
}

#[test]
fn completed_records_leave_the_queue() {
    let a = agent("agent-a");
    let (store, leased) = store_with_leased_record(&a);
    store
        .outcomes()
        .finalize(NOW + 10, leased.id, &a, FinalizeOutcome::new("No Answer"))
        .expect("finalize");

    let next = store.leases().lease_next(NOW + 20, &org(), &a).expect("lease");
    assert!(next.is_none());
}
