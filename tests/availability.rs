//! Match lifecycle behaviour through the availability service.

mod common;

use std::sync::Arc;

use common::{FakeDirectory, harness, harness_with_directory, member};
use matchday::{
    dao::{
        match_store::{FailureLedger, MatchOrder},
        models::{Availability, PushFailureEntity, parse_match_instant},
    },
    dto::{CreateMatchRequest, PatchMatchRequest},
    error::ServiceError,
    services::availability::RosterPolicy,
};

fn create_request(opponent: &str) -> CreateMatchRequest {
    CreateMatchRequest {
        venue: "Victoria Park".to_owned(),
        date: "2026-09-12".to_owned(),
        time: "14:30".to_owned(),
        opponent: opponent.to_owned(),
        address: Some("E9 7DD".to_owned()),
        status: None,
    }
}

fn full_roster() -> Vec<matchday::directory::Member> {
    vec![
        member("alice", "Alice", Some("tok-alice")),
        member("bob", "Bob", Some("tok-bob")),
        member("cara", "Cara", None),
    ]
}

#[tokio::test]
async fn create_gives_every_directory_member_one_unresponded_record() {
    let harness = harness(full_roster());

    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    assert_eq!(created.squad.len(), 3);
    for record in created.squad.values() {
        assert_eq!(record.status, Availability::NotResponded);
    }
    assert_eq!(
        created.squad.get("alice").unwrap().push_token.as_deref(),
        Some("tok-alice")
    );
    assert_eq!(created.squad.get("cara").unwrap().push_token, None);

    let stored = harness.service.get_match(&created.id).await.unwrap();
    assert_eq!(stored, created);

    // Only the two members with a device reach the transport.
    let batches = harness.transport.batches();
    assert_eq!(batches, vec![vec!["tok-alice".to_owned(), "tok-bob".to_owned()]]);
}

#[tokio::test]
async fn create_rejects_missing_opponent_before_any_side_effect() {
    let harness = harness(full_roster());

    let mut request = create_request("Rovers");
    request.opponent = String::new();
    let err = harness.service.create_match(request).await.unwrap_err();

    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(harness.store.match_count(), 0);
    assert!(harness.transport.batches().is_empty());
}

#[tokio::test]
async fn create_propagates_directory_outage_without_writing() {
    let harness = harness_with_directory(FakeDirectory::unavailable());

    let err = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::DirectoryUnavailable(_)));
    assert_eq!(harness.store.match_count(), 0);
    assert!(harness.transport.batches().is_empty());
}

#[tokio::test]
async fn create_succeeds_even_when_every_push_fails() {
    let harness = harness(full_roster());
    harness.transport.push_error();

    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    assert_eq!(harness.store.match_count(), 1);
    assert_eq!(harness.store.failure_entries().len(), 1);
    assert!(harness.service.get_match(&created.id).await.is_ok());
}

#[tokio::test]
async fn patch_preserves_recorded_responses_by_default() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();
    harness
        .service
        .patch_member_status(&created.id, "alice", Availability::Yes)
        .await
        .unwrap();

    let patch = PatchMatchRequest {
        venue: Some("Mabley Green".to_owned()),
        ..PatchMatchRequest::default()
    };
    harness
        .service
        .patch_match(&created.id, patch, RosterPolicy::PreserveResponses)
        .await
        .unwrap();

    let stored = harness.service.get_match(&created.id).await.unwrap();
    assert_eq!(stored.venue, "Mabley Green");
    assert_eq!(stored.opponent, "Rovers");
    assert_eq!(stored.squad.get("alice").unwrap().status, Availability::Yes);
}

#[tokio::test]
async fn patch_with_roster_refresh_resets_every_response() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();
    harness
        .service
        .patch_member_status(&created.id, "alice", Availability::Yes)
        .await
        .unwrap();

    harness
        .service
        .patch_match(
            &created.id,
            PatchMatchRequest::default(),
            RosterPolicy::RefreshRoster,
        )
        .await
        .unwrap();

    let stored = harness.service.get_match(&created.id).await.unwrap();
    assert_eq!(stored.squad.len(), 3);
    for record in stored.squad.values() {
        assert_eq!(record.status, Availability::NotResponded);
    }
}

#[tokio::test]
async fn patch_recomputes_the_comparable_instant() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    let patch = PatchMatchRequest {
        date: Some("2026-10-03".to_owned()),
        time: Some("11:00".to_owned()),
        ..PatchMatchRequest::default()
    };
    harness
        .service
        .patch_match(&created.id, patch, RosterPolicy::PreserveResponses)
        .await
        .unwrap();

    let stored = harness.service.get_match(&created.id).await.unwrap();
    assert_eq!(
        stored.match_date,
        parse_match_instant("2026-10-03", "11:00").unwrap()
    );
}

#[tokio::test]
async fn patch_rejects_empty_and_unknown_ids() {
    let harness = harness(full_roster());

    let empty = harness
        .service
        .patch_match("", PatchMatchRequest::default(), RosterPolicy::PreserveResponses)
        .await
        .unwrap_err();
    assert!(matches!(empty, ServiceError::InvalidInput(_)));

    let unknown = harness
        .service
        .patch_match(
            "2026-09-12-1430-nobody",
            PatchMatchRequest::default(),
            RosterPolicy::PreserveResponses,
        )
        .await
        .unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn member_status_patch_touches_only_the_named_member() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    harness
        .service
        .patch_member_status(&created.id, "bob", Availability::No)
        .await
        .unwrap();

    let stored = harness.service.get_match(&created.id).await.unwrap();
    assert_eq!(stored.squad.get("bob").unwrap().status, Availability::No);
    assert_eq!(
        stored.squad.get("alice").unwrap().status,
        Availability::NotResponded
    );
    assert_eq!(stored.venue, created.venue);
}

#[tokio::test]
async fn member_status_patch_distinguishes_missing_match_and_member() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    let no_match = harness
        .service
        .patch_member_status("missing", "alice", Availability::Yes)
        .await
        .unwrap_err();
    assert!(matches!(no_match, ServiceError::NotFound(_)));

    let no_member = harness
        .service
        .patch_member_status(&created.id, "zoe", Availability::Yes)
        .await
        .unwrap_err();
    assert!(matches!(no_member, ServiceError::NotFound(_)));

    let bad_member = harness
        .service
        .patch_member_status(&created.id, "a.b", Availability::Yes)
        .await
        .unwrap_err();
    assert!(matches!(bad_member, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn concurrent_status_patches_for_two_members_both_land() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    let service = Arc::new(harness.service.clone());
    let id = created.id.clone();

    let first = {
        let service = Arc::clone(&service);
        let id = id.clone();
        tokio::spawn(async move {
            service
                .patch_member_status(&id, "alice", Availability::Yes)
                .await
        })
    };
    let second = {
        let service = Arc::clone(&service);
        let id = id.clone();
        tokio::spawn(async move {
            service
                .patch_member_status(&id, "bob", Availability::No)
                .await
        })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let stored = harness.service.get_match(&id).await.unwrap();
    assert_eq!(stored.squad.get("alice").unwrap().status, Availability::Yes);
    assert_eq!(stored.squad.get("bob").unwrap().status, Availability::No);
}

#[tokio::test]
async fn delete_removes_the_match_but_not_the_ledger() {
    let harness = harness(full_roster());
    let created = harness
        .service
        .create_match(create_request("Rovers"))
        .await
        .unwrap();

    harness
        .store
        .record(PushFailureEntity {
            bucket_id: "1232026914".to_owned(),
            failed_tokens: vec!["tok-old".to_owned()],
            message_id: "not available".to_owned(),
        })
        .await
        .unwrap();

    harness.service.delete_match(&created.id).await.unwrap();

    let gone = harness.service.get_match(&created.id).await.unwrap_err();
    assert!(matches!(gone, ServiceError::NotFound(_)));
    assert_eq!(harness.store.failure_entries().len(), 1);

    let again = harness.service.delete_match(&created.id).await.unwrap_err();
    assert!(matches!(again, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn listings_expose_both_date_orderings() {
    let harness = harness(full_roster());
    let mut early = create_request("Rovers");
    early.date = "2026-03-01".to_owned();
    let mut late = create_request("United");
    late.date = "2026-11-20".to_owned();

    harness.service.create_match(early).await.unwrap();
    harness.service.create_match(late).await.unwrap();

    let upcoming = harness
        .service
        .list_matches(MatchOrder::Upcoming)
        .await
        .unwrap();
    assert_eq!(upcoming[0].opponent, "Rovers");
    assert_eq!(upcoming[1].opponent, "United");

    let history = harness
        .service
        .list_matches(MatchOrder::History)
        .await
        .unwrap();
    assert_eq!(history[0].opponent, "United");
    assert_eq!(history[1].opponent, "Rovers");
}
