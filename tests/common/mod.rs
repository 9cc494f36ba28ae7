//! Fake collaborators and fixtures shared by the integration suites.
#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::future::BoxFuture;
use matchday::{
    config::AppConfig,
    dao::{
        match_store::memory::MemoryMatchStore,
        models::{AttendanceEntity, Availability, MatchEntity, derive_match_id, parse_match_instant},
    },
    directory::{DirectoryError, Member, MemberDirectory},
    push::{PushError, PushNotification, PushTransport, SendOutcome},
    services::{
        availability::AvailabilityService, dispatch::NotificationDispatcher,
        queries::QueryService, roster::RosterResolver,
    },
};

/// Directory fake serving a fixed member list, or refusing every read.
pub struct FakeDirectory {
    members: Vec<Member>,
    available: bool,
}

impl FakeDirectory {
    pub fn with_members(members: Vec<Member>) -> Self {
        Self {
            members,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            members: Vec::new(),
            available: false,
        }
    }

    fn outage() -> DirectoryError {
        DirectoryError::unavailable(
            "directory offline".to_owned(),
            std::io::Error::other("connection refused"),
        )
    }
}

impl MemberDirectory for FakeDirectory {
    fn list_members(&self) -> BoxFuture<'static, Result<Vec<Member>, DirectoryError>> {
        let result = if self.available {
            Ok(self.members.clone())
        } else {
            Err(Self::outage())
        };
        Box::pin(async move { result })
    }

    fn get_member(&self, id: String) -> BoxFuture<'static, Result<Member, DirectoryError>> {
        let result = if self.available {
            self.members
                .iter()
                .find(|member| member.id == id)
                .cloned()
                .ok_or(DirectoryError::MissingMember { id })
        } else {
            Err(Self::outage())
        };
        Box::pin(async move { result })
    }
}

/// Transport fake returning scripted per-call responses and recording every
/// batch it is handed. With no scripted response queued it reports full
/// success.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<SendOutcome>, PushError>>>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn push_outcomes(&self, outcomes: Vec<SendOutcome>) {
        self.responses.lock().unwrap().push_back(Ok(outcomes));
    }

    pub fn push_error(&self) {
        self.responses.lock().unwrap().push_back(Err(PushError::unavailable(
            "scripted transport failure".to_owned(),
            std::io::Error::other("unreachable"),
        )));
    }

    /// Token batches seen so far, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

impl PushTransport for ScriptedTransport {
    fn send_multicast(
        &self,
        _notification: PushNotification,
        tokens: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<SendOutcome>, PushError>> {
        self.batches.lock().unwrap().push(tokens.clone());
        let response = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(tokens
                .iter()
                .map(|_| delivered("m-0"))
                .collect())
        });
        Box::pin(async move { response })
    }
}

/// Transport fake that never answers within any reasonable deadline.
pub struct SlowTransport {
    pub delay: Duration,
}

impl PushTransport for SlowTransport {
    fn send_multicast(
        &self,
        _notification: PushNotification,
        tokens: Vec<String>,
    ) -> BoxFuture<'static, Result<Vec<SendOutcome>, PushError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(tokens.iter().map(|_| delivered("m-late")).collect())
        })
    }
}

pub fn delivered(message_id: &str) -> SendOutcome {
    SendOutcome {
        success: true,
        message_id: Some(message_id.to_owned()),
    }
}

pub fn undelivered() -> SendOutcome {
    SendOutcome {
        success: false,
        message_id: None,
    }
}

pub fn member(id: &str, display_name: &str, push_token: Option<&str>) -> Member {
    Member {
        id: id.to_owned(),
        display_name: display_name.to_owned(),
        push_token: push_token.map(str::to_owned),
    }
}

/// Fully wired service stack over the in-memory store and fakes.
pub struct Harness {
    pub store: MemoryMatchStore,
    pub transport: Arc<ScriptedTransport>,
    pub service: AvailabilityService,
    pub queries: QueryService,
}

pub fn harness(members: Vec<Member>) -> Harness {
    harness_with_directory(FakeDirectory::with_members(members))
}

pub fn harness_with_directory(directory: FakeDirectory) -> Harness {
    let store = MemoryMatchStore::new();
    let transport = Arc::new(ScriptedTransport::default());
    let dispatcher = NotificationDispatcher::new(
        transport.clone(),
        Arc::new(store.clone()),
        Duration::from_secs(5),
    );
    let resolver = RosterResolver::new(Arc::new(directory));
    let service = AvailabilityService::new(
        Arc::new(store.clone()),
        resolver,
        dispatcher,
        AppConfig::default(),
    );
    let queries = QueryService::new(Arc::new(store.clone()));
    Harness {
        store,
        transport,
        service,
        queries,
    }
}

/// Build a stored-match fixture directly, bypassing the service layer.
pub fn match_fixture(
    date: &str,
    time: &str,
    opponent: &str,
    squad: &[(&str, Availability)],
) -> MatchEntity {
    let match_date = parse_match_instant(date, time).expect("fixture scheduling key");
    let squad = squad
        .iter()
        .map(|(member_id, status)| {
            (
                (*member_id).to_owned(),
                AttendanceEntity {
                    push_token: Some(format!("token-{member_id}")),
                    display_name: (*member_id).to_owned(),
                    status: *status,
                },
            )
        })
        .collect();

    MatchEntity {
        id: derive_match_id(date, time, opponent),
        venue: "Victoria Park".to_owned(),
        address: None,
        date: date.to_owned(),
        time: time.to_owned(),
        opponent: opponent.to_owned(),
        status: None,
        match_date,
        created_time: match_date,
        updated_time: match_date,
        squad,
    }
}
