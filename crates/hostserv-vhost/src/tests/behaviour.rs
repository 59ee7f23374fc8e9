//! Behaviour-driven tests for vhost assignment and listing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::directory::{AccountName, MemoryDirectory};
use crate::engine::{Assignment, Clearance, VhostEngine, VhostMatch};
use crate::error::VhostError;
use crate::metadata::MemoryVhostStore;
use crate::propagation::{ChannelSink, HostUpdate, SessionConnect, SessionId, SessionTable};

use super::RecordingAuditSink;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

enum Outcome {
    Assigned(Assignment),
    Cleared(Clearance),
    Failed(VhostError),
}

struct TestWorld {
    engine: VhostEngine<MemoryDirectory, MemoryVhostStore>,
    sessions: Arc<SessionTable>,
    updates: Receiver<HostUpdate>,
    audit: Arc<RecordingAuditSink>,
    connected: HashMap<String, (AccountName, SessionId)>,
    outcome: Option<Outcome>,
    listing: Vec<VhostMatch>,
}

impl Default for TestWorld {
    fn default() -> Self {
        let sessions = Arc::new(SessionTable::new());
        let (sender, updates) = mpsc::channel();
        let audit = Arc::new(RecordingAuditSink::default());
        let engine = VhostEngine::new(MemoryDirectory::new(), MemoryVhostStore::new())
            .with_sessions(sessions.clone(), Arc::new(ChannelSink::new(sender)))
            .with_audit(audit.clone());
        Self {
            engine,
            sessions,
            updates,
            audit,
            connected: HashMap::new(),
            outcome: None,
            listing: Vec::new(),
        }
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn natural_host(nickname: &str) -> String {
    format!("{nickname}.users.example")
}

fn shown(world: &TestWorld, nickname: &str) -> String {
    world.sessions.drain(&world.updates);
    let (_, id) = world
        .connected
        .get(nickname)
        .unwrap_or_else(|| panic!("no session connected as {nickname}"));
    world
        .sessions
        .displayed_host(*id)
        .expect("session is still connected")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an account \"{account}\" with nickname \"{nickname}\"")]
fn given_account(world: &mut TestWorld, account: String, nickname: String) {
    let directory = world.engine.directory_mut();
    directory.register_account(&account).expect("register account");
    directory
        .register_nickname(&account, &account)
        .expect("primary nickname");
    directory
        .register_nickname(&account, &nickname)
        .expect("grouped nickname");
}

#[given("the nickname \"{nickname}\" overrides its vhost with \"{host}\"")]
fn given_nickname_override(world: &mut TestWorld, nickname: String, host: String) {
    world.engine.store().set_nickname_vhost(&nickname, host);
}

#[given("a session of \"{account}\" connected as \"{nickname}\"")]
fn given_session(world: &mut TestWorld, account: String, nickname: String) {
    let account = AccountName::new(account);
    let display = world.engine.display_host(&account, &nickname);
    let id = world.sessions.connect(SessionConnect::new(
        account.clone(),
        nickname.as_str(),
        natural_host(&nickname),
        display,
    ));
    world.connected.insert(nickname, (account, id));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the operator \"{operator}\" assigns \"{host}\" to \"{target}\"")]
fn when_assign(world: &mut TestWorld, operator: String, host: String, target: String) {
    world.outcome = Some(
        match world.engine.assign_vhost(&target, &host, &operator) {
            Ok(assignment) => Outcome::Assigned(assignment),
            Err(error) => Outcome::Failed(error),
        },
    );
}

#[when("the operator \"{operator}\" clears the vhost of \"{target}\"")]
fn when_clear(world: &mut TestWorld, operator: String, target: String) {
    world.outcome = Some(match world.engine.clear_vhost(&target, &operator) {
        Ok(clearance) => Outcome::Cleared(clearance),
        Err(error) => Outcome::Failed(error),
    });
}

#[when("vhosts matching \"{pattern}\" are listed")]
fn when_listed(world: &mut TestWorld, pattern: String) {
    world.listing = world.engine.list_vhosts(&pattern).collect();
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("every session of \"{account}\" shows \"{host}\"")]
fn then_every_session_shows(world: &mut TestWorld, account: String, host: String) {
    let key = AccountName::new(account).key();
    let nicknames: Vec<String> = world
        .connected
        .iter()
        .filter(|(_, (owner, _))| owner.key() == key)
        .map(|(nickname, _)| nickname.clone())
        .collect();
    assert!(!nicknames.is_empty(), "no sessions connected");
    for nickname in nicknames {
        assert_eq!(shown(world, &nickname), host, "session {nickname}");
    }
}

#[then("the session \"{nickname}\" shows \"{host}\"")]
fn then_session_shows(world: &mut TestWorld, nickname: String, host: String) {
    assert_eq!(shown(world, &nickname), host);
}

#[then("the session \"{nickname}\" shows its natural host")]
fn then_session_natural(world: &mut TestWorld, nickname: String) {
    assert_eq!(shown(world, &nickname), natural_host(&nickname));
}

#[then("the audit log records \"{kind}\" by \"{actor}\"")]
fn then_audited(world: &mut TestWorld, kind: String, actor: String) {
    let events = world.audit.events();
    assert!(
        events
            .iter()
            .any(|event| event.kind() == kind && event.actor() == actor),
        "expected {kind} by {actor}, got: {events:?}",
    );
}

#[then("nothing is audited")]
fn then_nothing_audited(world: &mut TestWorld) {
    assert!(world.audit.events().is_empty());
}

#[then("the operation fails with \"{kind}\"")]
fn then_fails(world: &mut TestWorld, kind: String) {
    match world.outcome.as_ref().expect("an operation ran") {
        Outcome::Failed(error) => assert_eq!(error.kind(), kind),
        Outcome::Assigned(assignment) => panic!("expected failure, assigned {assignment:?}"),
        Outcome::Cleared(clearance) => panic!("expected failure, cleared {clearance:?}"),
    }
}

#[then("the listing contains {count} entries")]
fn then_listing_count(world: &mut TestWorld, count: usize) {
    assert_eq!(world.listing.len(), count, "listing: {:?}", world.listing);
}

#[then("the listing includes \"{name}\" with \"{host}\"")]
fn then_listing_includes(world: &mut TestWorld, name: String, host: String) {
    assert!(
        world
            .listing
            .iter()
            .any(|entry| entry.display_name() == name && entry.host() == host),
        "listing: {:?}",
        world.listing,
    );
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/vhost_assignment.feature",
    name = "Assigning a vhost updates every session of the account"
)]
fn assignment_fans_out(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_assignment.feature",
    name = "A nickname override outlives the account vhost"
)]
fn nickname_override_outlives_account_vhost(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_assignment.feature",
    name = "Clearing an account without a vhost is harmless"
)]
fn clearing_without_vhost(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_assignment.feature",
    name = "Assigning to an unknown target fails"
)]
fn unknown_target_fails(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_assignment.feature",
    name = "An invalid host is refused"
)]
fn invalid_host_refused(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_listing.feature",
    name = "Listing an empty directory yields no matches"
)]
fn empty_directory_listing(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_listing.feature",
    name = "Pattern metacharacters other than wildcards match literally"
)]
fn metacharacters_match_literally(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/vhost_listing.feature",
    name = "Wildcards select matching accounts and nicknames"
)]
fn wildcards_select_matches(world: TestWorld) {
    let _ = world;
}
