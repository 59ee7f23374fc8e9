//! Unit tests for the typed vhost store.

use rstest::{fixture, rstest};
use time::macros::datetime;

use super::*;

#[fixture]
fn alice() -> AccountName {
    AccountName::new("alice")
}

fn vhost(host: &str, assigner: &str) -> AccountVhost {
    AccountVhost::new(
        host,
        Provenance::recorded(datetime!(2024-03-01 12:00 UTC), assigner),
    )
}

#[rstest]
fn missing_vhost_reads_as_none(alice: AccountName) {
    let store = MemoryVhostStore::new();
    assert!(store.account_vhost(&alice).is_none());
}

#[rstest]
fn store_replaces_the_whole_value(alice: AccountName) {
    let store = MemoryVhostStore::new();
    store.store_account_vhost(&alice, vhost("a.example", "oper1"));
    store.store_account_vhost(&alice, vhost("b.example", "oper2"));

    let current = store.account_vhost(&alice).expect("vhost present");
    assert_eq!(current.host(), "b.example");
    assert_eq!(current.provenance().assigner(), Some("oper2"));
    assert_eq!(store.account_vhost_count(), 1);
}

#[rstest]
fn lookups_fold_account_case(alice: AccountName) {
    let store = MemoryVhostStore::new();
    store.store_account_vhost(&alice, vhost("a.example", "oper"));
    assert!(store.account_vhost(&AccountName::new("ALICE")).is_some());
}

#[rstest]
fn remove_returns_previous_value(alice: AccountName) {
    let store = MemoryVhostStore::new();
    store.store_account_vhost(&alice, vhost("a.example", "oper"));

    let previous = store.remove_account_vhost(&alice).expect("previous value");
    assert_eq!(previous.host(), "a.example");
    assert!(store.account_vhost(&alice).is_none());
    assert!(store.remove_account_vhost(&alice).is_none());
}

#[rstest]
fn account_writes_leave_nickname_overrides_alone(alice: AccountName) {
    let store = MemoryVhostStore::new();
    store.set_nickname_vhost("alice2", "b.example");
    store.store_account_vhost(&alice, vhost("a.example", "oper"));
    store.remove_account_vhost(&alice);

    assert_eq!(store.nickname_vhost("Alice2").as_deref(), Some("b.example"));
}

#[test]
fn nickname_override_can_be_removed() {
    let store = MemoryVhostStore::new();
    store.set_nickname_vhost("bob", "bob.example");
    assert_eq!(store.remove_nickname_vhost("BOB").as_deref(), Some("bob.example"));
    assert!(store.nickname_vhost("bob").is_none());
}

#[test]
fn provenance_reports_whether_anything_was_recorded() {
    assert!(!Provenance::default().is_recorded());
    assert!(Provenance::from_parts(None, Some("oper".into())).is_recorded());
    let full = Provenance::recorded(datetime!(2024-03-01 12:00 UTC), "oper");
    assert_eq!(full.assigned_at(), Some(datetime!(2024-03-01 12:00 UTC)));
}
