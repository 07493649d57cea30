//! Record store behaviour against a real backend.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use common::AppError;
use domain::{
    CreateUser, HistoryItemUpdate, NewHistoryItem, NewMessage, PaymentStatus, ProfileUpdate,
    UpdateUser, UserRole, STORAGE_KEY,
};
use record_store_lib::{FileStore, KeyValueStore, MemoryStore, RecordStore};

fn seeded_store() -> (RecordStore, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let store = RecordStore::open(storage.clone()).unwrap();
    (store, storage)
}

fn new_resident(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        password: "clave".to_string(),
        role: UserRole::Resident,
        name: username.to_string(),
    }
}

fn resident_says(text: &str) -> NewMessage {
    NewMessage {
        from: UserRole::Resident,
        text: text.to_string(),
    }
}

#[test]
fn test_seed_scenario() {
    let (store, _) = seeded_store();

    let users = store.list_users().unwrap();
    assert_eq!(users.len(), 7);
    assert_eq!(users.iter().filter(|u| u.role == UserRole::Admin).count(), 1);

    for resident in store.list_residents().unwrap() {
        let profile = store.get_profile(&resident.id).unwrap().unwrap();
        let expected = if resident.id == "u2" {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };
        assert_eq!(profile.payment_status, expected, "resident {}", resident.id);
        assert_eq!(profile.messages.len(), 1);
    }
    assert!(store.get_profile("u1").unwrap().is_none());
}

#[test]
fn test_initialize_is_idempotent() {
    let (store, storage) = seeded_store();
    let first = storage.get(STORAGE_KEY).unwrap();

    assert!(!store.initialize_if_absent().unwrap());
    assert_eq!(storage.get(STORAGE_KEY).unwrap(), first);
}

#[test]
fn test_duplicate_username_leaves_blob_unchanged() {
    let (store, storage) = seeded_store();
    store.create_user(new_resident("Torre-B")).unwrap();
    let before = storage.get(STORAGE_KEY).unwrap();

    let result = store.create_user(new_resident("Torre-B"));

    assert!(matches!(result, Err(AppError::DuplicateUsername(ref n)) if n == "Torre-B"));
    assert_eq!(storage.get(STORAGE_KEY).unwrap(), before);
}

#[test]
fn test_usernames_are_case_sensitive() {
    let (store, _) = seeded_store();

    assert!(store.create_user(new_resident("ADMIN")).is_ok());
    assert!(store.create_user(new_resident("admin")).is_err());

    let users = store.list_users().unwrap();
    let mut names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), users.len());
}

#[test]
fn test_create_resident_gets_default_profile() {
    let (store, _) = seeded_store();
    let user = store.create_user(new_resident("Torre-C")).unwrap();

    assert!(user.id.starts_with('u'));
    assert!(user.verify_password("clave"));
    assert_eq!(store.list_users().unwrap().last().unwrap().id, user.id);

    let profile = store.get_profile(&user.id).unwrap().unwrap();
    let today = Utc::now().date_naive();
    assert_eq!(profile.payment_status, PaymentStatus::Pending);
    assert_eq!(profile.internet_speed, 150);
    assert_eq!(profile.next_payment_date.day(), 5);
    assert!(profile.next_payment_date > today);
    assert_eq!(profile.messages.len(), 1);
    assert_eq!(profile.payment_history.len(), 2);
}

#[test]
fn test_create_admin_has_no_profile() {
    let (store, _) = seeded_store();
    let admin = store
        .create_user(CreateUser {
            username: "admin2".into(),
            password: "x".into(),
            role: UserRole::Admin,
            name: "Otra Admin".into(),
        })
        .unwrap();

    assert!(store.get_profile(&admin.id).unwrap().is_none());
    assert_eq!(store.find_user_by_username("admin2").unwrap().unwrap().id, admin.id);
}

#[test]
fn test_update_user_merges() {
    let (store, _) = seeded_store();
    let updated = store
        .update_user(
            "d2",
            UpdateUser {
                username: Some("Depto-2".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.username, "Depto-2");
    assert_eq!(updated.name, "Departamento 2");
    assert!(updated.verify_password("123"));
    assert!(store.find_user_by_username("Departamento2").unwrap().is_none());
}

#[test]
fn test_update_user_password_is_rehashed() {
    let (store, _) = seeded_store();
    store
        .update_user(
            "d3",
            UpdateUser {
                password: Some("nueva".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let user = store.find_user_by_id("d3").unwrap().unwrap();
    assert!(user.verify_password("nueva"));
    assert!(!user.verify_password("123"));
}

#[test]
fn test_delete_cascades_to_profile() {
    let (store, _) = seeded_store();

    assert!(store.delete_user("d4").unwrap());
    assert!(store.get_profile("d4").unwrap().is_none());
    assert!(store.find_user_by_id("d4").unwrap().is_none());
    assert_eq!(store.list_users().unwrap().len(), 6);
    assert!(!store.delete_user("d4").unwrap());
}

#[test]
fn test_status_sync_for_every_status() {
    let (store, _) = seeded_store();

    for status in [
        PaymentStatus::Overdue,
        PaymentStatus::Paid,
        PaymentStatus::Pending,
        PaymentStatus::Pending,
    ] {
        store
            .update_profile(
                "d1",
                ProfileUpdate {
                    payment_status: Some(status),
                    ..Default::default()
                },
            )
            .unwrap();
        let profile = store.get_profile("d1").unwrap().unwrap();
        assert_eq!(profile.payment_history.last().unwrap().status, status);
        assert_eq!(profile.payment_history[0].status, PaymentStatus::Paid);
    }
}

#[test]
fn test_update_profile_changes_only_given_field() {
    let (store, _) = seeded_store();
    let before = store.get_profile("u2").unwrap().unwrap();

    let after = store
        .update_profile(
            "u2",
            ProfileUpdate {
                wifi_ssid: Some("Torre_A_5G".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(after.wifi_ssid, "Torre_A_5G");
    let mut restored = after.clone();
    restored.wifi_ssid = before.wifi_ssid.clone();
    assert_eq!(restored, before);
}

#[test]
fn test_store_does_not_bound_speed() {
    let (store, _) = seeded_store();
    let profile = store
        .update_profile(
            "d5",
            ProfileUpdate {
                internet_speed: Some(1000),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(profile.internet_speed, 1000);
}

#[test]
fn test_reads_are_idempotent() {
    let (store, _) = seeded_store();

    assert_eq!(store.list_users().unwrap(), store.list_users().unwrap());
    assert_eq!(store.get_profile("d1").unwrap(), store.get_profile("d1").unwrap());
    assert_eq!(store.read_all().unwrap(), store.read_all().unwrap());
}

#[test]
fn test_malformed_blob_serves_one_stable_seed() {
    let storage = Arc::new(MemoryStore::new());
    storage.set(STORAGE_KEY, "not json").unwrap();
    let store = RecordStore::new(storage.clone());

    let first = store.get_profile("d1").unwrap().unwrap();
    assert_eq!(store.get_profile("d1").unwrap().unwrap(), first);
    assert_eq!(store.read_all().unwrap(), store.read_all().unwrap());

    // Ids from an earlier read still address the same rows
    let paid = first.payment_history[0].id;
    let updated = store
        .update_history_item(
            "d1",
            paid,
            HistoryItemUpdate {
                amount: Some("$3,000.00".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, paid);

    let pending = first.payment_history[1].id;
    assert!(store.delete_history_item("d1", pending).unwrap());

    let history = store.get_profile("d1").unwrap().unwrap().payment_history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, paid);
    assert_eq!(history[0].amount, "$3,000.00");
}

#[test]
fn test_missing_blob_serves_one_stable_seed() {
    let storage = Arc::new(MemoryStore::new());
    let store = RecordStore::new(storage.clone());

    let first = store.get_profile("d1").unwrap().unwrap();
    assert_eq!(store.get_profile("d1").unwrap().unwrap(), first);
    assert_eq!(store.list_users().unwrap(), store.list_users().unwrap());
    assert!(storage.get(STORAGE_KEY).unwrap().is_none());

    let item = first.payment_history[0].id;
    assert!(store.delete_history_item("d1", item).unwrap());

    assert!(storage.get(STORAGE_KEY).unwrap().is_some());
    let history = store.get_profile("d1").unwrap().unwrap().payment_history;
    assert_eq!(history[..], first.payment_history[1..]);
}

#[test]
fn test_delete_orphan_profile_reports_removal() {
    let (store, storage) = seeded_store();
    let mut db = store.read_all().unwrap();
    db.users.retain(|u| u.id != "d1");
    storage.set(STORAGE_KEY, &db.to_json().unwrap()).unwrap();

    assert!(store.delete_user("d1").unwrap());
    assert!(store.get_profile("d1").unwrap().is_none());
    assert!(!store.delete_user("d1").unwrap());
}

#[test]
fn test_messaging_round_trip() {
    let (store, _) = seeded_store();

    let sent = store.add_message("d1", resident_says("hola")).unwrap().unwrap();
    let profile = store.get_profile("d1").unwrap().unwrap();
    let stored = profile.messages.iter().find(|m| m.id == sent.id).unwrap();
    assert!(!stored.read);
    assert_eq!(stored.text, "hola");
    assert_eq!(profile.messages.len(), 2);

    assert_eq!(store.mark_messages_read("d1").unwrap(), 1);
    let profile = store.get_profile("d1").unwrap().unwrap();
    let stored = profile.messages.iter().find(|m| m.id == sent.id).unwrap();
    assert!(stored.read);
}

#[test]
fn test_mark_read_never_flips_admin_messages() {
    let (store, _) = seeded_store();
    store
        .add_message(
            "d1",
            NewMessage {
                from: UserRole::Admin,
                text: "su pago fue recibido".into(),
            },
        )
        .unwrap();
    store.add_message("d1", resident_says("gracias")).unwrap();

    store.mark_messages_read("d1").unwrap();

    let profile = store.get_profile("d1").unwrap().unwrap();
    for message in &profile.messages {
        assert_eq!(message.read, message.from == UserRole::Resident);
    }
}

#[test]
fn test_messages_keep_append_order() {
    let (store, _) = seeded_store();
    for text in ["uno", "dos", "tres"] {
        store.add_message("d2", resident_says(text)).unwrap();
    }

    let texts: Vec<_> = store
        .get_profile("d2")
        .unwrap()
        .unwrap()
        .messages
        .into_iter()
        .skip(1)
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, vec!["uno", "dos", "tres"]);
}

#[test]
fn test_history_edit_scenario() {
    let (store, _) = seeded_store();
    let added = store
        .add_history_item(
            "d1",
            NewHistoryItem {
                period: "febrero 2026".into(),
                date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                amount: "$2,500.00".into(),
                status: PaymentStatus::Pending,
            },
        )
        .unwrap()
        .unwrap();

    let updated = store
        .update_history_item(
            "d1",
            added.id,
            HistoryItemUpdate {
                amount: Some("$2,750.00".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, "$2,750.00");
    assert_eq!(updated.period, added.period);
    assert_eq!(updated.date, added.date);
    assert_eq!(updated.status, added.status);

    let before = store.get_profile("d1").unwrap().unwrap().payment_history;
    assert!(store.delete_history_item("d1", added.id).unwrap());
    let after = store.get_profile("d1").unwrap().unwrap().payment_history;

    assert_eq!(after.len(), before.len() - 1);
    assert!(after.iter().all(|h| h.id != added.id));
    assert_eq!(after[..], before[..before.len() - 1]);
}

#[test]
fn test_update_unknown_history_item_is_noop() {
    let (store, _) = seeded_store();
    let before = store.get_profile("d1").unwrap();

    let result = store
        .update_history_item("d1", Uuid::new_v4(), HistoryItemUpdate::default())
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.get_profile("d1").unwrap(), before);
}

#[test]
fn test_file_backend_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    let store = RecordStore::open(storage).unwrap();
    store.add_message("d3", resident_says("persistente")).unwrap();

    let reopened = RecordStore::open(Arc::new(FileStore::new(dir.path()))).unwrap();
    let profile = reopened.get_profile("d3").unwrap().unwrap();
    assert_eq!(profile.messages.last().unwrap().text, "persistente");
}

#[test]
fn test_interleaved_writers_last_writer_wins() {
    let storage = Arc::new(MemoryStore::new());
    let admin_side = RecordStore::open(storage.clone()).unwrap();
    let resident_side = RecordStore::new(storage);

    admin_side
        .update_profile(
            "u2",
            ProfileUpdate {
                internet_speed: Some(50),
                ..Default::default()
            },
        )
        .unwrap();
    resident_side
        .update_profile(
            "u2",
            ProfileUpdate {
                alias: Some("Casa Perez".into()),
                ..Default::default()
            },
        )
        .unwrap();

    // Each call is its own read-modify-write, so both edits survive.
    let profile = admin_side.get_profile("u2").unwrap().unwrap();
    assert_eq!(profile.internet_speed, 50);
    assert_eq!(profile.alias, "Casa Perez");
}
