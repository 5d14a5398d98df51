use beatmaker_core::db::migrations::latest_version;
use beatmaker_core::db::{open_db, open_db_in_memory, DbError};
use beatmaker_core::{
    Beat, BeatCandidate, BeatRepository, BeatRules, BeatService, BeatServiceError, NewUser,
    RepoError, SqliteBeatRepository, SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;

fn register(conn: &Connection, username: &str, email: &str) -> User {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&NewUser::new(username, email))
        .unwrap()
}

fn beat(owner: &User, beat_string: &str) -> Beat {
    Beat {
        id: None,
        owner_id: owner.id,
        title: "Groove".to_string(),
        beat_string: beat_string.to_string(),
    }
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(SqliteBeatRepository::try_new(&conn).is_ok());
    assert!(SqliteUserRepository::try_new(&conn).is_ok());
}

#[test]
fn reopening_file_database_keeps_beats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beats.sqlite3");

    let conn = open_db(&path).unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    SqliteBeatRepository::try_new(&conn)
        .unwrap()
        .create_beat(&beat(&owner, ";AB;12:6"))
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let beats = SqliteBeatRepository::try_new(&conn)
        .unwrap()
        .get_all_beats_for_owner(owner.id)
        .unwrap();
    assert_eq!(beats.len(), 1);
    assert_eq!(beats[0].beat_string, ";AB;12:6");
}

#[test]
fn opening_database_with_newer_schema_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteBeatRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));

    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    assert!(matches!(
        SqliteUserRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("users"))
    ));
}

#[test]
fn user_lookup_matches_email_case_insensitively_or_exact_username() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "Magus", "casp@zomr.org");
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let by_email = users.get_user_by_email_or_username("CASP@zomr.org").unwrap();
    assert_eq!(by_email, Some(owner.clone()));
    let by_username = users.get_user_by_email_or_username("Magus").unwrap();
    assert_eq!(by_username, Some(owner));
    assert_eq!(users.get_user_by_email_or_username("magus").unwrap(), None);
}

#[test]
fn duplicate_user_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "anders", "anders@zomf.org");
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let err = users
        .create_user(&NewUser::new("anders2", "ANDERS@zomf.org"))
        .unwrap_err();
    assert!(matches!(err, RepoError::UserConflict(_)));

    let err = users.create_user(&NewUser::new(" ", "x@y.org")).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn update_and_delete_are_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    let intruder = register(&conn, "anders", "anders@zomf.org");
    let repo = SqliteBeatRepository::try_new(&conn).unwrap();

    let stored = repo.create_beat(&beat(&owner, "AB12:6")).unwrap();
    let id = stored.id.unwrap();

    let hijack = Beat {
        owner_id: intruder.id,
        ..stored.clone()
    };
    assert!(matches!(repo.update_beat(&hijack), Err(RepoError::NotFound(missing)) if missing == id));
    assert!(matches!(repo.delete_beat(&hijack), Err(RepoError::NotFound(_))));

    let mut replaced = stored.clone();
    replaced.beat_string = "ZZ:52".to_string();
    replaced.title = "Faster".to_string();
    repo.update_beat(&replaced).unwrap();
    assert_eq!(repo.get_all_beats_for_owner(owner.id).unwrap(), vec![replaced.clone()]);

    repo.delete_beat(&replaced).unwrap();
    assert!(repo.get_all_beats_for_owner(owner.id).unwrap().is_empty());
}

#[test]
fn update_without_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    let repo = SqliteBeatRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.update_beat(&beat(&owner, "AB12:6")),
        Err(RepoError::MissingId)
    ));
}

#[test]
fn deleting_user_cascades_to_beats() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    let bystander = register(&conn, "anders", "anders@zomf.org");
    let repo = SqliteBeatRepository::try_new(&conn).unwrap();
    repo.create_beat(&beat(&owner, "AB12:6")).unwrap();
    repo.create_beat(&beat(&bystander, "Z:26")).unwrap();

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    users.delete_user("CASPER@example.org").unwrap();

    assert_eq!(users.get_user_by_email_or_username("casper").unwrap(), None);
    assert!(repo.get_all_beats_for_owner(owner.id).unwrap().is_empty());
    assert_eq!(repo.get_all_beats_for_owner(bystander.id).unwrap().len(), 1);

    let err = users.delete_user("casper").unwrap_err();
    assert!(matches!(err, RepoError::UserNotFound(ref key) if key == "casper"));
}

#[test]
fn update_user_replaces_identity_and_keeps_beats() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    register(&conn, "anders", "anders@zomf.org");
    SqliteBeatRepository::try_new(&conn)
        .unwrap()
        .create_beat(&beat(&owner, "AB12:6"))
        .unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let renamed = users
        .update_user(&User {
            username: " casp ".to_string(),
            email: "casp@zomr.org".to_string(),
            ..owner.clone()
        })
        .unwrap();
    assert_eq!(renamed.username, "casp");
    assert_eq!(
        users.get_user_by_email_or_username("casp@zomr.org").unwrap(),
        Some(renamed.clone())
    );
    assert_eq!(users.get_user_by_email_or_username("casper").unwrap(), None);

    let service = BeatService::new(
        SqliteBeatRepository::try_new(&conn).unwrap(),
        &users,
        BeatRules,
    );
    assert_eq!(service.list_beats_for_user("casp").unwrap().len(), 1);

    let taken = users
        .update_user(&User {
            email: "anders@zomf.org".to_string(),
            ..renamed.clone()
        })
        .unwrap_err();
    assert!(matches!(taken, RepoError::UserConflict(_)));

    let ghost = users
        .update_user(&User {
            id: 999,
            ..renamed
        })
        .unwrap_err();
    assert!(matches!(ghost, RepoError::UserNotFound(_)));
}

#[test]
fn usernames_and_emails_cannot_shadow_each_other() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let squatting = users
        .create_user(&NewUser::new("victim@example.org", "squatter@example.org"))
        .unwrap_err();
    assert!(matches!(squatting, RepoError::InvalidData(_)));

    let no_at_email = users
        .create_user(&NewUser::new("squatter", "victim"))
        .unwrap_err();
    assert!(matches!(no_at_email, RepoError::InvalidData(_)));
}

#[test]
fn email_match_outranks_username_match_in_lookup() {
    let conn = open_db_in_memory().unwrap();
    // rows written before usernames were restricted
    conn.execute(
        "INSERT INTO users (username, email) VALUES ('victim@example.org', 'squatter@example.org');",
        [],
    )
    .unwrap();
    let squatter_id = conn.last_insert_rowid();
    let victim = register(&conn, "victim", "victim@example.org");
    assert!(victim.id > squatter_id);

    let service = BeatService::new(
        SqliteBeatRepository::try_new(&conn).unwrap(),
        SqliteUserRepository::try_new(&conn).unwrap(),
        BeatRules,
    );
    let created = service
        .create_beat(&BeatCandidate::new("Groove", "AB12:6", "victim@example.org"))
        .unwrap();

    assert_eq!(created.owner_id, victim.id);
    assert_eq!(service.list_beats_for_user("victim").unwrap(), vec![created]);
}

#[test]
fn service_end_to_end_over_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let owner = register(&conn, "casper", "casper@example.org");
    let service = BeatService::new(
        SqliteBeatRepository::try_new(&conn).unwrap(),
        SqliteUserRepository::try_new(&conn).unwrap(),
        BeatRules,
    );

    let created = service
        .create_beat(&BeatCandidate::new("Groove", "AB12:6", "casper@example.org"))
        .unwrap();
    assert_eq!(created.owner_id, owner.id);
    let id = created.id.unwrap();

    let corrupted = service
        .update_beat(&BeatCandidate::new("Groove", "AB12:7", "casper").with_id(id))
        .unwrap_err();
    assert!(matches!(corrupted, BeatServiceError::Integrity(_)));

    let updated = service
        .update_beat(&BeatCandidate::new("Groove v2", "A;B;1;2;Z:32", "casper").with_id(id))
        .unwrap();
    assert_eq!(updated.beat_string, "A;B;1;2;Z:32");

    let listed = service.list_beats_for_user("casper@example.org").unwrap();
    assert_eq!(listed, vec![updated]);

    // delete needs identity only; the stale payload is never checked
    service
        .delete_beat(&BeatCandidate::new("Groove", "garbage", "casper").with_id(id))
        .unwrap();
    assert!(service.list_beats_for_user("casper").unwrap().is_empty());

    let missing = service.list_beats_for_user("unknown@x.com").unwrap_err();
    assert!(matches!(missing, BeatServiceError::OwnerNotFound(_)));
}
