use contacts_core::db::open_db_in_memory;
use contacts_core::{
    Contact, ContactFields, ContactId, ContactRepository, ContactService, CreateContactInput,
    RepoError, RepoResult, ServiceError, SqliteContactRepository, UpdateContactInput,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::rc::Rc;

fn service(conn: &Connection) -> ContactService<SqliteContactRepository<'_>> {
    ContactService::new(SqliteContactRepository::new(conn))
}

#[test]
fn create_assigns_id_and_created_at() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(&CreateContactInput::new("Ada", "ada@example.com", None))
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "Ada");

    let fetched = service.get(created.id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_with_invalid_email_never_touches_the_store() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create(&CreateContactInput::new("Ada", "not-an-email", None))
        .unwrap_err();
    match err {
        ServiceError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "email");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(service.list(None).unwrap().is_empty());
}

#[test]
fn create_with_duplicate_email_conflicts_and_keeps_one_record() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(&CreateContactInput::new("Ada", "ada@example.com", None))
        .unwrap();

    let err = service
        .create(&CreateContactInput::new("Other Ada", "ada@example.com", None))
        .unwrap_err();
    assert_eq!(err, ServiceError::Conflict("ada@example.com".to_string()));

    let stored = service.list(Some("ada@example.com")).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Ada");
}

#[test]
fn get_missing_contact_names_the_id() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn).get(41).unwrap_err();
    assert_eq!(err, ServiceError::NotFound(41));
    assert!(err.to_string().contains("41"));
}

#[test]
fn non_positive_ids_are_bad_input() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let input = UpdateContactInput::new("Ada", "ada@example.com", None);

    assert!(matches!(service.get(0), Err(ServiceError::BadInput(_))));
    assert!(matches!(service.update(-1, &input), Err(ServiceError::BadInput(_))));
    assert!(matches!(service.delete(0), Err(ServiceError::BadInput(_))));
}

#[test]
fn update_replaces_fields_and_keeps_created_at() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create(&CreateContactInput::new("Ada", "ada@example.com", Some("555.123.4567")))
        .unwrap();

    let updated = service
        .update(
            created.id,
            &UpdateContactInput::new("Ada King", "ada@example.com", None),
        )
        .unwrap();
    assert_eq!(updated.name, "Ada King");
    assert_eq!(updated.phone, None);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_with_invalid_phone_leaves_record_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create(&CreateContactInput::new("Ada", "ada@example.com", Some("555.123.4567")))
        .unwrap();

    let err = service
        .update(
            created.id,
            &UpdateContactInput::new("Ada", "ada@example.com", Some("call me maybe")),
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.get(created.id).unwrap(), created);
}

#[test]
fn update_to_taken_email_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service
        .create(&CreateContactInput::new("Ada", "ada@example.com", None))
        .unwrap();
    let grace = service
        .create(&CreateContactInput::new("Grace", "grace@example.com", None))
        .unwrap();

    let err = service
        .update(
            grace.id,
            &UpdateContactInput::new("Grace", "ada@example.com", None),
        )
        .unwrap_err();
    assert_eq!(err, ServiceError::Conflict("ada@example.com".to_string()));
    assert_eq!(service.get(grace.id).unwrap().email, "grace@example.com");
}

#[test]
fn update_missing_contact_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .update(9, &UpdateContactInput::new("Ada", "ada@example.com", None))
        .unwrap_err();
    assert_eq!(err, ServiceError::NotFound(9));
}

#[test]
fn delete_twice_returns_record_then_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .create(&CreateContactInput::new("Ada", "ada@example.com", None))
        .unwrap();

    assert_eq!(service.delete(created.id).unwrap(), created);
    assert_eq!(
        service.delete(created.id).unwrap_err(),
        ServiceError::NotFound(created.id)
    );
}

#[test]
fn find_by_email_returns_none_instead_of_failing() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(service(&conn).find_by_email("nobody@example.com").unwrap(), None);
}

/// Repository whose every call fails like a broken store connection.
struct BrokenRepository {
    calls: Rc<Cell<usize>>,
}

impl BrokenRepository {
    fn fail<T>(&self) -> RepoResult<T> {
        self.calls.set(self.calls.get() + 1);
        Err(RepoError::Db(rusqlite::Error::InvalidQuery))
    }
}

impl ContactRepository for BrokenRepository {
    fn find_all(&self, _search: Option<&str>) -> RepoResult<Vec<Contact>> {
        self.fail()
    }

    fn find_by_id(&self, _id: ContactId) -> RepoResult<Option<Contact>> {
        self.fail()
    }

    fn find_by_email(&self, _email: &str) -> RepoResult<Option<Contact>> {
        self.fail()
    }

    fn insert(&self, _fields: &ContactFields) -> RepoResult<Contact> {
        self.fail()
    }

    fn update_by_id(&self, _id: ContactId, _fields: &ContactFields) -> RepoResult<Contact> {
        self.fail()
    }

    fn delete_by_id(&self, _id: ContactId) -> RepoResult<usize> {
        self.fail()
    }
}

#[test]
fn store_failures_surface_as_generic_persistence_errors() {
    let service = ContactService::new(BrokenRepository {
        calls: Rc::default(),
    });

    assert_eq!(
        service.list(None).unwrap_err(),
        ServiceError::Persistence("Database query failed")
    );
    assert_eq!(
        service.get(1).unwrap_err(),
        ServiceError::Persistence("Database query failed")
    );
    let err = service
        .create(&CreateContactInput::new("Ada", "ada@example.com", None))
        .unwrap_err();
    assert_eq!(err.to_string(), "Database query failed");
    assert_eq!(
        service.delete(5).unwrap_err(),
        ServiceError::Persistence("Database query failed")
    );
}

#[test]
fn invalid_input_is_rejected_before_any_repository_call() {
    let calls = Rc::new(Cell::new(0));
    let service = ContactService::new(BrokenRepository {
        calls: Rc::clone(&calls),
    });

    let err = service.create(&CreateContactInput::default()).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let err = service
        .update(3, &UpdateContactInput::new("", "bad", None))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(calls.get(), 0);
}
