mod common;

use common::{add_contact, RecordingTransport};
use roster_core::db::open_db_in_memory;
use roster_core::{
    ContactStatus, MailMergeError, MailMergeRequest, MailMergeService, SqliteContactRepository,
    SqliteOutbox, SqliteTemplateRepository, TagMatchMode,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> MailMergeService<SqliteContactRepository<'_>, SqliteTemplateRepository<'_>> {
    MailMergeService::new(
        SqliteContactRepository::new(conn),
        SqliteTemplateRepository::new(conn),
        TagMatchMode::Substring,
    )
}

fn request(tags: &[&str], subject: &str, body: &str) -> MailMergeRequest {
    MailMergeRequest {
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        subject: subject.to_string(),
        body: body.to_string(),
    }
}

#[test]
fn youth_leader_merge_renders_name_for_single_recipient() {
    let conn = open_db_in_memory().unwrap();
    add_contact(
        &conn,
        "Maria Santos",
        "m.santos@familyfed.org",
        "youth-leader,massachusetts",
        ContactStatus::Active,
    );
    add_contact(
        &conn,
        "Paul Kim",
        "p.kim@x.org",
        "pastor",
        ContactStatus::Active,
    );

    let mut transport = RecordingTransport::default();
    let report = service(&conn)
        .send_mail_merge(
            &mut transport,
            &request(
                &["youth-leader"],
                "Camp",
                "Hi {{Full Name}}, see you at camp.",
            ),
        )
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.summary(), "Sent 1 emails.");
    assert_eq!(transport.sent.len(), 1);
    assert_eq!(transport.sent[0].to, "m.santos@familyfed.org");
    assert_eq!(transport.sent[0].subject, "Camp");
    assert_eq!(
        transport.sent[0].html_body,
        "Hi Maria Santos, see you at camp."
    );
    assert_eq!(transport.sent[0].run_id, report.run_id);
}

#[test]
fn contact_matching_several_tags_is_sent_once() {
    let conn = open_db_in_memory().unwrap();
    add_contact(
        &conn,
        "A",
        "a@x.org",
        "pastor,maine",
        ContactStatus::Active,
    );
    add_contact(&conn, "B", "b@x.org", "maine", ContactStatus::Active);

    let mut transport = RecordingTransport::default();
    let report = service(&conn)
        .send_mail_merge(
            &mut transport,
            &request(&["pastor", "maine"], "S", "{{Email}}"),
        )
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(transport.recipients(), vec!["a@x.org", "b@x.org"]);
    assert_eq!(transport.sent[0].html_body, "a@x.org");
}

#[test]
fn inactive_and_transitioning_contacts_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "pastor", ContactStatus::Inactive);
    add_contact(
        &conn,
        "B",
        "b@x.org",
        "pastor",
        ContactStatus::Transitioning,
    );

    let mut transport = RecordingTransport::default();
    let report = service(&conn)
        .send_mail_merge(&mut transport, &request(&["pastor"], "S", "B"))
        .unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(report.summary(), "Sent 0 emails.");
    assert!(transport.sent.is_empty());
}

#[test]
fn failed_recipient_does_not_stop_the_batch() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "pastor", ContactStatus::Active);
    add_contact(&conn, "B", "b@x.org", "pastor", ContactStatus::Active);
    add_contact(&conn, "C", "c@x.org", "pastor", ContactStatus::Active);

    let mut transport = RecordingTransport::rejecting(&["b@x.org"]);
    let report = service(&conn)
        .send_mail_merge(&mut transport, &request(&["pastor"], "S", "Hello"))
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].email, "b@x.org");
    assert_eq!(report.summary(), "Sent 2 emails, 1 failed.");
    assert_eq!(transport.recipients(), vec!["a@x.org", "c@x.org"]);
}

#[test]
fn blank_tag_list_is_rejected_before_sending() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "pastor", ContactStatus::Active);

    let mut transport = RecordingTransport::default();
    let err = service(&conn)
        .send_mail_merge(&mut transport, &request(&[" ", ""], "S", "B"))
        .unwrap_err();

    assert!(matches!(err, MailMergeError::NoTargetTags));
    assert!(transport.sent.is_empty());
}

#[test]
fn exact_match_mode_ignores_tag_substrings() {
    let conn = open_db_in_memory().unwrap();
    add_contact(
        &conn,
        "A",
        "a@x.org",
        "pastor-emeritus",
        ContactStatus::Active,
    );
    add_contact(&conn, "B", "b@x.org", "pastor", ContactStatus::Active);

    let service = MailMergeService::new(
        SqliteContactRepository::new(&conn),
        SqliteTemplateRepository::new(&conn),
        TagMatchMode::Exact,
    );
    let mut transport = RecordingTransport::default();
    service
        .send_mail_merge(&mut transport, &request(&["pastor"], "S", "B"))
        .unwrap();

    assert_eq!(transport.recipients(), vec!["b@x.org"]);
}

#[test]
fn templates_upsert_by_name_and_list_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .save_template("Welcome", "Hi", "Welcome {{Full Name}}")
        .unwrap();
    service.save_template("Camp", "Camp", "See you").unwrap();
    service
        .save_template(" Welcome ", "Hello again", "Welcome back")
        .unwrap();

    let templates = service.list_templates().unwrap();
    let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Welcome", "Camp"]);

    let welcome = service.get_template("Welcome").unwrap().unwrap();
    assert_eq!(welcome.subject, "Hello again");
    assert_eq!(welcome.body, "Welcome back");
    assert!(service.get_template("Missing").unwrap().is_none());
    assert!(matches!(
        service.save_template("  ", "S", "B"),
        Err(MailMergeError::BlankTemplateName)
    ));
}

#[test]
fn template_merge_uses_stored_subject_and_body() {
    let conn = open_db_in_memory().unwrap();
    add_contact(
        &conn,
        "Ana Lima",
        "ana@x.org",
        "board-member",
        ContactStatus::Active,
    );
    let service = service(&conn);
    service
        .save_template("Board", "Board notice", "Dear {{ Full Name }}")
        .unwrap();

    let mut transport = RecordingTransport::default();
    let report = service
        .send_template_merge(&mut transport, "Board", vec!["board-member".to_string()])
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(transport.sent[0].subject, "Board notice");
    assert_eq!(transport.sent[0].html_body, "Dear Ana Lima");

    let err = service
        .send_template_merge(&mut transport, "Nope", vec!["board-member".to_string()])
        .unwrap_err();
    assert!(matches!(err, MailMergeError::TemplateNotFound(name) if name == "Nope"));
}

#[test]
fn outbox_transport_queues_messages_per_run() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "pastor", ContactStatus::Active);
    add_contact(
        &conn,
        "B",
        "not-an-address",
        "pastor",
        ContactStatus::Active,
    );

    let mut outbox = SqliteOutbox::new(&conn);
    let report = service(&conn)
        .send_mail_merge(&mut outbox, &request(&["pastor"], "S", "Hi {{Full Name}}"))
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed(), 1);
    let queued = outbox.list_queued(Some(report.run_id)).unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].recipient, "a@x.org");
    assert_eq!(queued[0].html_body, "Hi A");
    let other_run = outbox.list_queued(Some(uuid::Uuid::new_v4())).unwrap();
    assert!(other_run.is_empty());
}
