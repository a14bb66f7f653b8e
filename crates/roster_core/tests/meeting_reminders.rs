mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{add_contact, RecordingTransport};
use roster_core::db::open_db_in_memory;
use roster_core::{
    ContactStatus, NewReminder, Recurrence, ReminderService, ReminderServiceError, ReminderSettings,
    ReminderState, ReminderValidationError, SqliteContactRepository, SqliteReminderRepository,
};
use rusqlite::Connection;

type Service<'conn> =
    ReminderService<SqliteReminderRepository<'conn>, SqliteContactRepository<'conn>>;

fn service(conn: &Connection) -> Service<'_> {
    ReminderService::new(
        SqliteReminderRepository::new(conn),
        SqliteContactRepository::new(conn),
        ReminderSettings::default(),
    )
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn reminder(
    name: &str,
    next_fire: NaiveDateTime,
    recurrence: Recurrence,
    tags: &[&str],
) -> NewReminder {
    NewReminder {
        meeting_name: name.to_string(),
        next_fire,
        recurrence,
        recipient_tags: tags.iter().map(|tag| tag.to_string()).collect(),
        message: "Agenda attached.".to_string(),
    }
}

#[test]
fn weekly_board_call_fires_once_and_advances_seven_days() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "board-member", ContactStatus::Active);
    add_contact(
        &conn,
        "B",
        "b@x.org",
        "board-member,pastor",
        ContactStatus::Active,
    );
    add_contact(
        &conn,
        "C",
        "c@x.org",
        "board-member",
        ContactStatus::Inactive,
    );

    let service = service(&conn);
    let yesterday = at(2024, 5, 6, 19, 0);
    let created = service
        .add_reminder(&reminder(
            "Board Call",
            yesterday,
            Recurrence::Weekly,
            &["board-member"],
        ))
        .unwrap();

    let now = at(2024, 5, 7, 7, 0);
    let mut transport = RecordingTransport::default();
    let report = service.run_due(now, &mut transport).unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.fired.len(), 1);
    assert_eq!(report.total_sent(), 2);
    assert_eq!(transport.recipients(), vec!["a@x.org", "b@x.org"]);
    assert_eq!(transport.sent[0].subject, "Reminder: Board Call");
    assert_eq!(transport.sent[0].html_body, "Agenda attached.");

    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.next_fire, Some(at(2024, 5, 13, 19, 0)));
    assert_eq!(stored.state(), ReminderState::Scheduled);

    let mut second = RecordingTransport::default();
    let report = service.run_due(now, &mut second).unwrap();
    assert!(report.fired.is_empty());
    assert!(second.sent.is_empty());
}

#[test]
fn one_shot_reminder_goes_idle_after_firing() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "pastor", ContactStatus::Active);
    let service = service(&conn);
    let created = service
        .add_reminder(&reminder(
            "Retreat",
            at(2024, 3, 1, 9, 0),
            Recurrence::None,
            &["pastor"],
        ))
        .unwrap();

    let mut transport = RecordingTransport::default();
    let report = service
        .run_due(at(2024, 3, 1, 9, 0), &mut transport)
        .unwrap();
    assert_eq!(report.total_sent(), 1);
    assert_eq!(report.fired[0].next_fire, None);

    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.state(), ReminderState::Idle);

    let report = service
        .run_due(at(2030, 1, 1, 0, 0), &mut transport)
        .unwrap();
    assert!(report.fired.is_empty());
    assert_eq!(transport.sent.len(), 1);
}

#[test]
fn monthly_reminder_clamps_to_end_of_february() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .add_reminder(&reminder(
            "Finance",
            at(2024, 1, 31, 8, 0),
            Recurrence::Monthly,
            &["board-member"],
        ))
        .unwrap();

    let mut transport = RecordingTransport::default();
    let report = service
        .run_due(at(2024, 2, 1, 7, 0), &mut transport)
        .unwrap();

    assert_eq!(report.fired.len(), 1);
    assert_eq!(report.total_sent(), 0);
    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.next_fire, Some(at(2024, 2, 29, 8, 0)));
}

#[test]
fn missed_days_advance_only_one_step_per_run() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let created = service
        .add_reminder(&reminder(
            "Standup",
            at(2024, 4, 1, 8, 0),
            Recurrence::Daily,
            &["staff"],
        ))
        .unwrap();

    let mut transport = RecordingTransport::default();
    service
        .run_due(at(2024, 4, 10, 8, 0), &mut transport)
        .unwrap();

    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.next_fire, Some(at(2024, 4, 2, 8, 0)));
}

#[test]
fn reminder_not_yet_due_is_left_alone() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "board-member", ContactStatus::Active);
    let service = service(&conn);
    let next_fire = at(2024, 6, 1, 19, 0);
    let created = service
        .add_reminder(&reminder(
            "Board Call",
            next_fire,
            Recurrence::Weekly,
            &["board-member"],
        ))
        .unwrap();

    let mut transport = RecordingTransport::default();
    let report = service
        .run_due(at(2024, 6, 1, 18, 59), &mut transport)
        .unwrap();

    assert!(report.fired.is_empty());
    assert!(transport.sent.is_empty());
    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.next_fire, Some(next_fire));
}

#[test]
fn partial_send_failure_still_advances_reminder() {
    let conn = open_db_in_memory().unwrap();
    add_contact(&conn, "A", "a@x.org", "board-member", ContactStatus::Active);
    add_contact(&conn, "B", "b@x.org", "board-member", ContactStatus::Active);
    let service = service(&conn);
    let created = service
        .add_reminder(&reminder(
            "Board Call",
            at(2024, 5, 6, 19, 0),
            Recurrence::Weekly,
            &["board-member"],
        ))
        .unwrap();

    let mut transport = RecordingTransport::rejecting(&["a@x.org"]);
    let report = service
        .run_due(at(2024, 5, 6, 19, 0), &mut transport)
        .unwrap();

    assert_eq!(report.total_sent(), 1);
    assert_eq!(report.total_failed(), 1);
    let stored = service.get_reminder(created.id).unwrap().unwrap();
    assert_eq!(stored.next_fire, Some(at(2024, 5, 13, 19, 0)));
}

#[test]
fn form_input_is_validated_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .add_reminder_from_form(
            "Board Call",
            "2024-05-06 19:00:00",
            "Fortnightly",
            "board-member",
            "",
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ReminderServiceError::Validation(ReminderValidationError::UnknownRecurrence(_))
    ));

    let err = service
        .add_reminder_from_form("Board Call", "next tuesday", "Weekly", "board-member", "")
        .unwrap_err();
    assert!(matches!(
        err,
        ReminderServiceError::Validation(ReminderValidationError::InvalidNextFire(_))
    ));

    let err = service
        .add_reminder_from_form("  ", "2024-05-06", "Weekly", "board-member", "")
        .unwrap_err();
    assert!(matches!(
        err,
        ReminderServiceError::Validation(ReminderValidationError::BlankMeetingName)
    ));

    assert!(service.list_reminders().unwrap().is_empty());

    let created = service
        .add_reminder_from_form(
            "Board Call",
            "2024-05-06 19:00:00",
            "weekly",
            "board-member, pastor",
            "Agenda",
        )
        .unwrap();
    assert_eq!(created.recurrence, Recurrence::Weekly);
    assert_eq!(created.recipient_tags, vec!["board-member", "pastor"]);
    assert_eq!(created.next_fire, Some(at(2024, 5, 6, 19, 0)));
}
