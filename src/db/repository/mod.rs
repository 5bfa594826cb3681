//! Repository layer — entity-scoped database operations.
//!
//! One sub-module per table; all public functions are re-exported here.

mod appointment;
mod attorney;
mod case;
mod case_manager;
mod doctor;
mod event;
mod exam;
mod facility;
mod patient;
mod payer;
mod physician;
mod procedure;
mod status;
mod task;
mod user;

pub use appointment::*;
pub use attorney::*;
pub use case::*;
pub use case_manager::*;
pub use doctor::*;
pub use event::*;
pub use exam::*;
pub use facility::*;
pub use patient::*;
pub use payer::*;
pub use physician::*;
pub use procedure::*;
pub use status::*;
pub use task::*;
pub use user::*;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use uuid::Uuid;

use super::DatabaseError;

// Column readers shared by the row mappers. IDs, dates, and enums are stored
// as TEXT; a row that fails to parse surfaces as a conversion error rather
// than a silent default.

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn uuid_field(index: usize, value: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value).map_err(|e| conversion_error(index, e))
}

fn opt_uuid_field(index: usize, value: Option<String>) -> rusqlite::Result<Option<Uuid>> {
    value.map(|v| uuid_field(index, v)).transpose()
}

fn date_field(index: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| conversion_error(index, e))
}

fn opt_date_field(index: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    value.map(|v| date_field(index, v)).transpose()
}

fn datetime_field(index: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(index, e))
}

fn enum_field<T>(index: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    value
        .parse()
        .map_err(|e: DatabaseError| conversion_error(index, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{Role, TaskPriority, TaskStatus};
    use crate::models::*;
    use chrono::TimeZone;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn make_user(conn: &Connection, email: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: email.into(),
            password: String::new(),
            role,
            created_at: Utc::now(),
        };
        insert_user(conn, &user).unwrap();
        user
    }

    fn make_payer(conn: &Connection, name: &str) -> Payer {
        let payer = Payer {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        };
        insert_payer(conn, &payer).unwrap();
        payer
    }

    fn make_status(conn: &Connection, name: &str) -> Status {
        let status = Status {
            id: Uuid::new_v4(),
            name: name.into(),
            color: Some("#4caf50".into()),
            created_at: Utc::now(),
        };
        insert_status(conn, &status).unwrap();
        status
    }

    fn make_patient(conn: &Connection, payer_id: Uuid, status_id: Uuid) -> Patient {
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Morales".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 12),
            doidol: NaiveDate::from_ymd_opt(2024, 1, 8),
            gender: Some("F".into()),
            phone: Some("6165550142".into()),
            address: None,
            payer_id,
            status_id,
            attorney_id: None,
            created_at: Utc::now(),
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn make_attorney_graph(conn: &mut Connection, email: &str) -> (User, Attorney, CaseManager) {
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane Doe".into(),
            email: email.into(),
            password: String::new(),
            role: Role::Attorney,
            created_at: Utc::now(),
        };
        let attorney = Attorney {
            id: Uuid::new_v4(),
            user_id: user.id,
            address: Some("77 Monroe Center St NW".into()),
            city: Some("Grand Rapids".into()),
            state: Some("MI".into()),
            zip: Some("49503".into()),
            phone: Some("6165550101".into()),
            bar_number: Some("P81234".into()),
            created_at: Utc::now(),
        };
        let cm = CaseManager {
            id: Uuid::new_v4(),
            attorney_id: attorney.id,
            name: "Sam Field".into(),
            email: Some("sam@doelaw.com".into()),
            phone: None,
            created_at: Utc::now(),
        };
        create_attorney_with_user(conn, &user, &attorney, std::slice::from_ref(&cm)).unwrap();
        (user, attorney, cm)
    }

    #[test]
    fn user_insert_and_retrieve() {
        let conn = test_db();
        let user = make_user(&conn, "admin@clinic.test", Role::Admin);
        let got = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(got.email, "admin@clinic.test");
        assert_eq!(got.role, Role::Admin);
        assert_eq!(got.created_at, user.created_at);
    }

    #[test]
    fn duplicate_user_email_conflicts() {
        let conn = test_db();
        make_user(&conn, "dup@clinic.test", Role::Staff);
        let copy = User {
            id: Uuid::new_v4(),
            name: "Other".into(),
            email: "dup@clinic.test".into(),
            password: String::new(),
            role: Role::Staff,
            created_at: Utc::now(),
        };
        let err = insert_user(&conn, &copy).unwrap_err();
        match err {
            DatabaseError::Conflict { column } => assert_eq!(column, "users.email"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn attorney_graph_commits_as_one_unit() {
        let mut conn = test_db();
        let (user, attorney, cm) = make_attorney_graph(&mut conn, "jane@doelaw.com");

        let profile = get_attorney_profile(&conn, &attorney.id).unwrap().unwrap();
        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.user.email, "jane@doelaw.com");
        assert_eq!(profile.case_managers.len(), 1);
        assert_eq!(profile.case_managers[0].id, cm.id);
    }

    #[test]
    fn attorney_graph_rolls_back_when_a_step_fails() {
        let mut conn = test_db();
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane Doe".into(),
            email: "rollback@doelaw.com".into(),
            password: String::new(),
            role: Role::Attorney,
            created_at: Utc::now(),
        };
        let attorney = Attorney {
            id: Uuid::new_v4(),
            user_id: user.id,
            address: None,
            city: None,
            state: None,
            zip: None,
            phone: None,
            bar_number: None,
            created_at: Utc::now(),
        };
        // Points at a nonexistent attorney, so the third insert fails.
        let broken_cm = CaseManager {
            id: Uuid::new_v4(),
            attorney_id: Uuid::new_v4(),
            name: "Orphan".into(),
            email: None,
            phone: None,
            created_at: Utc::now(),
        };

        let result = create_attorney_with_user(&mut conn, &user, &attorney, &[broken_cm]);
        assert!(result.is_err());
        assert!(get_user(&conn, &user.id).unwrap().is_none());
        assert!(get_attorney(&conn, &attorney.id).unwrap().is_none());
    }

    #[test]
    fn attorney_delete_cascades_user_and_managers() {
        let mut conn = test_db();
        let (user, attorney, cm) = make_attorney_graph(&mut conn, "cascade@doelaw.com");

        delete_attorney_cascade(&mut conn, &attorney.id).unwrap();

        assert!(get_attorney(&conn, &attorney.id).unwrap().is_none());
        assert!(get_user(&conn, &user.id).unwrap().is_none());
        assert!(get_case_manager(&conn, &cm.id).unwrap().is_none());
        let orphans = list_case_managers(&conn, Some(&attorney.id)).unwrap();
        assert!(orphans.is_empty());
    }

    #[test]
    fn attorney_delete_releases_patients() {
        let mut conn = test_db();
        let (_, attorney, _) = make_attorney_graph(&mut conn, "release@doelaw.com");
        let payer = make_payer(&conn, "State Farm");
        let status = make_status(&conn, "Intake");
        let mut patient = make_patient(&conn, payer.id, status.id);
        patient.attorney_id = Some(attorney.id);
        update_patient(&conn, &patient).unwrap();

        delete_attorney_cascade(&mut conn, &attorney.id).unwrap();

        let kept = get_patient(&conn, &patient.id).unwrap().unwrap();
        assert_eq!(kept.attorney_id, None);
        assert_eq!(kept.first_name, "Ana");
    }

    #[test]
    fn payer_delete_blocked_while_referenced() {
        let conn = test_db();
        let payer = make_payer(&conn, "Progressive");
        let status = make_status(&conn, "Active");
        let patient = make_patient(&conn, payer.id, status.id);

        let err = delete_payer(&conn, &payer.id).unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKey));

        delete_patient(&conn, &patient.id).unwrap();
        delete_payer(&conn, &payer.id).unwrap();
    }

    #[test]
    fn case_number_is_unique() {
        let conn = test_db();
        let payer = make_payer(&conn, "Aetna");
        let status = make_status(&conn, "Open");
        let patient = make_patient(&conn, payer.id, status.id);

        let case = Case {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            case_number: "2024-000317".into(),
            filing_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            status: Some("OPEN".into()),
            created_at: Utc::now(),
        };
        insert_case(&conn, &case).unwrap();

        let twin = Case {
            id: Uuid::new_v4(),
            ..case.clone()
        };
        let err = insert_case(&conn, &twin).unwrap_err();
        match err {
            DatabaseError::Conflict { column } => assert_eq!(column, "cases.case_number"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn exam_delete_cascades_sub_exams() {
        let mut conn = test_db();
        let exam = Exam {
            id: Uuid::new_v4(),
            name: "MRI".into(),
            category: Some("Imaging".into()),
            status: None,
            created_at: Utc::now(),
        };
        let subs = vec![
            SubExam {
                id: Uuid::new_v4(),
                exam_id: exam.id,
                name: "MRI Lumbar".into(),
                price: 1450.0,
                created_at: Utc::now(),
            },
            SubExam {
                id: Uuid::new_v4(),
                exam_id: exam.id,
                name: "MRI Cervical".into(),
                price: 1390.0,
                created_at: Utc::now(),
            },
        ];
        create_exam_with_sub_exams(&mut conn, &exam, &subs).unwrap();
        assert_eq!(list_sub_exams(&conn, Some(&exam.id)).unwrap().len(), 2);

        delete_exam(&conn, &exam.id).unwrap();
        assert!(list_sub_exams(&conn, Some(&exam.id)).unwrap().is_empty());
    }

    #[test]
    fn facility_delete_blocked_by_procedure() {
        let conn = test_db();
        let payer = make_payer(&conn, "Allstate");
        let status = make_status(&conn, "Scheduled");
        let patient = make_patient(&conn, payer.id, status.id);
        let exam = Exam {
            id: Uuid::new_v4(),
            name: "X-Ray".into(),
            category: None,
            status: None,
            created_at: Utc::now(),
        };
        insert_exam(&conn, &exam).unwrap();
        let facility = Facility {
            id: Uuid::new_v4(),
            name: "Westside Imaging".into(),
            address: None,
            status: None,
            created_at: Utc::now(),
        };
        insert_facility(&conn, &facility).unwrap();
        let physician = Physician {
            id: Uuid::new_v4(),
            name: "Dr. Reyes".into(),
            email: "reyes@westside.test".into(),
            status: None,
            is_active: true,
            created_at: Utc::now(),
        };
        insert_physician(&conn, &physician).unwrap();

        insert_procedure(
            &conn,
            &Procedure {
                id: Uuid::new_v4(),
                exam_id: exam.id,
                facility_id: facility.id,
                physician_id: physician.id,
                patient_id: patient.id,
                status_id: status.id,
                schedule_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                schedule_time: "09:30".into(),
                is_completed: false,
                lop: Some("LOP on file".into()),
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let err = delete_facility(&conn, &facility.id).unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKey));
    }

    #[test]
    fn lists_return_newest_first() {
        let conn = test_db();
        for (minute, name) in [(1, "First"), (2, "Second"), (3, "Third")] {
            insert_payer(
                &conn,
                &Payer {
                    id: Uuid::new_v4(),
                    name: name.into(),
                    is_active: true,
                    created_at: at(minute),
                },
            )
            .unwrap();
        }
        let payers = list_payers(&conn).unwrap();
        let names: Vec<&str> = payers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Third", "Second", "First"]);
    }

    #[test]
    fn task_assignee_cleared_when_user_deleted() {
        let conn = test_db();
        let user = make_user(&conn, "staff@clinic.test", Role::Staff);
        let task = Task {
            id: Uuid::new_v4(),
            title: "Request records".into(),
            description: None,
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            due_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            assignee_id: Some(user.id),
            created_at: Utc::now(),
        };
        insert_task(&conn, &task).unwrap();

        delete_user(&conn, &user.id).unwrap();

        let kept = get_task(&conn, &task.id).unwrap().unwrap();
        assert_eq!(kept.assignee_id, None);
        assert_eq!(kept.status, TaskStatus::Pending);
    }

    #[test]
    fn events_filter_by_patient() {
        let conn = test_db();
        let payer = make_payer(&conn, "Cigna");
        let status = make_status(&conn, "New");
        let patient = make_patient(&conn, payer.id, status.id);

        insert_event(
            &conn,
            &Event {
                id: Uuid::new_v4(),
                action: "patient.update".into(),
                detail: Some("phone changed".into()),
                user_id: None,
                patient_id: Some(patient.id),
                created_at: Utc::now(),
            },
        )
        .unwrap();
        insert_event(
            &conn,
            &Event {
                id: Uuid::new_v4(),
                action: "payer.create".into(),
                detail: None,
                user_id: None,
                patient_id: None,
                created_at: Utc::now(),
            },
        )
        .unwrap();

        assert_eq!(list_events(&conn, Some(&patient.id)).unwrap().len(), 1);
        assert_eq!(list_events(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let conn = test_db();
        let ghost = Doctor {
            id: Uuid::new_v4(),
            name: "Nobody".into(),
            clinic_name: None,
            phone_number: None,
            status: None,
            created_at: Utc::now(),
        };
        let err = update_doctor(&conn, &ghost).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));

        let err = delete_doctor(&conn, &ghost.id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn case_managers_scoped_to_attorney() {
        let mut conn = test_db();
        let (_, first, _) = make_attorney_graph(&mut conn, "first@law.test");
        let (_, second, _) = make_attorney_graph(&mut conn, "second@law.test");

        assert_eq!(list_case_managers(&conn, Some(&first.id)).unwrap().len(), 1);
        assert_eq!(list_case_managers(&conn, Some(&second.id)).unwrap().len(), 1);
        assert_eq!(list_case_managers(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn attorney_profiles_list_carries_managers() {
        let mut conn = test_db();
        let (_, first, first_cm) = make_attorney_graph(&mut conn, "one@law.test");
        let (_, second, second_cm) = make_attorney_graph(&mut conn, "two@law.test");

        let profiles = list_attorney_profiles(&conn).unwrap();
        assert_eq!(profiles.len(), 2);
        for profile in profiles {
            if profile.attorney.id == first.id {
                assert_eq!(profile.case_managers[0].id, first_cm.id);
            } else {
                assert_eq!(profile.attorney.id, second.id);
                assert_eq!(profile.case_managers[0].id, second_cm.id);
            }
        }
    }

    #[test]
    fn update_attorney_with_user_changes_both_rows() {
        let mut conn = test_db();
        let (mut user, mut attorney, _) = make_attorney_graph(&mut conn, "both@law.test");

        user.name = "Jane Q. Doe".into();
        user.password = "pbkdf2-hash".into();
        attorney.city = Some("Lansing".into());
        update_attorney_with_user(&mut conn, &attorney, &user).unwrap();

        let stored_user = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(stored_user.name, "Jane Q. Doe");
        assert_eq!(stored_user.password, "pbkdf2-hash");
        let stored = get_attorney(&conn, &attorney.id).unwrap().unwrap();
        assert_eq!(stored.city.as_deref(), Some("Lansing"));
        assert_eq!(stored.bar_number.as_deref(), Some("P81234"));
    }
}
