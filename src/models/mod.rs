//! Persisted record types, one module per table.

pub mod appointment;
pub mod attorney;
pub mod case;
pub mod case_manager;
pub mod doctor;
pub mod enums;
pub mod event;
pub mod exam;
pub mod facility;
pub mod patient;
pub mod payer;
pub mod physician;
pub mod procedure;
pub mod status;
pub mod task;
pub mod user;

pub use appointment::Appointment;
pub use attorney::{Attorney, AttorneyProfile};
pub use case::Case;
pub use case_manager::CaseManager;
pub use doctor::Doctor;
pub use enums::{Role, TaskPriority, TaskStatus};
pub use event::Event;
pub use exam::{Exam, SubExam};
pub use facility::Facility;
pub use patient::Patient;
pub use payer::Payer;
pub use physician::Physician;
pub use procedure::Procedure;
pub use status::Status;
pub use task::Task;
pub use user::{User, UserSummary};
