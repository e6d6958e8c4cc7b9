pub mod applicant;
pub mod application;
pub mod vacancy;

pub use applicant::{ApplicantRow, ResumeVersionRow};
pub use application::{
    ApplicationEventRow, ApplicationStatus, CvEvaluationRow, JobApplicationRow, ReqType,
};
pub use vacancy::{VacancyRow, VacancyStatus};
