/// Job entity module
pub mod job;
/// Job detail entity module
pub mod job_detail;

pub use job::Entity as Job;
pub use job_detail::Entity as JobDetail;
