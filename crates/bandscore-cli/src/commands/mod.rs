pub mod band;
pub mod batch;
pub mod exams;
pub mod grade;
pub mod init;
pub mod types;
pub mod validate;
