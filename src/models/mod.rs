pub mod course;
pub mod coursework;

pub use course::{Course, NewCourseRequest, SyllabusFile, UpdateCourseRequest};
pub use coursework::{CourseworkBuckets, CourseworkCategory, CourseworkItem};
