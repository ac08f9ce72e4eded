pub mod class;
pub mod student;

pub use class::SchoolClass;
pub use student::Student;
