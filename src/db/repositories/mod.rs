mod course_repository;
mod enrollment_repository;
mod learner_repository;
mod progress_repository;

pub use course_repository::CourseRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use learner_repository::LearnerRepository;
pub use progress_repository::ProgressRepository;
