//! Enrollment ledger repository.

use crate::error::MetadataResult;
use crate::models::EnrollmentRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for enrollment ledger operations.
#[async_trait]
pub trait EnrollmentRepo: Send + Sync {
    /// Enroll a user in a course.
    ///
    /// Runs as a single transaction: verifies the course exists and is
    /// active (`NotFound` otherwise), rejects a duplicate (user, course)
    /// pair with `AlreadyExists`, inserts the enrollment at 0% and
    /// increments the course's `enrolled_students` counter.
    async fn enroll(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        now: OffsetDateTime,
    ) -> MetadataResult<EnrollmentRow>;

    /// Get the enrollment record for a (user, course) pair.
    async fn get_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> MetadataResult<Option<EnrollmentRow>>;

    /// List a user's enrollments, most recently accessed first.
    async fn list_enrollments_for_user(&self, user_id: Uuid)
    -> MetadataResult<Vec<EnrollmentRow>>;
}
