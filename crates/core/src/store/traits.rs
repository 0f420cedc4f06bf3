use super::{
    ImageStatistics, ImageTask, NewImageStatistics, NewImageTask, NewUser, StoreError, User,
};

/// Storage backend for user accounts.
pub trait UserStore: Send + Sync {
    /// Create a new user. Fails with [`StoreError::Conflict`] when the
    /// email is already registered.
    fn create(&self, new: NewUser) -> Result<User, StoreError>;

    /// Get a user by id.
    fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Get a user by email.
    fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Storage backend for image task rows and their statistics.
pub trait TaskStore: Send + Sync {
    /// Create a new image task row.
    fn create_task(&self, new: NewImageTask) -> Result<ImageTask, StoreError>;

    /// Create the statistics row for an originating task row.
    fn create_statistics(
        &self,
        new: NewImageStatistics,
    ) -> Result<ImageStatistics, StoreError>;

    /// All rows sharing a job id, ordered by creation.
    fn tasks_by_job(&self, job_id: &str) -> Result<Vec<ImageTask>, StoreError>;

    /// All rows owned by a user, ordered by creation.
    fn tasks_by_owner(&self, owner_id: &str) -> Result<Vec<ImageTask>, StoreError>;

    /// Statistics row for a task row, if measured.
    fn statistics_for_task(
        &self,
        task_id: &str,
    ) -> Result<Option<ImageStatistics>, StoreError>;
}
