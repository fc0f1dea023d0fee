//! Conversions between transfer objects and the persisted record.
//!
//! # Invariants
//! - Mapping never validates, never performs I/O and never fails.
//! - `apply_update` and `merge` keep the record identifier untouched.

use crate::model::user::{User, UserRequest, UserView};

/// Stateless request/record/view converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapper;

impl UserMapper {
    /// Builds an unpersisted record from a request.
    ///
    /// Absent fields fall back to type defaults; callers map only
    /// validated requests.
    pub fn to_record(&self, request: &UserRequest) -> User {
        User {
            id: None,
            name: request.name.clone().unwrap_or_default(),
            email: request.email.clone().unwrap_or_default(),
            age: request.age.unwrap_or_default(),
            created_at: request.created_at.unwrap_or_default(),
        }
    }

    /// Projects a record into its caller-facing view.
    pub fn to_view(&self, user: &User) -> UserView {
        UserView {
            id: user.id.unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            created_at: user.created_at,
        }
    }

    /// Overwrites every mutable field of `user` from `request`.
    pub fn apply_update(&self, user: &mut User, request: &UserRequest) {
        self.merge(user, &self.to_record(request));
    }

    /// Overwrites every mutable field of `user` from an already mapped
    /// `patch`; the store's update path merges through here.
    pub fn merge(&self, user: &mut User, patch: &User) {
        user.merge_from(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::UserMapper;
    use crate::model::user::{User, UserRequest};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn to_record_leaves_id_unassigned() {
        let request = UserRequest::new("Ivan", "ivan@example.com", 25, date(3));
        let user = UserMapper.to_record(&request);

        assert_eq!(user.id, None);
        assert_eq!(user.name, "Ivan");
        assert_eq!(user.email, "ivan@example.com");
        assert_eq!(user.age, 25);
        assert_eq!(user.created_at, date(3));
    }

    #[test]
    fn view_of_mapped_request_reproduces_request_fields() {
        let request = UserRequest::new("Olga", "olga@example.com", 31, date(9));
        let view = UserMapper.to_view(&UserMapper.to_record(&request));

        assert_eq!(Some(view.name), request.name);
        assert_eq!(Some(view.email), request.email);
        assert_eq!(Some(view.age), request.age);
        assert_eq!(Some(view.created_at), request.created_at);
    }

    #[test]
    fn apply_update_merges_fields_and_keeps_id() {
        let mut user = User::new("Old", "old@example.com", 20, date(1));
        user.id = Some(42);

        let request = UserRequest::new("New", "new@example.com", 45, date(2));
        UserMapper.apply_update(&mut user, &request);

        assert_eq!(user.id, Some(42));
        assert_eq!(user.name, "New");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.age, 45);
        assert_eq!(user.created_at, date(2));
    }

    #[test]
    fn merge_ignores_patch_id() {
        let mut user = User::new("Old", "old@example.com", 20, date(1));
        user.id = Some(7);
        let mut patch = User::new("New", "new@example.com", 45, date(2));
        patch.id = Some(99);

        UserMapper.merge(&mut user, &patch);

        assert_eq!(user.id, Some(7));
        assert_eq!(user.name, "New");
        assert_eq!(user.age, 45);
    }
}
