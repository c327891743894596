//! Access-control policy.
//!
//! A pure decision function over closed enums. Every (action, role) pair is
//! matched exhaustively, so adding an action or a role forces every rule to
//! be revisited at compile time.

use crate::domain::Role;

/// The actions gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePost,
    EditPost,
    SubmitPost,
    PublishPost,
    DeletePost,
    ChangeUserRole,
    ApproveComment,
}

/// Decide whether an actor with `role` may perform `action`.
///
/// `is_owner` is whether the actor authored the entity in question; it only
/// matters for the AUTHOR role and for ownership-scoped actions. Actors
/// without an authenticated session never reach this function - they are
/// rejected as unauthenticated upstream.
pub fn can_perform(role: Role, is_owner: bool, action: Action) -> bool {
    use Action::*;
    use Role::*;

    match (action, role) {
        (CreatePost, _) => true,

        (EditPost, Author) => is_owner,
        (EditPost, Editor | Admin) => true,

        (SubmitPost, Author) => is_owner,
        (SubmitPost, Editor | Admin) => false,

        (PublishPost, Author) => false,
        (PublishPost, Editor | Admin) => true,

        (DeletePost, Author) => is_owner,
        (DeletePost, Editor) => false,
        (DeletePost, Admin) => true,

        (ChangeUserRole, Admin) => true,
        (ChangeUserRole, Author | Editor) => false,

        (ApproveComment, Author) => false,
        (ApproveComment, Editor | Admin) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role::*;

    #[test]
    fn anyone_may_create() {
        for role in [Author, Editor, Admin] {
            assert!(can_perform(role, false, Action::CreatePost));
        }
    }

    #[test]
    fn edit_requires_ownership_or_editorial_role() {
        assert!(can_perform(Author, true, Action::EditPost));
        assert!(!can_perform(Author, false, Action::EditPost));
        assert!(can_perform(Editor, false, Action::EditPost));
        assert!(can_perform(Admin, false, Action::EditPost));
    }

    #[test]
    fn submit_is_owner_author_only() {
        assert!(can_perform(Author, true, Action::SubmitPost));
        assert!(!can_perform(Author, false, Action::SubmitPost));
        assert!(!can_perform(Editor, true, Action::SubmitPost));
        assert!(!can_perform(Admin, true, Action::SubmitPost));
    }

    #[test]
    fn publish_is_editorial_only() {
        assert!(!can_perform(Author, true, Action::PublishPost));
        assert!(can_perform(Editor, false, Action::PublishPost));
        assert!(can_perform(Admin, false, Action::PublishPost));
    }

    #[test]
    fn delete_excludes_editors() {
        assert!(can_perform(Author, true, Action::DeletePost));
        assert!(!can_perform(Author, false, Action::DeletePost));
        assert!(!can_perform(Editor, true, Action::DeletePost));
        assert!(can_perform(Admin, false, Action::DeletePost));
    }

    #[test]
    fn role_change_is_admin_only() {
        assert!(!can_perform(Author, true, Action::ChangeUserRole));
        assert!(!can_perform(Editor, true, Action::ChangeUserRole));
        assert!(can_perform(Admin, false, Action::ChangeUserRole));
    }

    #[test]
    fn comment_approval_is_editorial() {
        assert!(!can_perform(Author, true, Action::ApproveComment));
        assert!(can_perform(Editor, false, Action::ApproveComment));
        assert!(can_perform(Admin, false, Action::ApproveComment));
    }
}
