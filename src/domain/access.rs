use chrono::{DateTime, Utc};

use super::visibility::post_is_public;
use crate::models::{comment::Comment, post::PostRecord, user::Claims};

/// The three answers the access controller can give. `PermitEdit`
/// implies view rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    PermitEdit,
    PermitView,
    Deny,
}

impl Access {
    pub fn can_view(self) -> bool {
        !matches!(self, Access::Deny)
    }

    pub fn can_edit(self) -> bool {
        matches!(self, Access::PermitEdit)
    }
}

/// Owner and admin may edit; anyone may view what the visibility filter
/// lets through; everything else is denied.
pub fn post_access(requester: Option<&Claims>, post: &PostRecord, now: DateTime<Utc>) -> Access {
    if let Some(claims) = requester {
        if claims.user_id == post.author_id || claims.is_admin() {
            return Access::PermitEdit;
        }
    }
    if post_is_public(post, now) {
        Access::PermitView
    } else {
        Access::Deny
    }
}

/// A comment follows its author for edits and its parent post for views.
pub fn comment_access(
    requester: Option<&Claims>,
    comment: &Comment,
    parent_is_visible: bool,
) -> Access {
    if let Some(claims) = requester {
        if claims.user_id == comment.author_id || claims.is_admin() {
            return Access::PermitEdit;
        }
    }
    if parent_is_visible {
        Access::PermitView
    } else {
        Access::Deny
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::visibility::tests::sample_post;
    use crate::models::user::{ROLE_ADMIN, ROLE_USER};

    fn claims(user_id: i64, role: &str) -> Claims {
        Claims {
            sub: "test".to_string(),
            exp: 0,
            iat: 0,
            user_id,
            role: role.to_string(),
        }
    }

    #[test]
    fn author_may_edit_own_post() {
        let post = sample_post();
        let author = claims(post.author_id, ROLE_USER);
        assert_eq!(
            post_access(Some(&author), &post, Utc::now()),
            Access::PermitEdit
        );
    }

    #[test]
    fn author_sees_own_scheduled_post() {
        let mut post = sample_post();
        post.pub_date = Utc::now() + Duration::hours(1);
        let author = claims(post.author_id, ROLE_USER);
        assert!(post_access(Some(&author), &post, Utc::now()).can_view());
        // Everyone else gets Deny, which handlers report as 404.
        let other = claims(999, ROLE_USER);
        assert_eq!(post_access(Some(&other), &post, Utc::now()), Access::Deny);
        assert_eq!(post_access(None, &post, Utc::now()), Access::Deny);
    }

    #[test]
    fn stranger_may_view_but_not_edit_public_post() {
        let post = sample_post();
        let other = claims(999, ROLE_USER);
        let access = post_access(Some(&other), &post, Utc::now());
        assert!(access.can_view());
        assert!(!access.can_edit());
    }

    #[test]
    fn admin_may_edit_any_post() {
        let post = sample_post();
        let admin = claims(999, ROLE_ADMIN);
        assert!(post_access(Some(&admin), &post, Utc::now()).can_edit());
    }

    #[test]
    fn comment_editable_by_author_only() {
        let comment = Comment {
            id: 1,
            text: "hi".to_string(),
            post_id: 1,
            author_id: 42,
            author_username: "bob".to_string(),
            created_at: Utc::now(),
        };
        let author = claims(42, ROLE_USER);
        let other = claims(7, ROLE_USER);
        assert!(comment_access(Some(&author), &comment, true).can_edit());
        assert_eq!(
            comment_access(Some(&other), &comment, true),
            Access::PermitView
        );
        assert_eq!(comment_access(Some(&other), &comment, false), Access::Deny);
        assert!(comment_access(Some(&claims(7, ROLE_ADMIN)), &comment, false).can_edit());
    }
}
