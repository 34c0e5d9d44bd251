use chrono::{DateTime, Utc};

use crate::models::post::PostRecord;

/// SQL twin of [`post_is_public`], for listing queries. By convention
/// `$1` is always the request's `now`, bound fresh on every query so a
/// scheduled post surfaces the moment its date passes.
pub const PUBLIC_CLAUSE: &str = "p.is_published = TRUE AND p.pub_date <= $1 \
     AND (p.category_id IS NULL OR c.is_published = TRUE)";

/// A post is publicly visible iff it is published, its publication date
/// has passed, and its category (when it has one) is itself published.
pub fn post_is_public(post: &PostRecord, now: DateTime<Utc>) -> bool {
    let category_ok = match post.category_is_published {
        Some(published) => published,
        None => true,
    };
    post.is_published && post.pub_date <= now && category_ok
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Duration;

    use super::*;

    pub(crate) fn sample_post() -> PostRecord {
        PostRecord {
            id: 1,
            title: "first".to_string(),
            text: "body".to_string(),
            pub_date: Utc::now() - Duration::hours(1),
            is_published: true,
            image_url: None,
            author_id: 10,
            author_username: "alice".to_string(),
            location_name: None,
            category_id: Some(2),
            category_slug: Some("travel".to_string()),
            category_is_published: Some(true),
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn published_past_post_in_published_category_is_public() {
        assert!(post_is_public(&sample_post(), Utc::now()));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        let mut post = sample_post();
        post.is_published = false;
        assert!(!post_is_public(&post, Utc::now()));
    }

    #[test]
    fn future_pub_date_hides_post_until_reached() {
        let mut post = sample_post();
        post.pub_date = Utc::now() + Duration::hours(1);
        assert!(!post_is_public(&post, Utc::now()));
        // The same post becomes visible once the clock passes pub_date.
        assert!(post_is_public(&post, Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn unpublished_category_hides_post() {
        let mut post = sample_post();
        post.category_is_published = Some(false);
        assert!(!post_is_public(&post, Utc::now()));
    }

    #[test]
    fn post_without_category_is_public() {
        let mut post = sample_post();
        post.category_id = None;
        post.category_slug = None;
        post.category_is_published = None;
        assert!(post_is_public(&post, Utc::now()));
    }
}
