use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::comment::Comment;

/// A post row joined with its author, location and category, plus the
/// comment count listings display. Every post query selects this shape.
#[derive(Debug, Serialize, FromRow)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub location_name: Option<String>,
    pub category_id: Option<i64>,
    pub category_slug: Option<String>,
    // Only feeds the visibility check; None means no category attached.
    #[serde(skip)]
    pub category_is_published: Option<bool>,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostPayload {
    pub title: String,
    pub text: String,
    /// Defaults to now; a future date schedules the post.
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    pub image_url: Option<String>,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// For the nullable columns, an absent field keeps the stored value
/// while an explicit `null` detaches it.
#[derive(Debug, Deserialize)]
pub struct UpdatePostPayload {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: Option<bool>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub location_id: Option<Option<i64>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub category_id: Option<Option<i64>>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostRecord,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_tells_absent_from_null() {
        let payload: UpdatePostPayload = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(payload.category_id, None);

        let payload: UpdatePostPayload =
            serde_json::from_str(r#"{"category_id": null, "location_id": null}"#).unwrap();
        assert_eq!(payload.category_id, Some(None));
        assert_eq!(payload.location_id, Some(None));

        let payload: UpdatePostPayload = serde_json::from_str(r#"{"category_id": 5}"#).unwrap();
        assert_eq!(payload.category_id, Some(Some(5)));
    }
}
