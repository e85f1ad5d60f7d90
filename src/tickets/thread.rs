//! Comment visibility, two-level threading and notification routing. These
//! functions are pure over already-loaded rows so the rules stay testable
//! without a database.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::errors::ApiError;
use crate::core::shared::models::{TicketComment, User, UserRef};

/// Internal notes exist only for staff. Everyone else sees the public
/// conversation.
pub fn is_visible(comment: &TicketComment, viewer_is_staff: bool) -> bool {
    !comment.is_internal || viewer_is_staff
}

/// Threads are capped at two levels. Replying to a reply attaches the new
/// comment as a sibling under the top-level ancestor instead of deepening
/// the tree.
pub fn effective_parent(parent: &TicketComment) -> Uuid {
    parent.parent_id.unwrap_or(parent.id)
}

/// A reply must target a comment on the same ticket.
pub fn validate_parent(parent: &TicketComment, ticket_id: Uuid) -> Result<(), ApiError> {
    if parent.ticket_id != ticket_id {
        return Err(ApiError::Validation(
            "Parent comment does not belong to this ticket".into(),
        ));
    }
    Ok(())
}

/// Who gets emailed about a new comment, if anyone. Internal notes are
/// silent, authors never notify themselves.
pub fn notification_target(
    comment: &TicketComment,
    parent_author: Option<Uuid>,
    ticket_creator: Uuid,
) -> Option<Uuid> {
    if comment.is_internal {
        return None;
    }
    let target = match parent_author {
        Some(author) => author,
        None => ticket_creator,
    };
    if target == comment.author_id {
        return None;
    }
    Some(target)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub ticket: Uuid,
    pub author: Option<UserRef>,
    pub text: String,
    pub is_internal: bool,
    pub parent_comment: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub replies: Vec<CommentView>,
}

fn to_view(comment: &TicketComment, authors: &HashMap<Uuid, User>) -> CommentView {
    CommentView {
        id: comment.id,
        ticket: comment.ticket_id,
        author: authors.get(&comment.author_id).map(UserRef::from),
        text: comment.body.clone(),
        is_internal: comment.is_internal,
        parent_comment: comment.parent_id,
        created_at: comment.created_at,
        replies: Vec::new(),
    }
}

/// Assembles the visible thread for a viewer: top-level comments in
/// chronological order, each carrying its visible replies. A reply whose
/// internal parent is hidden from the viewer disappears with it.
pub fn build_thread(
    comments: &[TicketComment],
    authors: &HashMap<Uuid, User>,
    viewer_is_staff: bool,
) -> Vec<CommentView> {
    let mut ordered: Vec<&TicketComment> = comments.iter().collect();
    ordered.sort_by_key(|c| c.created_at);

    let mut roots: Vec<CommentView> = Vec::new();
    let mut root_index: HashMap<Uuid, usize> = HashMap::new();

    for comment in &ordered {
        if comment.parent_id.is_none() && is_visible(comment, viewer_is_staff) {
            root_index.insert(comment.id, roots.len());
            roots.push(to_view(comment, authors));
        }
    }
    for comment in &ordered {
        let Some(parent_id) = comment.parent_id else {
            continue;
        };
        if !is_visible(comment, viewer_is_staff) {
            continue;
        }
        if let Some(&idx) = root_index.get(&parent_id) {
            roots[idx].replies.push(to_view(comment, authors));
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(
        ticket_id: Uuid,
        author_id: Uuid,
        is_internal: bool,
        parent_id: Option<Uuid>,
        offset_secs: i64,
    ) -> TicketComment {
        TicketComment {
            id: Uuid::new_v4(),
            ticket_id,
            author_id,
            body: "text".into(),
            is_internal,
            parent_id,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn internal_comments_hidden_from_non_staff() {
        let c = comment(Uuid::new_v4(), Uuid::new_v4(), true, None, 0);
        assert!(is_visible(&c, true));
        assert!(!is_visible(&c, false));

        let public = comment(Uuid::new_v4(), Uuid::new_v4(), false, None, 0);
        assert!(is_visible(&public, false));
    }

    #[test]
    fn reply_to_reply_reparents_to_top_level() {
        let ticket = Uuid::new_v4();
        let top = comment(ticket, Uuid::new_v4(), false, None, 0);
        let reply = comment(ticket, Uuid::new_v4(), false, Some(top.id), 1);

        assert_eq!(effective_parent(&top), top.id);
        assert_eq!(effective_parent(&reply), top.id);
    }

    #[test]
    fn parent_must_share_ticket() {
        let ticket = Uuid::new_v4();
        let other = comment(Uuid::new_v4(), Uuid::new_v4(), false, None, 0);
        assert!(validate_parent(&other, ticket).is_err());

        let same = comment(ticket, Uuid::new_v4(), false, None, 0);
        assert!(validate_parent(&same, ticket).is_ok());
    }

    #[test]
    fn top_level_comment_notifies_ticket_creator() {
        let creator = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let c = comment(Uuid::new_v4(), commenter, false, None, 0);
        assert_eq!(notification_target(&c, None, creator), Some(creator));
    }

    #[test]
    fn reply_notifies_parent_author_not_creator() {
        let creator = Uuid::new_v4();
        let parent_author = Uuid::new_v4();
        let c = comment(Uuid::new_v4(), Uuid::new_v4(), false, Some(Uuid::new_v4()), 0);
        assert_eq!(
            notification_target(&c, Some(parent_author), creator),
            Some(parent_author)
        );
    }

    #[test]
    fn never_notify_self_or_for_internal_notes() {
        let creator = Uuid::new_v4();
        let own = comment(Uuid::new_v4(), creator, false, None, 0);
        assert_eq!(notification_target(&own, None, creator), None);

        let internal = comment(Uuid::new_v4(), Uuid::new_v4(), true, None, 0);
        assert_eq!(notification_target(&internal, None, creator), None);
    }

    #[test]
    fn thread_orders_roots_and_nests_replies() {
        let ticket = Uuid::new_v4();
        let author = Uuid::new_v4();
        let first = comment(ticket, author, false, None, 0);
        let second = comment(ticket, author, false, None, 10);
        let reply = comment(ticket, author, false, Some(first.id), 5);

        let thread = build_thread(
            &[second.clone(), reply.clone(), first.clone()],
            &HashMap::new(),
            false,
        );
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, first.id);
        assert_eq!(thread[1].id, second.id);
        assert_eq!(thread[0].replies.len(), 1);
        assert_eq!(thread[0].replies[0].id, reply.id);
        assert!(thread[1].replies.is_empty());
    }

    #[test]
    fn replies_under_hidden_internal_parent_disappear() {
        let ticket = Uuid::new_v4();
        let author = Uuid::new_v4();
        let internal_root = comment(ticket, author, true, None, 0);
        let public_reply = comment(ticket, author, false, Some(internal_root.id), 1);

        let staff = build_thread(
            &[internal_root.clone(), public_reply.clone()],
            &HashMap::new(),
            true,
        );
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].replies.len(), 1);

        let customer = build_thread(&[internal_root, public_reply], &HashMap::new(), false);
        assert!(customer.is_empty());
    }

    #[test]
    fn internal_reply_hidden_under_public_parent() {
        let ticket = Uuid::new_v4();
        let author = Uuid::new_v4();
        let root = comment(ticket, author, false, None, 0);
        let note = comment(ticket, author, true, Some(root.id), 1);

        let staff = build_thread(&[root.clone(), note.clone()], &HashMap::new(), true);
        assert_eq!(staff[0].replies.len(), 1);

        let customer = build_thread(&[root, note], &HashMap::new(), false);
        assert_eq!(customer.len(), 1);
        assert!(customer[0].replies.is_empty());
    }
}
