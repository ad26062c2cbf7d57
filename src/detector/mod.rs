//! New-post detection between two observations of the same blog.

use std::collections::HashSet;

use crate::domain::Post;

/// Posts of `current` whose identity key does not occur in `previous`, in
/// `current` order.
///
/// An empty `previous` is a cold start and every current post is new. Only
/// additions are ever reported; edited or vanished posts are not.
pub fn detect_new_posts(previous: &[Post], current: &[Post]) -> Vec<Post> {
    if previous.is_empty() {
        return current.to_vec();
    }

    let seen: HashSet<String> = previous.iter().map(Post::identity_key).collect();

    current
        .iter()
        .filter(|post| !seen.contains(&post.identity_key()))
        .cloned()
        .collect()
}
