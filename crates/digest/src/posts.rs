use newsroll_common::Post;

use crate::text::{clean, truncate};

/// Prepare fetched posts for summarization.
///
/// Cleans and truncates each post's text, drops posts whose remaining text is
/// shorter than `min_chars`, and preserves every other field and the input
/// order.
#[must_use]
pub fn transform_posts(posts: Vec<Post>, max_chars: usize, min_chars: usize) -> Vec<Post> {
    posts
        .into_iter()
        .filter_map(|post| {
            let text = truncate(&clean(&post.text), max_chars);
            if text.chars().count() < min_chars {
                return None;
            }
            Some(Post { text, ..post })
        })
        .collect()
}
