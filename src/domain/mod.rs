pub mod blog;
pub mod post;

pub use blog::{Blog, StoredPost, Subscriber, Subscription};
pub use post::{BlogSnapshot, Post, DEFAULT_BLOG_TITLE, NO_TITLE};
