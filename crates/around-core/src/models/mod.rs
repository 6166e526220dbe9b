pub mod post;

pub use post::{new_post_id, CreatedPost, Location, Post, PostId, PostResponse};
