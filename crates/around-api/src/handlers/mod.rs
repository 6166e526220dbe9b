pub mod cluster;
pub mod health;
pub mod post_create;
pub mod search;
