pub mod admin;
pub mod candidates;
pub mod dispatch;
pub mod docs;
pub mod filters;
pub mod hide;
pub mod init;
pub mod prisma;
pub mod protocol;
pub mod results;
pub mod reviews;
pub mod save;
pub mod screen;
pub mod search;
pub mod shared;
pub mod sources;
pub mod state;
pub mod strategy;
