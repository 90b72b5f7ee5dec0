pub mod books;
pub mod db;
pub mod keywords;
pub mod models;
pub mod outbox;
pub mod picks;
mod tables;
pub mod topics;
pub mod view;

pub use db::{Database, DatabaseError, PurgeStats};
pub use tables::*;
pub use view::{ReadView, TableView, WriteView};
