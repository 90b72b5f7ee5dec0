mod admin;
mod books;
mod picks;
mod search;

pub use admin::{admin_purge, health};
pub use books::{
    create_pick, delete_book, get_book, list_books, list_topics, save_book, short_books,
    update_book,
};
pub use picks::{delete_pick, list_picks, update_pick};
pub use search::{search_book, search_library};
