pub mod record_book;
pub mod services;
pub mod time;
pub mod utils;

pub use record_book::RecordBook;
