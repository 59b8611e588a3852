pub mod create;
pub mod delete;
pub mod update;

pub use create::CreateBookCommand;
pub use delete::DeleteBookCommand;
pub use update::UpdateBookCommand;
