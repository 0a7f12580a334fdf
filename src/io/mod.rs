mod cursor;
mod local;

pub use cursor::ByteCursor;
pub use local::LocalArchive;
