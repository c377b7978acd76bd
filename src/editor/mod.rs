mod buffer;
mod cursor;
mod editor;
mod mode;
pub mod samples;
mod search;

pub use buffer::Buffer;
pub use cursor::Cursor;
pub use editor::{Editor, NoticeLevel};
pub use mode::Mode;
