mod chapter;
mod nft;
mod paragraph;
mod payment;
mod progress;
mod reader;
mod story;

pub use chapter::Chapter;
pub use nft::Nft;
pub use paragraph::Paragraph;
pub use payment::Payment;
pub use progress::{ReadingProgress, VisitLogEntry};
pub use reader::Reader;
pub use story::Story;
