pub mod image;
pub mod request;
pub mod storage;
pub mod story;
pub mod text;

pub use image::*;
pub use request::*;
pub use storage::*;
pub use story::*;
pub use text::*;
