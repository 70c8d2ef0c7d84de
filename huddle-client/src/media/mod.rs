mod backend;
mod rtc_backend;

pub use backend::*;
pub use rtc_backend::*;
