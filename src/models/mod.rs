pub mod history;
pub mod market;
pub mod response;
pub mod stats;

pub use history::*;
pub use market::*;
pub use response::*;
pub use stats::*;
