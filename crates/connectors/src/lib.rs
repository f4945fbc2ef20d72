pub mod cursor;
pub mod error;
pub mod planner;
pub mod scan_token;
pub mod scroll;
pub mod source;
pub mod token_range;
