pub mod question;

pub const MIN_TABLE: u32 = 1;
pub const MAX_TABLE: u32 = 10;
pub const MIN_FACTOR: u32 = 1;
pub const MAX_FACTOR: u32 = 10;
pub const OPTION_COUNT: usize = 4;
