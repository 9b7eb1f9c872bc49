pub mod achievements;
pub mod navigation;
pub mod progress;
