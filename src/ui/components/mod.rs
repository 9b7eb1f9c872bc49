pub mod progress_bar;
pub mod quiz_card;
pub mod table_map;
