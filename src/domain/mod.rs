pub mod email_index;
pub mod lead;
pub mod pitch_deck;
pub mod routine;
pub mod sheets;
