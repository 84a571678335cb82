pub mod model;
pub mod narration;
