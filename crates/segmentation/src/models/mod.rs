pub mod confidence_map;
pub mod skin_tone;

pub use confidence_map::ConfidenceMapModel;
pub use skin_tone::SkinToneModel;
