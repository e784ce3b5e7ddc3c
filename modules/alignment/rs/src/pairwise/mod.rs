pub use wavebit_core_rs::alignment::pairwise as alignment;

pub mod scoring;
pub mod wfa;
