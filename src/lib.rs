//! Spoken-language assessment: deterministic text alignment and scoring,
//! plus tone-controlled tutor feedback from an external language model.

pub mod assess;
pub mod config;
pub mod llm;
pub mod pipeline;
