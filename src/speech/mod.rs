//! Speech synthesis system

pub mod backends;
pub mod factory;
pub mod processor;
pub mod strategy;

pub use factory::{EngineFactory, ProcessorFactory};
pub use processor::{EngineType, Processor, SynthesisOutcome};
pub use strategy::PlatformStrategy;
