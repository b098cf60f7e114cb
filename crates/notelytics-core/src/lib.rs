pub mod analysis;
pub mod calculator;
pub mod columns;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod sanitizer;
