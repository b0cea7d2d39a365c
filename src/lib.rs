pub mod output;
pub mod record;
pub mod scoring;
pub mod source;
