mod error;
mod outcome;
mod pipeline;
mod prompts;
mod writer;

pub use error::RunError;
pub use outcome::PipelineOutcome;
pub use pipeline::Pipeline;
pub use prompts::{DescriptionPrompts, PromptContext, DEFAULT_MAX_DIFF_BYTES};
pub use writer::{DescriptionWriter, PrDescription, WriterError};
