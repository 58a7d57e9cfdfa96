//! # CodeGenie Pipeline
//!
//! One generation, start to finish:
//! 1. Reject an empty request
//! 2. Pick the language (explicit, or detected from the request)
//! 3. Decorate the request with style preferences
//! 4. Wrap it in the model's prompt template
//! 5. Call the inference provider once
//! 6. Extract the code from the completion
//! 7. Explain it and record it in the user's history
//!
//! No step retries. Any failure ends the run with an error.

mod pipeline;

pub use pipeline::{CodeGenerator, Generation, GenerationRequest};
