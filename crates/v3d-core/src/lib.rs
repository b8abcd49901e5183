pub mod outcome;
pub mod presets;
pub mod print_params;
pub mod request;
pub mod response;

pub use outcome::{FailureKind, GenerationFailure, GenerationOutcome, GenerationSuccess};
pub use presets::{PrintSetting, SUGGESTED_PROMPTS};
pub use print_params::{PrintParameters, PrintTime};
pub use request::GenerationRequest;
pub use response::GenerateResponse;
