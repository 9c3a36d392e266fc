pub mod google;
pub mod openai;

pub use google::GeminiProvider;
pub use openai::OpenAiProvider;
