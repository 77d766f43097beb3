use crate::{image_model::ImageModel, llm::LLM};

pub mod comic;
pub mod error;
pub mod image_model;
pub mod llm;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub type LLMBox = Box<dyn LLM + Send + Sync>;
pub type ImgModBox = Box<dyn ImageModel + Send + Sync>;

pub const N_PANELS: usize = 3;
