pub mod pipeline;
pub mod source;

pub use pipeline::ImagePipeline;
pub use source::FileImageSource;
