pub mod attachment;
pub mod form_context;
pub mod loaders;
pub mod result;
pub mod submission;

pub use attachment::RenderedAttachment;
pub use form_context::{ContainerParent, FormContext};
pub use loaders::load_form_context;
pub use result::SubmissionResult;
pub use submission::SubmissionRequest;
