pub mod document_renderer;
pub mod dor_data_processor;
pub mod submission_dispatcher;
pub mod template_resolver;

pub use document_renderer::DocumentRenderer;
pub use dor_data_processor::DorDataProcessor;
pub use submission_dispatcher::SubmissionDispatcher;
pub use template_resolver::TemplateResolver;
