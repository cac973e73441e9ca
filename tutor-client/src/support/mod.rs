//! Support lifecycle: creation wizard, store access, chat linkage and attachments

pub mod attachment;
pub mod linkage;
pub mod repository;
pub mod wizard;

pub use attachment::{AttachmentHandler, SupportUpload};
pub use linkage::LinkageService;
pub use repository::{SupportApi, SupportRepository};
pub use wizard::{Advance, SupportDraft, SupportWizard, WizardState, WizardStep};
