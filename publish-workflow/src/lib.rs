//! The two user-triggered workflows: publishing a document as a post, and listing the
//! site's categories. Both run start to finish on one task with no retries.

pub mod categories;
pub mod publish;
pub mod site;

pub use categories::{list_categories, CategoryList};
pub use publish::{
    publish, ChannelConfirmer, ConfirmationRequest, FixedAnswer, OverwriteConfirmer,
    PendingOverwrite, Prepared, PublishOutcome, PublishResult, PublishState, PublishWorkflow,
    Submission, ValidatedDraft, DOCUMENT_EXTENSIONS,
};
pub use site::Site;
