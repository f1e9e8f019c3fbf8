//! Publishing a local document as a WordPress post.
//!
//! One run moves through [`PublishState`] strictly in order:
//!
//! ```text
//! Idle -> ValidatingInput -> CheckingCredentials -> CheckingSlug
//!      -> [AwaitingOverwriteConfirmation] -> Submitting -> Idle
//! ```
//!
//! Validation failures never touch the network. A slug that already exists suspends the
//! run: [`PublishWorkflow::prepare`] hands back a [`PendingOverwrite`], and nothing else is
//! sent until the caller confirms it. Interactive callers (the GUI) drive the steps
//! themselves; [`PublishWorkflow::run`] drives them with an [`OverwriteConfirmer`].

use chrono::Local;
use markdown_renderer::{CommonMarkRenderer, MarkdownRenderer};
use publisher_core::{
    CoreError, EndpointConfig, PostDraft, PublishTarget, SlugLookup, ValidationError,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use wordpress_client::{PostPayload, WordPressClient};

use crate::site::Site;

/// Extensions accepted for the document to publish, compared case-insensitively.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    ValidatingInput,
    CheckingCredentials,
    CheckingSlug,
    AwaitingOverwriteConfirmation { post_id: u64 },
    Submitting { target: PublishTarget },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { target: PublishTarget, status: u16 },
    /// The user declined to overwrite an existing post; nothing was sent.
    Cancelled,
}

pub type PublishResult = Result<PublishOutcome, CoreError>;

/// A draft whose fields passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    title: String,
    slug: String,
    file_path: PathBuf,
    category_ids: Vec<u64>,
}

impl ValidatedDraft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn category_ids(&self) -> &[u64] {
        &self.category_ids
    }
}

/// Everything needed for the final create or update request.
#[derive(Debug, Clone)]
pub struct Submission {
    client: WordPressClient,
    draft: ValidatedDraft,
    target: PublishTarget,
}

impl Submission {
    pub fn draft(&self) -> &ValidatedDraft {
        &self.draft
    }

    pub fn target(&self) -> PublishTarget {
        self.target
    }
}

/// A run suspended because a post with the draft's slug already exists.
#[derive(Debug, Clone)]
pub struct PendingOverwrite {
    client: WordPressClient,
    draft: ValidatedDraft,
    post_id: u64,
}

impl PendingOverwrite {
    pub fn post_id(&self) -> u64 {
        self.post_id
    }

    pub fn slug(&self) -> &str {
        &self.draft.slug
    }

    pub fn confirm(self) -> Submission {
        info!(
            "Overwrite of post {} ('{}') confirmed",
            self.post_id, self.draft.slug
        );
        Submission {
            client: self.client,
            draft: self.draft,
            target: PublishTarget::Update {
                post_id: self.post_id,
            },
        }
    }

    pub fn decline(self) -> PublishOutcome {
        info!(
            "Overwrite of post {} ('{}') declined",
            self.post_id, self.draft.slug
        );
        PublishOutcome::Cancelled
    }
}

#[derive(Debug, Clone)]
pub enum Prepared {
    Ready(Submission),
    AwaitingConfirmation(PendingOverwrite),
}

pub trait OverwriteConfirmer {
    fn confirm_overwrite(&self, post_id: u64, slug: &str) -> impl Future<Output = bool> + Send;
}

/// Answers every confirmation the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl OverwriteConfirmer for FixedAnswer {
    async fn confirm_overwrite(&self, _post_id: u64, _slug: &str) -> bool {
        self.0
    }
}

/// Question posted to whoever owns the user interaction.
#[derive(Debug)]
pub struct ConfirmationRequest {
    pub post_id: u64,
    pub slug: String,
    pub reply: oneshot::Sender<bool>,
}

/// Posts each confirmation to a channel and waits for the reply.
///
/// A closed channel or a dropped reply counts as a decline.
#[derive(Debug, Clone)]
pub struct ChannelConfirmer {
    requests: mpsc::Sender<ConfirmationRequest>,
}

impl ChannelConfirmer {
    pub fn new(requests: mpsc::Sender<ConfirmationRequest>) -> Self {
        Self { requests }
    }

    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ConfirmationRequest>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

impl OverwriteConfirmer for ChannelConfirmer {
    async fn confirm_overwrite(&self, post_id: u64, slug: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmationRequest {
            post_id,
            slug: slug.to_string(),
            reply,
        };

        if self.requests.send(request).await.is_err() {
            debug!("Confirmation channel closed, treating as decline");
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct PublishWorkflow<R = CommonMarkRenderer> {
    site: Site,
    renderer: R,
}

impl PublishWorkflow<CommonMarkRenderer> {
    pub fn new(site: Site) -> Self {
        Self::with_renderer(site, CommonMarkRenderer::new())
    }
}

impl<R: MarkdownRenderer> PublishWorkflow<R> {
    pub fn with_renderer(site: Site, renderer: R) -> Self {
        Self { site, renderer }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    fn enter(&self, state: PublishState) {
        debug!("Publish workflow -> {:?}", state);
    }

    /// Credentials, title, slug, file, then categories; the first failure wins.
    pub async fn validate(&self, draft: &PostDraft) -> Result<ValidatedDraft, ValidationError> {
        self.enter(PublishState::ValidatingInput);
        self.site.validate()?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField {
                field: "title".to_string(),
            });
        }

        let slug = draft.slug.trim();
        if slug.is_empty() {
            return Err(ValidationError::MissingField {
                field: "slug".to_string(),
            });
        }

        if !is_readable_document(&draft.file_path).await {
            return Err(ValidationError::InvalidFile {
                path: draft.file_path.clone(),
            });
        }

        let category_ids = draft.category_ids()?;

        Ok(ValidatedDraft {
            title: title.to_string(),
            slug: slug.to_string(),
            file_path: draft.file_path.clone(),
            category_ids,
        })
    }

    /// Runs every step up to the submit, stopping early if the slug is taken.
    pub async fn prepare(&self, draft: &PostDraft) -> Result<Prepared, CoreError> {
        let validated = self.validate(draft).await?;

        self.enter(PublishState::CheckingCredentials);
        let client = self.site.connect()?;

        self.enter(PublishState::CheckingSlug);
        match client.find_post_by_slug(&validated.slug).await? {
            SlugLookup::NotFound => Ok(Prepared::Ready(Submission {
                client,
                draft: validated,
                target: PublishTarget::Create,
            })),
            SlugLookup::Found { post_id } => {
                self.enter(PublishState::AwaitingOverwriteConfirmation { post_id });
                info!(
                    "Slug '{}' already used by post {}",
                    validated.slug, post_id
                );
                Ok(Prepared::AwaitingConfirmation(PendingOverwrite {
                    client,
                    draft: validated,
                    post_id,
                }))
            }
        }
    }

    /// Reads and renders the document, then creates or updates the post.
    pub async fn submit(&self, submission: Submission) -> PublishResult {
        let Submission {
            client,
            draft,
            target,
        } = submission;
        self.enter(PublishState::Submitting { target });

        let source = tokio::fs::read_to_string(&draft.file_path)
            .await
            .map_err(|e| {
                debug!("Failed to read {}: {}", draft.file_path.display(), e);
                ValidationError::InvalidFile {
                    path: draft.file_path.clone(),
                }
            })?;
        let content = self.renderer.render(&source);

        let payload = PostPayload::new(
            draft.title,
            draft.slug,
            content,
            Local::now().naive_local(),
            draft.category_ids,
        );
        let status = client.submit_post(target, &payload).await?;

        self.enter(PublishState::Idle);
        Ok(PublishOutcome::Published { target, status })
    }

    /// Runs the whole workflow, asking `confirmer` when the slug is already taken.
    pub async fn run<C: OverwriteConfirmer>(
        &self,
        draft: &PostDraft,
        confirmer: &C,
    ) -> PublishResult {
        let submission = match self.prepare(draft).await? {
            Prepared::Ready(submission) => submission,
            Prepared::AwaitingConfirmation(pending) => {
                if confirmer
                    .confirm_overwrite(pending.post_id(), pending.slug())
                    .await
                {
                    pending.confirm()
                } else {
                    self.enter(PublishState::Idle);
                    return Ok(pending.decline());
                }
            }
        };
        self.submit(submission).await
    }
}

/// Publishes `draft` to the site described by `config`.
pub async fn publish<C: OverwriteConfirmer>(
    draft: &PostDraft,
    config: EndpointConfig,
    confirmer: &C,
) -> PublishResult {
    PublishWorkflow::new(Site::new(config))
        .run(draft, confirmer)
        .await
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

async fn is_readable_document(path: &Path) -> bool {
    if !has_document_extension(path) {
        return false;
    }
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => tokio::fs::File::open(path).await.is_ok(),
        _ => false,
    }
}
