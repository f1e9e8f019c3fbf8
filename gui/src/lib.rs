use iced::widget::{button, column, container, row, text, text_input, Column, TextInput};
use iced::{Command, Element, Length, Theme};
use publish_workflow::{
    CategoryList, PendingOverwrite, Prepared, PublishOutcome, PublishState, PublishWorkflow, Site,
    Submission, DOCUMENT_EXTENSIONS,
};
use publisher_core::{
    CoreError, EndpointConfig, ErrorReporter, PostDraft, PublishTarget, SettingsStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Workflow failure carried back to the UI thread.
pub type Failure = Arc<CoreError>;

#[derive(Debug, Clone)]
pub enum Message {
    HostChanged(String),
    UserChanged(String),
    PasswordChanged(String),
    TitleChanged(String),
    SlugChanged(String),
    FilePathChanged(String),
    SelectFile,
    FileSelected(Option<PathBuf>),
    CategoriesChanged(String),
    SaveConfiguration,
    ShowCategories,
    CategoriesListed(Result<CategoryList, Failure>),
    Publish,
    PublishPrepared(Result<Prepared, Failure>),
    ConfirmOverwrite,
    DeclineOverwrite,
    PublishFinished(Result<PublishOutcome, Failure>),
    DismissNotice,
}

/// Where the publish trigger is in its run. The button is enabled only in `Idle`.
#[derive(Debug, Clone)]
enum PublishPhase {
    Idle,
    Running {
        workflow: PublishWorkflow,
        state: PublishState,
    },
    AwaitingConfirmation {
        workflow: PublishWorkflow,
        pending: PendingOverwrite,
    },
}

pub struct App {
    settings: SettingsStore,
    host: String,
    user: String,
    password: String,
    title: String,
    slug: String,
    file_path: String,
    categories: String,
    publish: PublishPhase,
    listing_categories: bool,
    notice: Option<String>,
    reporter: ErrorReporter,
}

impl App {
    /// Loads the saved endpoint settings into the form.
    pub fn new(settings: SettingsStore) -> Self {
        let reporter = ErrorReporter::new();
        let (config, notice) = match settings.load() {
            Ok(config) => (config, None),
            Err(e) => (EndpointConfig::default(), Some(reporter.report(&e))),
        };

        Self {
            settings,
            host: config.host,
            user: config.user,
            password: config.password,
            title: String::new(),
            slug: String::new(),
            file_path: String::new(),
            categories: String::new(),
            publish: PublishPhase::Idle,
            listing_categories: false,
            notice,
            reporter,
        }
    }

    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::new(&self.host, &self.user, &self.password)
    }

    pub fn draft(&self) -> PostDraft {
        PostDraft::new(&self.title, &self.slug, PathBuf::from(self.file_path.trim()))
            .with_categories(&self.categories)
    }

    pub fn can_publish(&self) -> bool {
        matches!(self.publish, PublishPhase::Idle)
    }

    pub fn can_list_categories(&self) -> bool {
        !self.listing_categories
    }

    pub fn awaiting_confirmation(&self) -> Option<&PendingOverwrite> {
        match &self.publish {
            PublishPhase::AwaitingConfirmation { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn publish_state(&self) -> PublishState {
        match &self.publish {
            PublishPhase::Idle => PublishState::Idle,
            PublishPhase::Running { state, .. } => *state,
            PublishPhase::AwaitingConfirmation { pending, .. } => {
                PublishState::AwaitingOverwriteConfirmation {
                    post_id: pending.post_id(),
                }
            }
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::HostChanged(value) => self.host = value,
            Message::UserChanged(value) => self.user = value,
            Message::PasswordChanged(value) => self.password = value,
            Message::TitleChanged(value) => self.title = value,
            Message::SlugChanged(value) => self.slug = value,
            Message::FilePathChanged(value) => self.file_path = value,
            Message::SelectFile => {
                return Command::perform(pick_document(), Message::FileSelected);
            }
            Message::FileSelected(Some(path)) => self.file_path = path.display().to_string(),
            Message::FileSelected(None) => debug!("File selection cancelled"),
            Message::CategoriesChanged(value) => self.categories = value,
            Message::SaveConfiguration => self.save_configuration(),
            Message::ShowCategories => return self.show_categories(),
            Message::CategoriesListed(result) => self.categories_listed(result),
            Message::Publish => return self.start_publish(),
            Message::PublishPrepared(result) => return self.publish_prepared(result),
            Message::ConfirmOverwrite => return self.confirm_overwrite(),
            Message::DeclineOverwrite => self.decline_overwrite(),
            Message::PublishFinished(result) => self.publish_finished(result),
            Message::DismissNotice => self.notice = None,
        }
        Command::none()
    }

    fn save_configuration(&mut self) {
        match self.settings.save(&self.endpoint_config()) {
            Ok(()) => self.notice = Some("Configuration saved".to_string()),
            Err(e) => self.notice = Some(self.reporter.report(&e)),
        }
    }

    fn show_categories(&mut self) -> Command<Message> {
        if self.listing_categories {
            debug!("Category listing already in flight");
            return Command::none();
        }

        self.listing_categories = true;
        let site = Site::new(self.endpoint_config());
        Command::perform(
            async move { site.list_categories().await.map_err(Arc::new) },
            Message::CategoriesListed,
        )
    }

    fn categories_listed(&mut self, result: Result<CategoryList, Failure>) {
        self.listing_categories = false;
        self.notice = Some(match result {
            Ok(list) if list.is_empty() => "No categories found".to_string(),
            Ok(list) => list.format(),
            Err(e) => self.reporter.report(&e),
        });
    }

    fn start_publish(&mut self) -> Command<Message> {
        if !self.can_publish() {
            debug!("Publish already in flight");
            return Command::none();
        }

        let workflow = PublishWorkflow::new(Site::new(self.endpoint_config()));
        let draft = self.draft();
        info!("Publishing '{}'", draft.slug);
        self.publish = PublishPhase::Running {
            workflow: workflow.clone(),
            state: PublishState::ValidatingInput,
        };

        Command::perform(
            async move { workflow.prepare(&draft).await.map_err(Arc::new) },
            Message::PublishPrepared,
        )
    }

    fn publish_prepared(&mut self, result: Result<Prepared, Failure>) -> Command<Message> {
        let workflow = match &self.publish {
            PublishPhase::Running { workflow, .. } => workflow.clone(),
            _ => {
                warn!("Slug check finished with no publish in flight");
                return Command::none();
            }
        };

        match result {
            Ok(Prepared::Ready(submission)) => self.submit(workflow, submission),
            Ok(Prepared::AwaitingConfirmation(pending)) => {
                self.publish = PublishPhase::AwaitingConfirmation { workflow, pending };
                Command::none()
            }
            Err(e) => {
                let message = self.reporter.report(&e);
                self.finish_publish(Some(message));
                Command::none()
            }
        }
    }

    fn confirm_overwrite(&mut self) -> Command<Message> {
        match std::mem::replace(&mut self.publish, PublishPhase::Idle) {
            PublishPhase::AwaitingConfirmation { workflow, pending } => {
                self.submit(workflow, pending.confirm())
            }
            other => {
                self.publish = other;
                Command::none()
            }
        }
    }

    fn decline_overwrite(&mut self) {
        if let PublishPhase::AwaitingConfirmation { pending, .. } = &self.publish {
            let outcome = pending.clone().decline();
            self.publish_finished(Ok(outcome));
        }
    }

    fn submit(&mut self, workflow: PublishWorkflow, submission: Submission) -> Command<Message> {
        self.publish = PublishPhase::Running {
            workflow: workflow.clone(),
            state: PublishState::Submitting {
                target: submission.target(),
            },
        };

        Command::perform(
            async move { workflow.submit(submission).await.map_err(Arc::new) },
            Message::PublishFinished,
        )
    }

    fn publish_finished(&mut self, result: Result<PublishOutcome, Failure>) {
        let message = match result {
            Ok(PublishOutcome::Published {
                target: PublishTarget::Create,
                ..
            }) => Some("Published successfully".to_string()),
            Ok(PublishOutcome::Published {
                target: PublishTarget::Update { post_id },
                ..
            }) => Some(format!("Published successfully, post {} updated", post_id)),
            Ok(PublishOutcome::Cancelled) => None,
            Err(e) => Some(self.reporter.report(&e)),
        };
        self.finish_publish(message);
    }

    /// Ends the publish run and re-enables the trigger.
    fn finish_publish(&mut self, notice: Option<String>) {
        if self.can_publish() {
            warn!("Publish finished twice; ignoring");
            return;
        }
        self.publish = PublishPhase::Idle;
        if notice.is_some() {
            self.notice = notice;
        }
    }

    fn status_line(&self) -> Option<String> {
        let status = match self.publish_state() {
            PublishState::Idle => return None,
            PublishState::ValidatingInput
            | PublishState::CheckingCredentials
            | PublishState::CheckingSlug => "Checking slug...".to_string(),
            PublishState::AwaitingOverwriteConfirmation { post_id } => {
                format!("Waiting for confirmation to overwrite post {}", post_id)
            }
            PublishState::Submitting { .. } => "Publishing...".to_string(),
        };
        Some(status)
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let title: Element<Message, Theme> = text("WordPress Native Post").size(24).into();

        let connection = column![
            labeled(
                "Blog domain or IP",
                text_input("blog.example.com", &self.host).on_input(Message::HostChanged)
            ),
            labeled(
                "User",
                text_input("user name", &self.user).on_input(Message::UserChanged)
            ),
            labeled(
                "REST API password",
                text_input("application password", &self.password)
                    .on_input(Message::PasswordChanged)
                    .secure(true)
            ),
            row![
                button("Save configuration").on_press(Message::SaveConfiguration),
                button("Show categories")
                    .on_press_maybe(self.can_list_categories().then_some(Message::ShowCategories)),
            ]
            .spacing(10),
        ]
        .spacing(10);

        let post = column![
            labeled(
                "Title",
                text_input("post title", &self.title).on_input(Message::TitleChanged)
            ),
            labeled(
                "Slug",
                text_input("unique-english-slug", &self.slug).on_input(Message::SlugChanged)
            ),
            labeled(
                "Categories",
                text_input("comma-separated ids, empty for default", &self.categories)
                    .on_input(Message::CategoriesChanged)
            ),
            labeled(
                "File (.md or .txt)",
                text_input("/path/to/post.md", &self.file_path)
                    .on_input(Message::FilePathChanged)
            ),
            button("Select file").on_press(Message::SelectFile),
            button("Publish").on_press_maybe(self.can_publish().then_some(Message::Publish)),
        ]
        .spacing(10);

        let mut content = Column::new().spacing(20).push(title);

        if let Some(notice) = &self.notice {
            content = content.push(
                container(
                    column![
                        text(notice).size(14),
                        button("OK").on_press(Message::DismissNotice)
                    ]
                    .spacing(10),
                )
                .padding(10),
            );
        }

        if let Some(pending) = self.awaiting_confirmation() {
            content = content.push(
                container(
                    column![
                        text(format!(
                            "A post with slug '{}' already exists (ID {}). Overwrite it?",
                            pending.slug(),
                            pending.post_id()
                        ))
                        .size(14),
                        row![
                            button("Overwrite").on_press(Message::ConfirmOverwrite),
                            button("Cancel").on_press(Message::DeclineOverwrite),
                        ]
                        .spacing(10),
                    ]
                    .spacing(10),
                )
                .padding(10),
            );
        }

        if let Some(status) = self.status_line() {
            content = content.push(text(status).size(12));
        }

        let main_content: Element<Message, Theme> = content.push(connection).push(post).into();

        container(main_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }
}

async fn pick_document() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select local file")
        .add_filter("Markdown/Text", DOCUMENT_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

fn labeled<'a>(label: &'a str, input: TextInput<'a, Message>) -> Element<'a, Message, Theme> {
    column![text(label).size(12), input.padding(8)]
        .spacing(4)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use publisher_core::{CredentialField, ValidationError, WordPressApiError};
    use std::io::Write;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("upload.toml"));
        store
            .save(&EndpointConfig::new("blog.example.com", "alice", "secret"))
            .unwrap();
        (App::new(store), dir)
    }

    fn failure(error: impl Into<CoreError>) -> Failure {
        Arc::new(error.into())
    }

    /// Runs the slug check against a site where `hello` is already post 7.
    async fn existing_post_overwrite(
        server: &MockServer,
    ) -> (PendingOverwrite, tempfile::NamedTempFile) {
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param("slug", "hello"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": 7}])),
            )
            .mount(server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "# Hi").unwrap();

        let site = Site::with_origin(
            EndpointConfig::new("blog.example.com", "alice", "secret"),
            server.uri(),
        );
        let draft = PostDraft::new("Hello", "hello", file.path());
        match PublishWorkflow::new(site).prepare(&draft).await.unwrap() {
            Prepared::AwaitingConfirmation(pending) => (pending, file),
            Prepared::Ready(_) => panic!("expected the slug to be taken"),
        }
    }

    #[test]
    fn test_loads_saved_configuration() {
        let (app, _dir) = app();
        assert_eq!(
            app.endpoint_config(),
            EndpointConfig::new("blog.example.com", "alice", "secret")
        );
        assert!(app.can_publish());
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_save_configuration() {
        let (mut app, dir) = app();
        let _ = app.update(Message::HostChanged("other.example.com".to_string()));
        let _ = app.update(Message::SaveConfiguration);

        assert_eq!(app.notice(), Some("Configuration saved"));
        let reloaded = SettingsStore::at(dir.path().join("upload.toml"))
            .load()
            .unwrap();
        assert_eq!(reloaded.host, "other.example.com");
    }

    #[test]
    fn test_draft_from_form() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::TitleChanged("Hello".to_string()));
        let _ = app.update(Message::SlugChanged("hello".to_string()));
        let _ = app.update(Message::FilePathChanged(" /tmp/hello.md ".to_string()));
        let _ = app.update(Message::CategoriesChanged("2,3".to_string()));

        let draft = app.draft();
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.file_path, PathBuf::from("/tmp/hello.md"));
        assert_eq!(draft.categories, "2,3");
    }

    #[test]
    fn test_publish_disables_trigger_until_failure_reported() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::Publish);
        assert!(!app.can_publish());

        let _ = app.update(Message::Publish);
        assert!(!app.can_publish());

        let _ = app.update(Message::PublishPrepared(Err(failure(
            ValidationError::MissingCredentials {
                field: CredentialField::Password,
            },
        ))));
        assert!(app.can_publish());
        assert_eq!(app.notice(), Some("Missing REST API password."));
    }

    #[test]
    fn test_publish_success_reenables_trigger() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::Publish);
        let _ = app.update(Message::PublishFinished(Ok(PublishOutcome::Published {
            target: PublishTarget::Update { post_id: 7 },
            status: 200,
        })));

        assert!(app.can_publish());
        assert_eq!(
            app.notice(),
            Some("Published successfully, post 7 updated")
        );
    }

    #[test]
    fn test_publish_failure_is_reported() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::Publish);
        let _ = app.update(Message::PublishFinished(Err(failure(
            WordPressApiError::PublishFailed {
                status: 500,
                body: "oops".to_string(),
            },
        ))));

        assert!(app.can_publish());
        assert!(app.notice().unwrap().contains("500"));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::PublishFinished(Ok(PublishOutcome::Cancelled)));
        assert!(app.can_publish());
        assert!(app.notice().is_none());
    }

    #[tokio::test]
    async fn test_declined_overwrite_reenables_trigger_once() {
        let server = MockServer::start().await;
        let (pending, _file) = existing_post_overwrite(&server).await;
        let (mut app, _dir) = app();
        let _ = app.update(Message::SaveConfiguration);

        let _ = app.update(Message::Publish);
        let _ = app.update(Message::PublishPrepared(Ok(Prepared::AwaitingConfirmation(
            pending,
        ))));
        assert!(!app.can_publish());
        assert_eq!(app.awaiting_confirmation().map(|p| p.post_id()), Some(7));
        assert_eq!(
            app.publish_state(),
            PublishState::AwaitingOverwriteConfirmation { post_id: 7 }
        );

        let _ = app.update(Message::DeclineOverwrite);
        assert!(app.can_publish());
        assert!(app.awaiting_confirmation().is_none());
        assert_eq!(app.notice(), Some("Configuration saved"));

        let _ = app.update(Message::DeclineOverwrite);
        assert!(app.can_publish());
        assert_eq!(app.publish_state(), PublishState::Idle);
        assert_eq!(app.notice(), Some("Configuration saved"));
    }

    #[tokio::test]
    async fn test_confirmed_overwrite_submits_update() {
        let server = MockServer::start().await;
        let (pending, _file) = existing_post_overwrite(&server).await;
        let (mut app, _dir) = app();

        let _ = app.update(Message::Publish);
        let _ = app.update(Message::PublishPrepared(Ok(Prepared::AwaitingConfirmation(
            pending,
        ))));
        let _ = app.update(Message::ConfirmOverwrite);

        assert!(!app.can_publish());
        assert!(app.awaiting_confirmation().is_none());
        assert_eq!(
            app.publish_state(),
            PublishState::Submitting {
                target: PublishTarget::Update { post_id: 7 }
            }
        );

        let _ = app.update(Message::DeclineOverwrite);
        assert!(!app.can_publish());

        let _ = app.update(Message::PublishFinished(Ok(PublishOutcome::Published {
            target: PublishTarget::Update { post_id: 7 },
            status: 200,
        })));
        assert!(app.can_publish());
        assert_eq!(app.notice(), Some("Published successfully, post 7 updated"));
    }

    #[test]
    fn test_selected_file_fills_path() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::FileSelected(Some(PathBuf::from("/tmp/post.md"))));
        assert_eq!(app.draft().file_path, PathBuf::from("/tmp/post.md"));

        let _ = app.update(Message::FileSelected(None));
        assert_eq!(app.draft().file_path, PathBuf::from("/tmp/post.md"));

        let _ = app.update(Message::FilePathChanged("/tmp/other.txt".to_string()));
        assert_eq!(app.draft().file_path, PathBuf::from("/tmp/other.txt"));
    }

    #[test]
    fn test_dark_theme() {
        let (app, _dir) = app();
        assert!(matches!(app.theme(), Theme::Dark));
    }

    #[test]
    fn test_category_listing_gates_trigger() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::ShowCategories);
        assert!(!app.can_list_categories());
        assert!(app.can_publish());

        let list = CategoryList::new(vec![publisher_core::Category {
            id: 1,
            name: "Uncategorized".to_string(),
        }]);
        let _ = app.update(Message::CategoriesListed(Ok(list)));
        assert!(app.can_list_categories());
        assert_eq!(app.notice(), Some("1\tUncategorized"));

        let _ = app.update(Message::DismissNotice);
        assert!(app.notice().is_none());
    }
}
