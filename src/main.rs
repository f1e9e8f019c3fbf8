use gui::App;
use iced::{Application, Settings};
use publisher_core::{CoreError, SettingsStore};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "wp_publisher=debug,gui=debug,publish_workflow=debug,wordpress_client=info";

/// Overrides where the endpoint settings are read from and saved to.
const SETTINGS_PATH_ENV: &str = "WP_PUBLISHER_SETTINGS";

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting WordPress Native Post");

    let store = match std::env::var_os(SETTINGS_PATH_ENV) {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::default_location()?,
    };
    tracing::debug!("Using settings at {}", store.path().display());

    let mut settings = Settings::with_flags(store);
    settings.window = iced::window::Settings {
        size: iced::Size::new(640.0, 760.0),
        min_size: Some(iced::Size::new(480.0, 600.0)),
        ..Default::default()
    };

    PublisherApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        CoreError::Internal {
            message: format!("GUI error: {e}"),
        }
    })
}

struct PublisherApp {
    app: App,
}

impl Application for PublisherApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = SettingsStore;

    fn new(store: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (Self { app: App::new(store) }, iced::Command::none())
    }

    fn title(&self) -> String {
        "wordpress-native-post".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        self.app.update(message)
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }

    fn theme(&self) -> Self::Theme {
        self.app.theme()
    }
}
