mod api;
mod config;
mod datasets;
mod error;
mod reports;
mod storage;
mod ui;

use std::collections::HashMap;

use iced::widget::{column, container, row};
use iced::{Element, Length, Task};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::ReportsApi;
use config::AppConfig;
use datasets::column_select::ColumnSelection;
use datasets::{Dataset, DatasetInfo, ReportColumn};
use reports::drag_drop::{DropChoice, DropTarget, EditSession, MoveRequest};
use reports::{Collection, ItemUid};
use storage::Preferences;
use ui::style;

fn main() -> iced::Result {
    init_tracing();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            eprintln!("dealerdesk: {err}");
            std::process::exit(2);
        }
    };
    info!(api = %config.api_base_url, user = %config.user_uid, "starting");

    iced::application("DealerDesk Reports", update, view)
        .theme(|_| style::app_theme())
        .window_size((1180.0, 780.0))
        .run_with(move || App::new(config))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

struct App {
    config: AppConfig,
    api: ReportsApi,
    session: Option<EditSession>,
    selected_node: Option<ItemUid>,
    catalog: Vec<DatasetInfo>,
    columns: HashMap<Dataset, Vec<ReportColumn>>,
    selection: ColumnSelection,
    preferences: Preferences,
    count_info: bool,
    loading: bool,
    saving: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl App {
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let mut load_error = None;
        let (preferences, cached_catalog) = match storage::open_db(&config.state_db_path()) {
            Ok(conn) => {
                let preferences = storage::load_preferences(&conn).unwrap_or_else(|err| {
                    warn!(%err, "ignoring stored preferences");
                    Preferences::default()
                });
                let catalog = storage::load_catalog(&conn).unwrap_or_else(|err| {
                    warn!(%err, "ignoring cached dataset catalog");
                    Vec::new()
                });
                (preferences, catalog)
            }
            Err(err) => {
                load_error = Some(err.to_string());
                (Preferences::default(), Vec::new())
            }
        };

        let mut selection = ColumnSelection::new();
        if let Some(dataset) = preferences.browsing {
            selection.browse(dataset);
        }

        let app = Self {
            api: ReportsApi::from_config(&config),
            count_info: preferences.count_info_or(config.count_info),
            preferences,
            config,
            session: None,
            selected_node: None,
            catalog: cached_catalog,
            columns: HashMap::new(),
            selection,
            loading: true,
            saving: false,
            error: load_error,
            notice: None,
        };

        let task = Task::batch([app.load_collections(), app.load_catalog()]);
        (app, task)
    }

    fn load_collections(&self) -> Task<Message> {
        Task::perform(
            fetch_collections(self.api.clone(), self.config.user_uid.clone()),
            Message::CollectionsLoaded,
        )
    }

    fn load_catalog(&self) -> Task<Message> {
        Task::perform(fetch_datasets(self.api.clone()), Message::CatalogLoaded)
    }

    /// Fetch columns of the browsed dataset unless they are already here.
    fn load_browsed_columns(&self) -> Task<Message> {
        match self.selection.browsing() {
            Some(dataset) if !self.columns.contains_key(&dataset) => Task::perform(
                fetch_columns(self.api.clone(), dataset),
                move |result| Message::ColumnsLoaded { dataset, result },
            ),
            _ => Task::none(),
        }
    }

    fn persist_preferences(&mut self) {
        self.preferences.browsing = self.selection.browsing();
        let result = storage::open_db(&self.config.state_db_path())
            .and_then(|conn| storage::save_preferences(&conn, &self.preferences));
        if let Err(err) = result {
            warn!(%err, "failed to store preferences");
        }
    }

    fn apply_edit(&mut self, edit: impl FnOnce(&EditSession, &str) -> Result<EditSession, error::TreeError>) {
        if self.saving {
            return;
        }
        let (Some(session), Some(node_id)) = (&self.session, &self.selected_node) else {
            return;
        };

        match edit(session, node_id.as_str()) {
            Ok(edited) => {
                self.session = Some(edited);
                self.error = None;
            }
            Err(err) => {
                warn!(%err, "rejected tree edit");
                self.error = Some(err.to_string());
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    ReloadPressed,
    SavePressed,
    CountInfoToggled(bool),
    CollectionsLoaded(Result<Vec<Collection>, String>),
    SaveFinished(Result<(), String>),
    CatalogLoaded(Result<Vec<DatasetInfo>, String>),
    ColumnsLoaded {
        dataset: Dataset,
        result: Result<Vec<ReportColumn>, String>,
    },
    NodeSelected(ItemUid),
    MoveUpPressed,
    MoveDownPressed,
    OutdentPressed,
    MoveIntoSelected(DropChoice),
    DatasetBrowsed(Dataset),
    ColumnToggled(ReportColumn, bool),
    ColumnRemoved(usize),
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::ReloadPressed => {
            if app.loading || app.saving {
                return Task::none();
            }
            app.loading = true;
            app.error = None;
            app.notice = None;
            Task::batch([app.load_collections(), app.load_catalog()])
        }
        Message::SavePressed => {
            if app.saving {
                return Task::none();
            }
            let Some(session) = &app.session else {
                return Task::none();
            };

            app.saving = true;
            app.error = None;
            let payload = session.to_collections();
            Task::perform(
                save_collections(app.api.clone(), app.config.user_uid.clone(), payload),
                Message::SaveFinished,
            )
        }
        Message::CountInfoToggled(enabled) => {
            app.count_info = enabled;
            app.preferences.count_info = Some(enabled);
            app.session = app.session.as_ref().map(|session| session.with_count_info(enabled));
            app.persist_preferences();
            Task::none()
        }
        Message::CollectionsLoaded(result) => {
            app.loading = false;
            match result {
                Ok(collections) => {
                    let session = EditSession::new(&collections, app.count_info);
                    app.notice = Some(format!(
                        "Loaded {} collections with {} reports",
                        collections.len(),
                        session.document_count()
                    ));
                    app.session = Some(session);
                    app.selected_node = None;
                }
                Err(err) => {
                    error!(%err, "failed to load report collections");
                    app.error = Some(err);
                }
            }
            Task::none()
        }
        Message::SaveFinished(result) => {
            app.saving = false;
            match result {
                Ok(()) => {
                    // The saved layout becomes the new clean baseline.
                    app.session = app
                        .session
                        .as_ref()
                        .map(|session| EditSession::new(&session.to_collections(), app.count_info));
                    app.notice = Some("Collection layout saved".to_string());
                }
                Err(err) => {
                    error!(%err, "failed to save report collections");
                    app.error = Some(err);
                }
            }
            Task::none()
        }
        Message::CatalogLoaded(result) => {
            match result {
                Ok(catalog) => {
                    let cached = storage::open_db(&app.config.state_db_path())
                        .and_then(|conn| storage::save_catalog(&conn, &catalog));
                    if let Err(err) = cached {
                        warn!(%err, "failed to cache dataset catalog");
                    }
                    app.catalog = catalog;
                }
                Err(err) => {
                    warn!(%err, cached = app.catalog.len(), "dataset catalog unavailable");
                    if app.catalog.is_empty() {
                        app.error = Some(err);
                    } else {
                        app.notice = Some("Dataset catalog unavailable, using cached copy".to_string());
                    }
                }
            }

            if app.selection.browsing().is_none() {
                if let Some(first) = app.selection.selectable_datasets(&app.catalog).first() {
                    app.selection.browse(*first);
                }
            }
            app.load_browsed_columns()
        }
        Message::ColumnsLoaded { dataset, result } => {
            match result {
                Ok(columns) => {
                    app.columns.insert(dataset, columns);
                }
                Err(err) => {
                    error!(%dataset, %err, "failed to load dataset columns");
                    app.error = Some(err);
                }
            }
            Task::none()
        }
        Message::NodeSelected(node_id) => {
            if app.selected_node.as_deref() == Some(node_id.as_str()) {
                app.selected_node = None;
            } else {
                app.selected_node = Some(node_id);
            }
            Task::none()
        }
        Message::MoveUpPressed => {
            app.apply_edit(|session, node_id| session.move_up(node_id));
            Task::none()
        }
        Message::MoveDownPressed => {
            app.apply_edit(|session, node_id| session.move_down(node_id));
            Task::none()
        }
        Message::OutdentPressed => {
            app.apply_edit(|session, node_id| session.outdent(node_id));
            Task::none()
        }
        Message::MoveIntoSelected(choice) => {
            app.apply_edit(|session, node_id| {
                session.move_node(&MoveRequest {
                    node_id: node_id.to_string(),
                    target: DropTarget::Into {
                        parent_id: choice.id,
                        index: usize::MAX,
                    },
                })
            });
            Task::none()
        }
        Message::DatasetBrowsed(dataset) => {
            app.selection.browse(dataset);
            app.persist_preferences();
            app.load_browsed_columns()
        }
        Message::ColumnToggled(column, checked) => {
            match app.selection.toggle(column, checked, &app.catalog) {
                Ok(()) => app.error = None,
                Err(err) => app.error = Some(err.to_string()),
            }
            app.load_browsed_columns()
        }
        Message::ColumnRemoved(index) => {
            app.selection.remove_at(index, &app.catalog);
            app.load_browsed_columns()
        }
    }
}

fn view(app: &App) -> Element<'_, Message> {
    let header = ui::header::view(ui::header::HeaderState {
        user_uid: &app.config.user_uid,
        count_info: app.count_info,
        dirty: app.session.as_ref().is_some_and(EditSession::is_dirty),
        loading: app.loading,
        saving: app.saving,
    });

    let tree = container(ui::collection_tree::view(
        app.session.as_ref(),
        app.selected_node.as_deref(),
        app.saving,
    ))
    .width(400)
    .height(Length::Fill);

    let browsed_columns = app
        .selection
        .browsing()
        .and_then(|dataset| app.columns.get(&dataset))
        .map(Vec::as_slice);
    let columns = container(ui::column_select::view(ui::column_select::ColumnSelectState {
        catalog: &app.catalog,
        selection: &app.selection,
        columns: browsed_columns,
    }))
    .width(Length::Fill)
    .height(Length::Fill)
    .style(|_| style::flat_surface_style(style::SURFACE_0));

    let status = ui::header::status_line(app.error.as_deref(), app.notice.as_deref());

    container(
        column![header, row![tree, columns].spacing(1).height(Length::Fill), status]
            .spacing(1)
            .height(Length::Fill)
            .width(Length::Fill),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .style(|_| style::flat_surface_style(style::BG))
    .into()
}

async fn fetch_collections(api: ReportsApi, user_uid: String) -> Result<Vec<Collection>, String> {
    api.fetch_collections(&user_uid).await.map_err(|e| e.to_string())
}

async fn save_collections(api: ReportsApi, user_uid: String, collections: Vec<Collection>) -> Result<(), String> {
    api.save_collections(&user_uid, &collections)
        .await
        .map_err(|e| e.to_string())
}

async fn fetch_datasets(api: ReportsApi) -> Result<Vec<DatasetInfo>, String> {
    api.fetch_datasets().await.map_err(|e| e.to_string())
}

async fn fetch_columns(api: ReportsApi, dataset: Dataset) -> Result<Vec<ReportColumn>, String> {
    api.fetch_columns(dataset).await.map_err(|e| e.to_string())
}
