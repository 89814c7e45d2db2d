mod api;
mod board;
mod client;
mod config;
mod db;
mod models;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::board::ProjectBoard;
use crate::client::ApiClient;
use crate::config::Config;
use crate::ui::{
    clients::{handle_input as handle_clients_input, render_clients, ClientAction, ClientsState},
    dashboard::{
        handle_input as handle_dashboard_input, render_dashboard, DashboardAction, DashboardState,
    },
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState,
    },
};

#[derive(Parser)]
#[command(name = "project-tracker", version, about = "Track projects, deadlines and clients")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the project REST API
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open the terminal dashboard against a running API
    Dashboard {
        /// Base URL of the API, overrides API_URL
        #[arg(long)]
        api_url: Option<String>,
    },
}

// Represents the current screen in the app
enum AppScreen {
    Dashboard,
    ProjectWizard,
    Clients,
}

// Main application state
struct AppState {
    board: ProjectBoard<ApiClient>,
    screen: AppScreen,
    dashboard_state: DashboardState,
    project_wizard_state: Option<ProjectWizardState>,
    clients_state: Option<ClientsState>,
}

impl AppState {
    fn new(board: ProjectBoard<ApiClient>) -> Self {
        Self {
            board,
            screen: AppScreen::Dashboard,
            dashboard_state: DashboardState::new(),
            project_wizard_state: None,
            clients_state: None,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::init()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .init();

            api::serve(&config).await
        }
        Command::Dashboard { api_url } => {
            if api_url.is_some() {
                config.api_url = api_url;
            }
            // The terminal belongs to the UI, so logs go to a file.
            let log_file = File::options().create(true).append(true).open(&config.log_file)?;
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
                .init();

            run_dashboard(&config).await
        }
    }
}

async fn run_dashboard(config: &Config) -> Result<()> {
    let api = ApiClient::new(config.api_url());
    tracing::info!(api = api.base_url(), "starting dashboard");

    // A failed first load is logged by the board; the dashboard starts empty.
    let mut board = ProjectBoard::new(api);
    let _ = board.refresh().await;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(board);
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "dashboard stopped");
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        let today = chrono::Local::now().date_naive();
        let clients = app_state.board.clients();

        terminal.draw(|f| match app_state.screen {
            AppScreen::Dashboard => {
                render_dashboard(f, &mut app_state.dashboard_state, app_state.board.projects(), today);
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_clients(f, state, &clients);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
            AppScreen::Clients => handle_clients_screen(app_state, clients.len())?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

// Remote failures are already logged by the board and otherwise ignored here.
async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_dashboard_input(&mut app_state.dashboard_state, app_state.board.projects())? {
        Some(DashboardAction::Quit) => return Ok(true),
        Some(DashboardAction::NewProject) => {
            let today = chrono::Local::now().date_naive();
            app_state.project_wizard_state = Some(ProjectWizardState::new(today));
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(DashboardAction::ShowClients) => {
            app_state.clients_state = Some(ClientsState::new());
            app_state.screen = AppScreen::Clients;
        }
        Some(DashboardAction::ToggleFinish(id)) => {
            let _ = app_state.board.toggle_finish(id).await;
        }
        Some(DashboardAction::DeleteProject(id)) => {
            let _ = app_state.board.remove(id).await;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.project_wizard_state {
        match handle_project_wizard_input(state)? {
            Some(ProjectWizardAction::Cancel) => {
                app_state.project_wizard_state = None;
                app_state.screen = AppScreen::Dashboard;
            }
            Some(ProjectWizardAction::Save(project)) => {
                let _ = app_state.board.add(project).await;
                app_state.project_wizard_state = None;
                app_state.screen = AppScreen::Dashboard;
            }
            None => {}
        }
    }

    Ok(false)
}

fn handle_clients_screen(app_state: &mut AppState, client_count: usize) -> Result<bool> {
    if let Some(state) = &mut app_state.clients_state {
        match handle_clients_input(state, client_count)? {
            Some(ClientAction::Back) => {
                app_state.clients_state = None;
                app_state.screen = AppScreen::Dashboard;
            }
            None => {}
        }
    }

    Ok(false)
}
