// UI layer: the terminal side of the deploy flow. Prompts use `dialoguer`,
// the wait-for-Enter pause reads raw keys through `crossterm`, and the
// deploy step shows an `indicatif` spinner.

use crate::api::ApiClient;
use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::databases::DatabaseChoice;
use crate::deploy::{Deployer, Deployment, Presenter};
use crate::names::RandomWords;
use crate::store::JsonFileStore;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Stylize};
use crossterm::terminal;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::Path;
use std::time::Duration;

const POINTER: &str = "❯";
const TICK: &str = "✔";
const CROSS: &str = "✖";
const INFO: &str = "ℹ";

/// Run the whole interactive flow and print the summary. Blocks until the
/// deployment is done, fails, or the user backs out.
pub fn run(settings: &Settings, cancel: &CancelToken) -> anyhow::Result<Deployment> {
    let api = ApiClient::new(&settings.api_url)?;
    let mut store = JsonFileStore::new(&settings.config_dir, crate::config::APP_NAME);
    let mut presenter = TerminalPresenter::default();
    let mut words = RandomWords(rand::thread_rng());

    let deployment = Deployer {
        store: &mut store,
        api: &api,
        presenter: &mut presenter,
        words: &mut words,
        cancel,
        token_url: &settings.token_url,
        out_dir: &settings.out_dir,
    }
    .run()?;

    println!("{}", summary(&deployment));
    Ok(deployment)
}

/// Lines shown once the certificate is on disk.
pub fn summary(deployment: &Deployment) -> String {
    let info = INFO.with(Color::Blue);
    [
        format!("{info} Connect via CLI:"),
        format!("  {}", deployment.cli),
        String::new(),
        format!("{info} Connect directly:"),
        format!("  {}", deployment.direct),
        String::new(),
        format!(
            "{info} Certificate saved at {} in the current directory",
            shown_path(&deployment.certificate_path).display()
        ),
        String::new(),
    ]
    .join("\n")
}

/// Paths in the working directory are shown by file name alone.
fn shown_path(path: &Path) -> &Path {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file)) if dir.as_os_str().is_empty() || dir == Path::new(".") => {
            Path::new(file)
        }
        _ => path,
    }
}

fn log(message: &str, color: Color) {
    println!("{} {}", POINTER.with(color), message);
}

#[derive(Default)]
pub struct TerminalPresenter {
    spinner: Option<ProgressBar>,
}

impl Presenter for TerminalPresenter {
    fn token_setup(&mut self, token_url: &str) -> io::Result<Option<()>> {
        log(
            "To use Pronto, you need to enter your Compose access token",
            Color::DarkGrey,
        );
        log(
            &format!("Press Enter, then create a token at {token_url}"),
            Color::DarkGrey,
        );
        Ok(wait_for_enter()?.then_some(()))
    }

    fn ask_token(&mut self) -> io::Result<Option<String>> {
        match Input::<String>::new()
            .with_prompt("Enter Compose token")
            .interact_text()
        {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn ask_database(&mut self, choices: &[DatabaseChoice]) -> io::Result<Option<DatabaseChoice>> {
        let labels: Vec<&str> = choices.iter().map(|db| db.name).collect();
        // Esc or q returns `None`.
        let picked = Select::new()
            .with_prompt("Select a database to deploy")
            .items(&labels)
            .default(0)
            .interact_opt()?;
        Ok(picked.and_then(|i| choices.get(i).copied()))
    }

    fn deploy_started(&mut self, database: &DatabaseChoice) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Deploying {}", database.name));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn deploy_finished(&mut self, succeeded: bool) {
        let Some(spinner) = self.spinner.take() else {
            return;
        };
        spinner.set_style(
            ProgressStyle::with_template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        if succeeded {
            spinner.finish_with_message(format!("{} Deployed", TICK.green()));
        } else {
            spinner.abandon_with_message(format!("{} Deployment failed", CROSS.red()));
        }
    }
}

/// Block until Enter (`true`) or Esc / Ctrl-C (`false`).
fn wait_for_enter() -> io::Result<bool> {
    terminal::enable_raw_mode()?;
    let outcome = read_until_decision();
    terminal::disable_raw_mode()?;
    outcome
}

fn read_until_decision() -> io::Result<bool> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(true),
                KeyCode::Esc => return Ok(false),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(false)
                }
                _ => {}
            }
        }
    }
}
