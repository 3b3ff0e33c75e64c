// Deploy flow: walks a fixed sequence of states from "no token" to
// "certificate on disk". The terminal UI plugs in through `Presenter`;
// storage and the API are passed in, so the whole flow runs in tests
// without a terminal or network.

use crate::api::{AccountId, ApiError, DeploymentApi, DeploymentResult};
use crate::cancel::CancelToken;
use crate::databases::{DatabaseChoice, DATABASES};
use crate::names::{deployment_name, WordSource};
use crate::store::{CredentialStore, StoreError, TOKEN_KEY};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Certificates may arrive line-wrapped or without padding.
const CERTIFICATE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("credential store failed")]
    CredentialStore(#[from] StoreError),

    #[error("identity lookup failed")]
    IdentityLookup(#[source] ApiError),

    #[error("deployment failed")]
    Deployment(#[source] ApiError),

    #[error("deployment {name} returned a certificate that is not valid base64")]
    InvalidCertificate {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("could not write certificate to {path}")]
    CertificateWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal interaction failed")]
    Prompt(#[source] io::Error),

    #[error("cancelled")]
    Cancelled,
}

/// Callbacks into whatever is talking to the user. Prompts return
/// `Ok(None)` when the user backs out.
pub trait Presenter {
    /// Explain that a token is needed and wait for the user to go on.
    fn token_setup(&mut self, token_url: &str) -> io::Result<Option<()>>;

    fn ask_token(&mut self) -> io::Result<Option<String>>;

    fn ask_database(&mut self, choices: &[DatabaseChoice]) -> io::Result<Option<DatabaseChoice>>;

    fn deploy_started(&mut self, database: &DatabaseChoice);

    fn deploy_finished(&mut self, succeeded: bool);
}

/// What a finished run hands back for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub name: String,
    pub database: DatabaseChoice,
    pub certificate_path: PathBuf,
    pub cli: String,
    pub direct: String,
    pub result: DeploymentResult,
}

/// Flow states. Each one carries what the next step needs.
#[derive(Debug)]
pub enum State {
    NoToken,
    AwaitingToken,
    HasToken {
        token: String,
    },
    SelectingDatabase {
        token: String,
    },
    Deploying {
        token: String,
        database: DatabaseChoice,
        name: String,
    },
    WritingCertificate {
        database: DatabaseChoice,
        name: String,
        result: DeploymentResult,
    },
    Done(Deployment),
}

impl State {
    pub fn label(&self) -> &'static str {
        match self {
            State::NoToken => "no-token",
            State::AwaitingToken => "awaiting-token",
            State::HasToken { .. } => "has-token",
            State::SelectingDatabase { .. } => "selecting-database",
            State::Deploying { .. } => "deploying",
            State::WritingCertificate { .. } => "writing-certificate",
            State::Done(_) => "done",
        }
    }
}

/// Everything one run needs, borrowed from the caller.
pub struct Deployer<'a> {
    pub store: &'a mut dyn CredentialStore,
    pub api: &'a dyn DeploymentApi,
    pub presenter: &'a mut dyn Presenter,
    pub words: &'a mut dyn WordSource,
    pub cancel: &'a CancelToken,
    pub token_url: &'a str,
    pub out_dir: &'a Path,
}

impl Deployer<'_> {
    /// Run the flow to completion.
    pub fn run(&mut self) -> Result<Deployment, DeployError> {
        let mut state = self.start()?;
        loop {
            if let State::Done(deployment) = state {
                return Ok(deployment);
            }
            if self.cancel.is_cancelled() {
                debug!(state = state.label(), "cancelled");
                return Err(DeployError::Cancelled);
            }
            let from = state.label();
            state = self.step(state)?;
            debug!(from, to = state.label(), "transition");
        }
    }

    /// Initial state depends only on what the store holds. An empty token
    /// counts as no token.
    pub fn start(&mut self) -> Result<State, DeployError> {
        Ok(match self.store.get(TOKEN_KEY)? {
            Some(token) if !token.trim().is_empty() => State::HasToken { token },
            _ => State::NoToken,
        })
    }

    /// Advance one state.
    pub fn step(&mut self, state: State) -> Result<State, DeployError> {
        match state {
            State::NoToken => {
                answered(self.presenter.token_setup(self.token_url))?;
                Ok(State::AwaitingToken)
            }
            State::AwaitingToken => {
                let token = answered(self.presenter.ask_token())?.trim().to_string();
                if token.is_empty() {
                    return Ok(State::AwaitingToken);
                }
                self.store.set(TOKEN_KEY, &token)?;
                info!("token saved");
                Ok(State::HasToken { token })
            }
            State::HasToken { token } => Ok(State::SelectingDatabase { token }),
            State::SelectingDatabase { token } => {
                let database = answered(self.presenter.ask_database(DATABASES))?;
                let name = deployment_name(self.words.word(), database.value);
                Ok(State::Deploying {
                    token,
                    database,
                    name,
                })
            }
            State::Deploying {
                token,
                database,
                name,
            } => {
                self.presenter.deploy_started(&database);
                let outcome = self.deploy(&token, &database, &name);
                self.presenter.deploy_finished(outcome.is_ok());
                Ok(State::WritingCertificate {
                    database,
                    name,
                    result: outcome?,
                })
            }
            State::WritingCertificate {
                database,
                name,
                result,
            } => {
                let certificate_path = self.write_certificate(&name, &result)?;
                Ok(State::Done(Deployment {
                    cli: result.cli().to_string(),
                    direct: result.direct().to_string(),
                    name,
                    database,
                    certificate_path,
                    result,
                }))
            }
            State::Done(deployment) => Ok(State::Done(deployment)),
        }
    }

    fn deploy(
        &self,
        token: &str,
        database: &DatabaseChoice,
        name: &str,
    ) -> Result<DeploymentResult, DeployError> {
        let account_id: AccountId = self
            .api
            .fetch_account_id(token)
            .map_err(DeployError::IdentityLookup)?;
        debug!(account = account_id.as_str(), "account resolved");

        let result = self
            .api
            .create_deployment(token, &account_id, database.value, name)
            .map_err(DeployError::Deployment)?;
        info!(name, id = ?result.id, "deployment created");
        Ok(result)
    }

    fn write_certificate(
        &self,
        name: &str,
        result: &DeploymentResult,
    ) -> Result<PathBuf, DeployError> {
        let bytes = decode_certificate(&result.ca_certificate_base64)
            .map_err(|source| DeployError::InvalidCertificate {
                name: name.to_string(),
                source,
            })?;
        let path = self.out_dir.join(format!("{name}.crt"));
        if let Err(source) = fs::write(&path, bytes) {
            error!(
                name,
                id = ?result.id,
                path = %path.display(),
                "deployment exists remotely but its certificate was not saved"
            );
            return Err(DeployError::CertificateWrite { path, source });
        }
        info!(path = %path.display(), "certificate saved");
        Ok(path)
    }
}

fn decode_certificate(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    CERTIFICATE_BASE64.decode(compact)
}

/// A prompt interrupted by Ctrl-C counts as backing out.
fn answered<T>(reply: io::Result<Option<T>>) -> Result<T, DeployError> {
    match reply {
        Ok(Some(answer)) => Ok(answer),
        Ok(None) => Err(DeployError::Cancelled),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(DeployError::Cancelled),
        Err(e) => Err(DeployError::Prompt(e)),
    }
}
