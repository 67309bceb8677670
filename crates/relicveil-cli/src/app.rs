//! Wiring and command handlers for the relicveil CLI.
//!
//! `App` owns one session provider for the whole run. The cached bearer token
//! and user record live in the cache directory; the refresh token lives in
//! the OS keychain, or in `secrets.json` next to them when no keychain
//! backend keeps values.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use relicveil_core::api::ApiClient;
use relicveil_core::auth::{FederatedCredential, FirebaseIdentity, ProfileChanges, SessionProvider};
use relicveil_core::curation::{Curator, ReactionLedger, ReactionOutcome};
use relicveil_core::models::ArtifactForm;
use relicveil_core::storage::{usable_or, FileStore, KeyringStore, LocalStore};
use relicveil_core::utils::format_likes;
use relicveil_core::{ArtifactType, Config, User};

use crate::output::{print_artifact, print_artifacts, print_user};

/// Fallback secret store file in the cache directory
const SECRETS_FILE: &str = "secrets.json";

pub struct App {
    config: Config,
    api: ApiClient,
    session: Arc<SessionProvider>,
    curator: Curator,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        let storage: Arc<dyn LocalStore> = Arc::new(FileStore::new(cache_dir.clone())?);
        let secrets = usable_or(
            Arc::new(KeyringStore::new()),
            Arc::new(FileStore::with_file_name(cache_dir, SECRETS_FILE)?),
        );

        let api = ApiClient::new(&config.api_url, config.request_timeout())?;

        let api_key = config.firebase_api_key.clone().unwrap_or_default();
        let mut identity = FirebaseIdentity::new(api_key)?;
        if let Some(ref host) = config.auth_emulator_host {
            identity = identity.with_emulator(host);
        }

        let session = Arc::new(SessionProvider::new(Arc::new(identity), storage.clone(), secrets));
        match session.restore().await {
            Ok(Some(user)) => info!(email = %user.email, "Resumed session"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not restore session"),
        }

        let curator = Curator::new(api.clone(), session.clone(), ReactionLedger::new(storage));

        Ok(Self {
            config,
            api,
            session,
            curator,
        })
    }

    pub async fn run(mut self, command: &str, args: &[String]) -> Result<()> {
        match command {
            "list" => print_artifacts(&self.api.list_artifacts().await?),
            "top" => print_artifacts(&self.api.top_liked_artifacts().await?),
            "search" => {
                let query = args.join(" ");
                if query.trim().is_empty() {
                    bail!("Usage: relicveil search <query>");
                }
                print_artifacts(&self.api.search_artifacts(query.trim()).await?);
            }
            "show" => self.show(arg(args, 0, "show <id>")?).await?,

            "register" => {
                let email = arg(args, 0, "register <email> <name> [photo-url]")?;
                let name = arg(args, 1, "register <email> <name> [photo-url]")?;
                self.register(email, name, args.get(2).map(String::as_str)).await?;
            }
            "login" => self.login(arg(args, 0, "login <email>")?).await?,
            "login-google" => {
                let id_token = arg(args, 0, "login-google <id-token>")?;
                let credential = FederatedCredential::google_id_token(id_token);
                self.require_identity_key()?;
                let user = self.session.sign_in_with_idp(&credential).await?;
                println!("Successfully logged in with Google as {}", user.display_name_or_email());
            }
            "logout" => {
                self.session.sign_out().await?;
                println!("Logged out.");
            }
            "whoami" => match self.session.current_user().await {
                Some(user) => print_user(&user, None),
                None => println!("Not logged in."),
            },
            "profile" => {
                let user = self.require_user().await?;
                let stats = self.curator.profile_stats().await?;
                print_user(&user, Some(stats));
            }
            "update-profile" => {
                let name = arg(args, 0, "update-profile <name> [photo-url]")?;
                let changes = ProfileChanges {
                    display_name: Some(name.to_string()),
                    photo_url: args.get(1).cloned(),
                };
                let user = self.session.update_profile(changes).await?;
                println!("Profile updated successfully!");
                print_user(&user, None);
            }
            "reset-password" => {
                let email = arg(args, 0, "reset-password <email>")?;
                self.require_identity_key()?;
                self.session.send_password_reset(email).await?;
                println!("Password reset email sent to {}", email);
            }

            "mine" => {
                self.require_user().await?;
                print_artifacts(&self.api.my_artifacts(self.session.as_ref()).await?);
            }
            "liked" => {
                self.require_user().await?;
                print_artifacts(&self.api.liked_artifacts(self.session.as_ref()).await?);
            }
            "add" => {
                let form = read_form(Path::new(arg(args, 0, "add <form.json>")?))?;
                let name = form.name.clone();
                let ack = self.curator.add_artifact(form).await?;
                let message = ack.message.unwrap_or_else(|| {
                    format!("Artifact \"{}\" has been added successfully!", name)
                });
                println!("{}", message);
            }
            "edit" => {
                let id = arg(args, 0, "edit <id> <form.json>")?;
                let form = read_form(Path::new(arg(args, 1, "edit <id> <form.json>")?))?;
                self.curator.update_artifact(id, form).await?;
                println!("Artifact updated successfully!");
            }
            "delete" => {
                let id = arg(args, 0, "delete <id>")?;
                self.curator.delete_artifact(id).await?;
                println!("Artifact deleted.");
            }
            "like" => self.react(arg(args, 0, "like <id>")?, true).await?,
            "dislike" => self.react(arg(args, 0, "dislike <id>")?, false).await?,

            other => bail!("Unknown command: {} (try `relicveil help`)", other),
        }
        Ok(())
    }

    async fn require_user(&self) -> Result<User> {
        self.session
            .current_user()
            .await
            .ok_or_else(|| anyhow!("Please login first"))
    }

    fn require_identity_key(&self) -> Result<()> {
        match self.config.firebase_api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(()),
            _ => bail!("No identity provider key configured (set RELICVEIL_FIREBASE_API_KEY)"),
        }
    }

    async fn show(&self, id: &str) -> Result<()> {
        self.require_user().await?;
        let artifact = self.api.get_artifact(id, self.session.as_ref()).await?;
        let reaction = self.curator.ledger().reaction(&artifact.id)?;
        print_artifact(&artifact, reaction);
        Ok(())
    }

    async fn register(&mut self, email: &str, name: &str, photo_url: Option<&str>) -> Result<()> {
        self.require_identity_key()?;
        let password = prompt_password("Password: ")?;
        let confirm = prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        let user = self.session.create_user(email, &password, Some(name), photo_url).await?;
        self.remember_email(&user.email);
        println!("Registration successful! Welcome, {}.", user.display_name_or_email());
        Ok(())
    }

    async fn login(&mut self, email: &str) -> Result<()> {
        self.require_identity_key()?;
        let password = prompt_password("Password: ")?;
        let user = self.session.sign_in(email, &password).await?;
        self.remember_email(&user.email);
        println!("Successfully logged in as {}", user.display_name_or_email());
        Ok(())
    }

    fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    async fn react(&self, id: &str, like: bool) -> Result<()> {
        self.require_user().await?;
        let artifact = self.api.get_artifact(id, self.session.as_ref()).await?;

        let outcome = if like {
            self.curator.like(&artifact).await?
        } else {
            self.curator.dislike(&artifact).await?
        };

        match (outcome, like) {
            (ReactionOutcome::Applied { like_count }, true) => {
                println!("Artifact liked successfully! ({})", format_likes(like_count))
            }
            (ReactionOutcome::Applied { like_count }, false) => {
                println!("Artifact disliked ({})", format_likes(like_count))
            }
            (ReactionOutcome::Unchanged, true) => println!("You already liked this artifact."),
            (ReactionOutcome::Unchanged, false) => {
                println!("You can only dislike an artifact you liked.")
            }
        }
        Ok(())
    }
}

fn arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Usage: relicveil {}", usage))
}

fn prompt_password(prompt: &str) -> Result<String> {
    io::stdout().flush()?;
    let password = rpassword::prompt_password(prompt)?;
    Ok(password)
}

/// Read an artifact form from a JSON file (camelCase keys, as the service uses)
fn read_form(path: &Path) -> Result<ArtifactForm> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let form: ArtifactForm = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse artifact form in {}", path.display()))?;

    if form.artifact_type.parse::<ArtifactType>().is_err() {
        let types: Vec<&str> = ArtifactType::ALL.iter().map(|t| t.as_str()).collect();
        bail!(
            "Unknown artifact type \"{}\". Choose one of: {}",
            form.artifact_type,
            types.join(", ")
        );
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_missing_argument_reports_usage() {
        let given = args(&["65f1c2"]);
        assert_eq!(arg(&given, 0, "show <id>").unwrap(), "65f1c2");

        let err = arg(&given, 1, "edit <id> <form.json>").unwrap_err();
        assert_eq!(err.to_string(), "Usage: relicveil edit <id> <form.json>");
    }

    #[test]
    fn test_read_form_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(
            &path,
            r#"{"name":"Rosetta Stone","type":"Writings","presentLocation":"London"}"#,
        )
        .unwrap();

        let form = read_form(&path).unwrap();
        assert_eq!(form.name, "Rosetta Stone");
        assert_eq!(form.artifact_type, "Writings");
        assert_eq!(form.present_location, "London");
        assert_eq!(form.image, "");
    }

    #[test]
    fn test_read_form_rejects_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"name":"Moon rock","type":"Souvenirs"}"#).unwrap();

        let err = read_form(&path).unwrap_err().to_string();
        assert!(err.starts_with("Unknown artifact type \"Souvenirs\""));
        assert!(err.contains("Religious Items"));
    }

    #[test]
    fn test_read_form_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_form(&dir.path().join("missing.json")).is_err());

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = read_form(&path).unwrap_err().to_string();
        assert!(err.starts_with("Failed to parse artifact form"));
    }

    #[test]
    fn test_sample_form_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/artifact-form.json");
        let form = read_form(&path).unwrap();
        assert!(relicveil_core::validation::validate_artifact_form(&form).is_ok());
    }
}
