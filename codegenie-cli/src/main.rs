//! # CodeGenie CLI
//!
//! Command-line interface for account management and code generation.
//!
//! Usage:
//!   codegenie register <username> <email> --password <pw> --confirm <pw>
//!   codegenie login <username> --password <pw>
//!   codegenie reset-password <email> --password <pw> --confirm <pw>
//!   codegenie generate --user <name> --password <pw> <description>
//!   codegenie history --user <name> --password <pw>
//!   codegenie detect <description>
//!   codegenie explain <file>
//!
//! Examples:
//!   codegenie generate -u alice -p secret1 "Read a CSV file in Python and sum a column"
//!   codegenie generate -u alice -p secret1 -l rust --style concise --lines 20 "Parse a date"
//!   codegenie --model codellama/CodeLlama-7b-Instruct-hf generate -u alice -p secret1 "FizzBuzz in Go"

use clap::{Parser, Subcommand};
use codegenie_core::prompt::{CodeStyle, DEFAULT_CODE_LENGTH};
use codegenie_core::{
    detect_language, explain, AppConfig, CredentialStore, Error, HistoryStore, HuggingFaceProvider,
    Language, Model, Result, StylePreferences,
};
use codegenie_pipeline::{CodeGenerator, GenerationRequest};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "codegenie")]
#[command(author, version, about = "CodeGenie - turn plain-language descriptions into code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding users/ and history/ (overrides CODEGENIE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Model id or display name (overrides CODEGENIE_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Check a username and password
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Set a new password for the account registered under an email
    ResetPassword {
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        confirm: String,
    },
    /// Generate code from a description
    Generate {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        password: String,

        /// What the code should do
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,

        /// Target language (default: detect from the description)
        #[arg(short, long)]
        language: Option<Language>,

        /// Standard, concise, heavily-commented or production-ready
        #[arg(long, default_value = "standard")]
        style: CodeStyle,

        /// Approximate length in lines (10-100)
        #[arg(long, default_value_t = DEFAULT_CODE_LENGTH)]
        lines: u32,

        /// Extra requirements appended to the description
        #[arg(short, long)]
        requirements: Option<String>,

        /// Write the code to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print an explanation after the code
        #[arg(short, long)]
        explain: bool,

        /// Do not record the generation in history
        #[arg(long)]
        no_history: bool,
    },
    /// List past generations, newest first
    History {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        password: String,

        /// Include the generated code
        #[arg(long)]
        code: bool,
    },
    /// Show which language a description asks for
    Detect {
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// Explain a source file
    Explain {
        file: PathBuf,

        /// Language of the file (default: from its extension)
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// List supported languages
    Languages,
    /// List available models
    Models,
}

fn init_logging() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "codegenie=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(model) = &cli.model {
        config.model = Model::from_id(model);
    }
    Ok(config)
}

fn open_credentials(config: &AppConfig) -> Result<CredentialStore> {
    CredentialStore::open(config.users_file(), config.seed.as_ref())
}

fn confirm_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(Error::invalid_argument("Passwords do not match"));
    }
    Ok(())
}

/// Prints the failure itself; `false` means the caller should stop
fn login(store: &CredentialStore, username: &str, password: &str) -> Result<bool> {
    let ok = store.authenticate(username, password)?;
    if !ok {
        eprintln!("Invalid username or password");
    }
    Ok(ok)
}

fn joined(words: &[String]) -> String {
    words.join(" ")
}

fn language_for_file(path: &Path) -> Option<Language> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => {
            confirm_password(&password, &confirm)?;
            open_credentials(&config)?.register(&username, &password, &email)?;
            println!("Registration successful! Please login.");
        }

        Commands::Login { username, password } => {
            let store = open_credentials(&config)?;
            if !login(&store, &username, &password)? {
                return Ok(ExitCode::FAILURE);
            }
            println!("Login successful!");
        }

        Commands::ResetPassword {
            email,
            password,
            confirm,
        } => {
            confirm_password(&password, &confirm)?;
            open_credentials(&config)?.reset_password(&email, &password)?;
            println!("Password reset successful! Please login with your new password.");
        }

        Commands::Generate {
            user,
            password,
            prompt,
            language,
            style,
            lines,
            requirements,
            output,
            explain,
            no_history,
        } => {
            let store = open_credentials(&config)?;
            if !login(&store, &user, &password)? {
                return Ok(ExitCode::FAILURE);
            }

            let mut preferences = StylePreferences::default()
                .with_style(style)
                .with_code_length(lines);
            if let Some(extra) = requirements {
                preferences = preferences.with_additional_requirements(extra);
            }

            let mut request = GenerationRequest::new(joined(&prompt), &user)
                .with_model(config.model.clone())
                .with_style(preferences);
            if let Some(language) = language {
                request = request.with_language(language);
            }

            let provider = HuggingFaceProvider::new(config.provider_config())
                .map_err(|e| e.into_error("huggingface", &config.model))?;
            let mut generator = CodeGenerator::new(provider).with_params(config.params);
            if !no_history {
                generator = generator.with_history(HistoryStore::open(config.history_dir())?);
            }

            let generation = generator.generate(&request).await?;
            match &generation.detection {
                Some(d) if d.is_fallback() => {
                    eprintln!("Language: {} (default, nothing detected)", generation.language)
                }
                Some(_) => eprintln!("Language: {} (detected)", generation.language),
                None => eprintln!("Language: {}", generation.language),
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", generation.code)).map_err(|e| {
                        Error::from(e).with_context("path", path.display().to_string())
                    })?;
                    println!("Code saved to {}", path.display());
                }
                None => {
                    println!("```{}", generation.language.highlight_tag());
                    println!("{}", generation.code);
                    println!("```");
                }
            }

            if explain {
                println!();
                print!("{}", generation.explanation);
            }
        }

        Commands::History {
            user,
            password,
            code,
        } => {
            let store = open_credentials(&config)?;
            if !login(&store, &user, &password)? {
                return Ok(ExitCode::FAILURE);
            }

            let records = HistoryStore::open(config.history_dir())?.list_for_user(&user)?;
            if records.is_empty() {
                println!("No history yet.");
            }
            for (path, record) in records {
                let first_line = record.prompt.lines().next().unwrap_or_default();
                println!(
                    "[{}] {}: {}",
                    record.timestamp_text(),
                    record.language,
                    first_line
                );
                if code {
                    println!("  file: {}", path.display());
                    if let Some(model) = &record.model {
                        println!("  model: {}", model);
                    }
                    println!();
                    for line in record.code.lines() {
                        println!("    {}", line);
                    }
                    println!();
                }
            }
        }

        Commands::Detect { prompt } => {
            let detection = detect_language(&joined(&prompt));
            match &detection.matched {
                Some(pattern) => println!("{} (matched '{}')", detection.language, pattern),
                None => println!("{} (default)", detection.language),
            }
        }

        Commands::Explain { file, language } => {
            let source = std::fs::read_to_string(&file).map_err(|e| {
                Error::from(e).with_context("path", file.display().to_string())
            })?;
            let language = language
                .or_else(|| language_for_file(&file))
                .unwrap_or_else(|| detect_language(&source).language);
            print!("{}", explain(&source, language));
        }

        Commands::Languages => {
            for language in Language::ALL {
                println!("{:<12} .{}", language.name(), language.extension());
            }
        }

        Commands::Models => {
            for model in Model::CATALOG {
                let marker = if model == config.model { "*" } else { " " };
                println!("{} {:<24} {}", marker, model.display_name(), model.id());
                println!("    {}", model.summary());
            }
            if let Model::Custom(id) = &config.model {
                println!("* {} (custom)", id);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "codegenie",
            "--model",
            "codellama/CodeLlama-7b-Instruct-hf",
            "generate",
            "-u",
            "alice",
            "-p",
            "secret1",
            "--language",
            "rs",
            "--style",
            "heavily-commented",
            "reverse",
            "a",
            "string",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("codellama/CodeLlama-7b-Instruct-hf"));
        match cli.command {
            Commands::Generate {
                prompt,
                language,
                style,
                lines,
                ..
            } => {
                assert_eq!(joined(&prompt), "reverse a string");
                assert_eq!(language, Some(Language::Rust));
                assert_eq!(style, CodeStyle::HeavilyCommented);
                assert_eq!(lines, DEFAULT_CODE_LENGTH);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(Cli::try_parse_from(["codegenie", "explain", "a.txt", "-l", "cobol"]).is_err());
    }

    #[test]
    fn test_language_for_file() {
        assert_eq!(language_for_file(Path::new("src/main.rs")), Some(Language::Rust));
        assert_eq!(language_for_file(Path::new("query.SQL")), Some(Language::Sql));
        assert_eq!(language_for_file(Path::new("README")), None);
    }

    #[test]
    fn test_confirm_password() {
        assert!(confirm_password("secret1", "secret1").is_ok());
        let err = confirm_password("secret1", "secret2").unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
    }
}
