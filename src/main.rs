use anyhow::Result;
use chatwrap::{config, util, ChatClient, ParameterSet, PromptSource};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chatwrap", version, about = "Ask OpenAI Chat Completions from a validated prompt")]
struct Cli {
    /// API key (falls back to OPENAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Prompt config file (JSON or YAML)
    #[arg(long, global = true, env = "CHATWRAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one question and print the reply
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the cl100k_base token count of the text
    Tokens {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Check a prompt config file against the parameter schema
    Validate { path: Option<PathBuf> },
}

fn prompt_source(config: Option<PathBuf>) -> PromptSource {
    config.map(PromptSource::new).unwrap_or_else(PromptSource::from_env)
}

/// Line printed by `validate` and whether the prompt passed.
fn validation_report(result: &config::Result<ParameterSet>) -> (String, bool) {
    match result {
        Ok(_) => ("ok".to_string(), true),
        Err(e) => (e.to_string(), false),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    util::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Ask { text } => {
            let source = prompt_source(cli.config);
            let mut client = ChatClient::connect_with_source(cli.api_key.as_deref(), source)?;
            let reply = client.ask(&text.join(" ")).await?;
            println!("{reply}");
        }
        Command::Tokens { text } => {
            println!("{}", chatwrap::count_tokens(&text.join(" "))?);
        }
        Command::Validate { path } => {
            let source = prompt_source(path.or(cli.config));
            let (line, passed) = validation_report(&source.load());
            println!("{line}");
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn report_for(body: &str) -> (String, bool) {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        validation_report(&PromptSource::new(file.path()).load())
    }

    #[test]
    fn test_validation_report_ok() {
        assert_eq!(
            report_for(r#"{"model": "gpt-4o-mini", "temperature": 0.2}"#),
            ("ok".to_string(), true)
        );
    }

    #[test]
    fn test_validation_report_names_violation() {
        let (line, passed) = report_for(r#"{"model": "gpt-4o-mini", "temprature": 0.2}"#);
        assert!(!passed);
        assert!(line.contains("temprature"), "{line}");

        let (line, passed) = report_for(r#"{"temperature": 0.2}"#);
        assert!(!passed);
        assert!(line.contains("model"), "{line}");
    }

    #[test]
    fn test_validation_report_missing_file() {
        let (line, passed) = validation_report(&PromptSource::new("/no/such/prompt.json").load());
        assert!(!passed);
        assert!(line.contains("/no/such/prompt.json"), "{line}");
    }
}
