//! Kiosk Speech - bilingual counter assistant
//!
//! Command line front-end for talking to the hosted speech pipeline from
//! a railway or airport enquiry counter.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kiosk_speech::audio;
use kiosk_speech::cli::{Args, Commands};
use kiosk_speech::config::{Config, Credentials};
use kiosk_speech::counter::Counter;
use kiosk_speech::enquiry::{self, EnquiryKind, LANGUAGES};
use kiosk_speech::error::KioskError;
use kiosk_speech::pipeline::TaskType;
use kiosk_speech::translator::Translator;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    // Credentials usually live in a .env file next to the kiosk
    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded: {}", e);
    }

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("kiosk.toml").exists() {
                info!("Found kiosk.toml in current directory, loading...");
                Config::from_file("kiosk.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Languages => {
            println!("\n{:<12} {:<6}", "Language", "Code");
            println!("{}", "-".repeat(19));
            for language in LANGUAGES {
                println!("{:<12} {:<6}", language.name, language.code);
            }
        }
        Commands::Check { from, to } => {
            let credentials = Credentials::from_env(&config.service)?;
            info!("Checking pipeline access for {:?}", credentials);

            let mut translator = Translator::new(credentials, config.service.clone(), &from, &to)?;
            let spinner = start_spinner("Contacting pipeline control plane...");
            let outcomes = translator.probe().await;
            spinner.finish_and_clear();

            let mut failures = 0;
            for (task_type, outcome) in outcomes {
                match outcome {
                    Ok(descriptor) => println!(
                        "  OK    {:<12} service {}",
                        task_type,
                        descriptor.service_id().unwrap_or_default()
                    ),
                    Err(e) => {
                        failures += 1;
                        println!("  FAIL  {:<12} {}", task_type, e);
                        explain_failure(&e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} of {} task types could not be resolved", failures, TaskType::ALL.len());
            }
            println!("\nAll task types resolved for {} -> {}", from, to);
        }
        Commands::Translate { from, to, text, speak } => {
            warn_unknown_language(&from);
            warn_unknown_language(&to);
            let credentials = Credentials::from_env(&config.service)?;
            let mut translator = Translator::new(credentials, config.service.clone(), &from, &to)?;

            let spinner = start_spinner("Translating...");
            translator.resolve(TaskType::Translation).await?;
            let translated = translator.translate(&text).await?;
            spinner.finish_and_clear();
            println!("{}", translated);

            if let Some(output) = speak {
                let spinner = start_spinner("Synthesizing...");
                let mut speaker = translator.reversed();
                speaker.resolve(TaskType::Synthesis).await?;
                let audio_b64 = speaker.synthesize(&translated).await?;
                spinner.finish_and_clear();
                audio::write_wav_base64(&audio_b64, &output).await?;
                println!("Speech saved to {}", output.display());
            }
        }
        Commands::Recognize { lang, input, to } => {
            warn_unknown_language(&lang);
            let credentials = Credentials::from_env(&config.service)?;
            let audio_b64 = audio::read_wav_base64(&input).await?;

            let target = to.clone().unwrap_or_else(|| lang.clone());
            let mut translator = Translator::new(credentials, config.service.clone(), &lang, &target)?;

            let spinner = start_spinner("Recognizing speech...");
            let text = match to {
                Some(_) => {
                    translator
                        .resolve_chain(&[TaskType::Recognition, TaskType::Translation])
                        .await?;
                    translator.recognize_and_translate(&audio_b64).await?
                }
                None => {
                    translator.resolve(TaskType::Recognition).await?;
                    translator.recognize(&audio_b64).await?
                }
            };
            spinner.finish_and_clear();
            println!("{}", text);
        }
        Commands::Synthesize { lang, output, text } => {
            warn_unknown_language(&lang);
            let credentials = Credentials::from_env(&config.service)?;
            let mut translator = Translator::new(credentials, config.service.clone(), &lang, &lang)?;

            let spinner = start_spinner("Synthesizing...");
            translator.resolve(TaskType::Synthesis).await?;
            let audio_b64 = translator.synthesize(&text).await?;
            spinner.finish_and_clear();

            audio::write_wav_base64(&audio_b64, &output).await?;
            println!("Speech saved to {}", output.display());
        }
        Commands::Speech { from, to, input, output } => {
            warn_unknown_language(&from);
            warn_unknown_language(&to);
            let credentials = Credentials::from_env(&config.service)?;
            let audio_b64 = audio::read_wav_base64(&input).await?;
            let mut translator = Translator::new(credentials, config.service.clone(), &from, &to)?;

            let spinner = start_spinner("Translating speech...");
            translator
                .resolve_chain(&[TaskType::Recognition, TaskType::Translation, TaskType::Synthesis])
                .await?;
            let translated_b64 = translator.full_duplex_speech(&audio_b64).await?;
            spinner.finish_and_clear();

            audio::write_wav_base64(&translated_b64, &output).await?;
            println!("Translated speech saved to {}", output.display());
        }
        Commands::Questions { enquiry, staff, customer, play, output } => {
            apply_counter_overrides(&mut config, enquiry.as_deref(), staff, customer)?;
            let credentials = Credentials::from_env(&config.service)?;
            let mut counter = Counter::new(&config, credentials)?;
            let kind = counter.enquiry();

            let spinner = start_spinner("Translating questions...");
            let heading = counter.translate_heading().await?;
            let mut translated = Vec::with_capacity(kind.questions().len());
            for number in 1..=kind.questions().len() {
                match counter.ask_question(number).await {
                    Ok(text) => translated.push(text),
                    Err(e) => {
                        spinner.finish_and_clear();
                        return Err(e.into());
                    }
                }
            }
            let closing = counter.closing_prompt().await;
            spinner.finish_and_clear();

            println!("\n{}\n", heading);
            for (index, text) in translated.iter().enumerate() {
                println!("{:>3}. {}", index + 1, text);
            }
            println!("\n{}", closing?);

            if let (Some(number), Some(output)) = (play, output) {
                let text = translated.get(number.wrapping_sub(1)).ok_or_else(|| {
                    KioskError::Config(format!("Question {} does not exist", number))
                })?;
                let audio_b64 = counter.speak_to_customer(text).await?;
                audio::write_wav_base64(&audio_b64, &output).await?;
                println!("\nQuestion {} saved to {}", number, output.display());
            }
        }
        Commands::Answer { question, input, output, enquiry, staff, customer, transcript } => {
            apply_counter_overrides(&mut config, enquiry.as_deref(), staff, customer)?;
            let credentials = Credentials::from_env(&config.service)?;
            let audio_b64 = audio::read_wav_base64(&input).await?;
            let mut counter = Counter::new(&config, credentials)?;

            let spinner = start_spinner("Processing answer...");
            let asked = counter.ask_question(question).await?;
            let outcome = counter.process_answer(&audio_b64).await?;
            spinner.finish_and_clear();

            println!("\nQuestion {}: {}", question, asked);
            println!("Recognized (customer language): {}", outcome.recognized);
            println!("Translation (for counter staff): {}", outcome.translated);

            audio::write_wav_base64(&outcome.audio, &output).await?;
            println!("Translated answer saved to {}", output.display());

            if transcript {
                let path = counter.transcript().save(&config.counter.transcript_dir).await?;
                println!("Transcript saved to {}", path.display());
            }
        }
    }

    info!("Kiosk command completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".kiosk").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "kiosk.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("kiosk.log").display());

    Ok(())
}

fn start_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn warn_unknown_language(code: &str) {
    if enquiry::language(code).is_none() {
        warn!("Language '{}' is not one of the counter languages; passing it through", code);
    }
}

fn apply_counter_overrides(
    config: &mut Config,
    enquiry: Option<&str>,
    staff: Option<String>,
    customer: Option<String>,
) -> Result<()> {
    if let Some(kind) = enquiry {
        config.counter.enquiry = kind.parse::<EnquiryKind>()?;
    }
    if let Some(staff) = staff {
        config.counter.staff_language = staff;
    }
    if let Some(customer) = customer {
        config.counter.customer_language = customer;
    }
    warn_unknown_language(&config.counter.staff_language);
    warn_unknown_language(&config.counter.customer_language);
    Ok(())
}

/// Print hints for the usual discovery failures
fn explain_failure(error: &KioskError) {
    match error {
        KioskError::ResolverUnavailable { status: 401, .. } => {
            println!("        -> userID or ulcaApiKey is incorrect");
        }
        KioskError::ResolverUnavailable { status: 403, .. } => {
            println!("        -> the account may not have API access approved");
        }
        KioskError::ResolverUnavailable { status: 400, .. } => {
            println!("        -> the pipeline id may be wrong or the language pair unsupported");
        }
        KioskError::Http(_) => {
            println!("        -> check the network connection and the discovery endpoint");
        }
        _ => {}
    }
}
