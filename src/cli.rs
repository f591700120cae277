use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the credentials can discover every task type
    Check {
        /// Source language to probe with
        #[arg(long, default_value = "en")]
        from: String,

        /// Target language to probe with
        #[arg(long, default_value = "hi")]
        to: String,
    },

    /// List the languages offered at the counter
    Languages,

    /// Translate text between two languages
    Translate {
        /// Source language code
        #[arg(short, long)]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,

        /// Text to translate
        text: String,

        /// Also synthesize the translation into this WAV file
        #[arg(short, long)]
        speak: Option<PathBuf>,
    },

    /// Recognize speech in a WAV file
    Recognize {
        /// Language spoken in the recording
        #[arg(short, long)]
        lang: String,

        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Translate the recognized text into this language as well
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Synthesize speech for a text
    Synthesize {
        /// Language of the text
        #[arg(short, long)]
        lang: String,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Text to speak
        text: String,
    },

    /// Translate a spoken recording into speech in another language
    Speech {
        /// Language spoken in the recording
        #[arg(short, long)]
        from: String,

        /// Language of the produced speech
        #[arg(short, long)]
        to: String,

        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the enquiry questions translated for the customer
    Questions {
        /// Enquiry kind (railway, airport)
        #[arg(short, long)]
        enquiry: Option<String>,

        /// Staff language code
        #[arg(long)]
        staff: Option<String>,

        /// Customer language code
        #[arg(long)]
        customer: Option<String>,

        /// Speak this question number into a WAV file
        #[arg(long, requires = "output")]
        play: Option<usize>,

        /// Output WAV file for --play
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process a recorded customer answer to a question
    Answer {
        /// Question number being answered
        #[arg(short, long)]
        question: usize,

        /// Recorded answer (WAV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV of the answer in the staff's language
        #[arg(short, long)]
        output: PathBuf,

        /// Enquiry kind (railway, airport)
        #[arg(short, long)]
        enquiry: Option<String>,

        /// Staff language code
        #[arg(long)]
        staff: Option<String>,

        /// Customer language code
        #[arg(long)]
        customer: Option<String>,

        /// Save the conversation transcript
        #[arg(long)]
        transcript: bool,
    },
}
