use std::path::PathBuf;

use clap::{Parser, Subcommand};

use charnn::commands::{self, train::ModelParams};
use charnn::model::{TrainingOptions, DEFAULT_NUM, DEFAULT_PRIME};

#[derive(Parser)]
#[command(name = "charnn")]
#[command(version)]
#[command(about = "Character-level recurrent language model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trains a model on a plain text file
    Train {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "128")]
        hidden_size: usize,
        #[arg(long, default_value = "2")]
        layers: usize,
        #[arg(long, default_value = "50")]
        batch_size: usize,
        #[arg(long, default_value = "50")]
        seq_len: usize,
        #[arg(long, default_value = "50")]
        epochs: usize,
        #[arg(long, default_value = "1000")]
        save_every: usize,
        #[arg(long, default_value = "5.0")]
        grad_clip: f32,
        #[arg(long, default_value = "0.002")]
        learning_rate: f64,
        #[arg(long, default_value = "0.97")]
        decay_rate: f64,
        #[arg(long, default_value = "10")]
        log_every: usize,
    },

    /// Samples text from a trained checkpoint
    Sample {
        #[arg(short, long)]
        checkpoint: PathBuf,
        #[arg(short = 'n', long, default_value_t = DEFAULT_NUM)]
        num: usize,
        #[arg(long, default_value = DEFAULT_PRIME)]
        prime: String,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Shows parameter count for a model shape
    Info {
        #[arg(long)]
        vocab_size: usize,
        #[arg(long, default_value = "128")]
        hidden_size: usize,
        #[arg(long, default_value = "2")]
        layers: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            input, output, hidden_size, layers, batch_size, seq_len, epochs,
            save_every, grad_clip, learning_rate, decay_rate, log_every,
        } => {
            let params = ModelParams {
                hidden_size,
                layers_size: layers,
                batch_size,
                sequence_length: seq_len,
                gradient_clip: grad_clip,
                learning_rate,
            };
            let options = TrainingOptions {
                num_epochs: epochs,
                save_every,
                decay_rate,
                log_every,
            };
            commands::train::execute(&input, &output, &params, &options)
        }
        Commands::Sample { checkpoint, num, prime, seed } =>
            commands::sample::execute(&checkpoint, num, &prime, seed),
        Commands::Info { vocab_size, hidden_size, layers } => {
            commands::info::execute(vocab_size, hidden_size, layers);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
