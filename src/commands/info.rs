//! Info Command
//!
//! Shows model configuration and parameter count.

use crate::model::ModelConfig;
use crate::utils::format_params;

pub fn execute(vocab_size: usize, hidden_size: usize, layers_size: usize) {
    let config = ModelConfig::new(vocab_size)
        .with_hidden_size(hidden_size)
        .with_layers_size(layers_size);

    println!("═══════════════════════════════════════════════════════════");
    println!("  Model info");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Parameters: {}", format_params(config.num_parameters()));
    println!("  vocab_size: {}", config.vocab_size);
    println!("  hidden_size: {}", config.hidden_size);
    println!("  layers_size: {}", config.layers_size);
    println!("  backend: {}", crate::backend_name());
    println!("═══════════════════════════════════════════════════════════");
}
