//! # cuttle CLI
//!
//! Command-line interface for the image similarity engine.
//!
//! ## Usage
//! ```bash
//! cuttle scan ~/Pictures --threshold 0.9
//! cuttle scan ~/new ~/archive --output json
//! cuttle compare a.jpg b.jpg
//! ```

mod cli;

use cuttle::Result;

fn main() -> Result<()> {
    cuttle::init_tracing();
    cli::run()
}
