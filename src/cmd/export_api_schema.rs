use std::path::PathBuf;

use crate::{api, prelude::*};


/// Writes the GraphQL schema of our API in SDL to the given file or stdout.
pub(crate) fn run(target: Option<&PathBuf>) -> Result<()> {
    let schema = api::root_node().as_sdl();

    match target {
        Some(target) => std::fs::write(target, schema)
            .with_context(|| format!("failed to write schema to '{}'", target.display()))?,
        None => println!("{schema}"),
    }

    Ok(())
}
