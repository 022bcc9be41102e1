#![deny(warnings)]

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Convert a save between the binary and JSON formats: `migrate <from> <to>`.
/// Binary saves are rewritten with the current format version.
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (from, to) = match args.as_slice() {
        [from, to] => (PathBuf::from(from), PathBuf::from(to)),
        [slot] => (
            persistence::default_save_path(slot),
            persistence::default_save_path(slot).with_extension("json"),
        ),
        _ => bail!("usage: migrate <from> <to> | migrate <slot>"),
    };
    let save = persistence::load_any(&from)?;
    persistence::save_any(&to, &save)?;
    println!(
        "Migrated {} -> {} (day {}, {} dealers)",
        from.display(),
        to.display(),
        save.elapsed_days,
        save.dealers.len()
    );
    Ok(())
}
