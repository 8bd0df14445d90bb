//! Binary entry point that glues provisioning, the SQLite accessors, and the
//! TUI together. The bootstrapping pipeline is short: resolve the writable
//! data directory, copy any bundled databases that are not there yet, open the
//! user store, and drive the Ratatui event loop until the user exits.
use biblia_reader::{
    data_dir, default_bundle_dir, provision, run_app, user_db_path, App, ScriptureLibrary,
    UserStore,
};

/// Initialize persistence, provision the bundle, and launch the event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let dir = data_dir()?;
    provision(&default_bundle_dir(), &dir)?;

    let store = UserStore::open(user_db_path(&dir))?;
    let library = ScriptureLibrary::new(&dir);

    let mut app = App::new(store, library)?;
    run_app(&mut app)
}
