// Library root
// -----------
// The binary (`main.rs`) parses arguments, sets up logging and Ctrl-C
// handling, then hands over to `ui::run`.
//
// Module responsibilities:
// - `store`: persists the API token between runs.
// - `api`: the two Compose API calls (account lookup, create deployment).
// - `deploy`: the deploy flow as an explicit state machine; talks to the
//   terminal only through the `Presenter` trait.
// - `ui`: terminal prompts, spinner and the final summary.
// - `databases`, `names`, `cancel`, `config`: small supporting pieces.
pub mod api;
pub mod cancel;
pub mod config;
pub mod databases;
pub mod deploy;
pub mod names;
pub mod store;
pub mod ui;
