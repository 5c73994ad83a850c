// Library root
// -----------
// This crate exposes the pieces behind the `gistify-cli` terminal front-end
// for a remote summarization service. The binary (`main.rs`) wires them
// into the interactive menu.
//
// Module responsibilities:
// - `submission`: the editable form and the resolution of one snapshot
//   into exactly one outbound request.
// - `api`: HTTP calls to the service (summarize, download).
// - `coordinator`: dispatches a request and folds the reply into the UI
//   state, discarding replies that arrive for superseded submissions.
// - `display`: renders that state to any writer.
// - `capabilities`: text-to-speech and file-download ports.
// - `config` / `logging`: environment configuration and tracing setup.
// - `ui`: the dialoguer-based menus.
pub mod api;
pub mod capabilities;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod logging;
pub mod submission;
pub mod ui;
