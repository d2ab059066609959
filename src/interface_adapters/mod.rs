// Interface adapters: wire protocol, network transport, HTTP clients,
// drawing surfaces and scoreboard presenters.

pub mod clients;
pub mod net;
pub mod presenters;
pub mod protocol;
pub mod surface;
pub mod utils;
