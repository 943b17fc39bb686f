// Interface adapters: wire protocol, settings document and the in-memory host.

pub mod memory_host;
pub mod protocol;
pub mod settings_document;
