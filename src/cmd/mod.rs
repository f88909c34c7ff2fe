//! Smaller subcommands that don't warrant their own top level module.

pub(crate) mod export_api_schema;
