#![warn(unused_extern_crates)]
#![allow(non_snake_case)]
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing_forest::printer::TestCapturePrinter;
use tracing_forest::tag::NoTag;
use tracing_forest::util::*;
use tracing_subscriber::prelude::*;

pub mod macros;

pub use {tracing, tracing_forest, tracing_subscriber};

/// Start up the logging for test mode.
pub fn test_init() {
    let filter = EnvFilter::from_default_env().add_directive(LevelFilter::TRACE.into());

    // start the logging!
    let _ = tracing_subscriber::Registry::default()
        .with(ForestLayer::new(TestCapturePrinter::new(), NoTag).with_filter(filter))
        .try_init();
}

#[derive(Debug, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum EventTag {
    MappingError,
    MappingWarn,
    MappingInfo,
    MappingTrace,
    SchemaError,
    SchemaInfo,
    DirectoryError,
    DirectoryTrace,
}

impl EventTag {
    pub fn pretty(self) -> &'static str {
        match self {
            EventTag::MappingError => "mapping.error",
            EventTag::MappingWarn => "mapping.warn",
            EventTag::MappingInfo => "mapping.info",
            EventTag::MappingTrace => "mapping.trace",
            EventTag::SchemaError => "schema.error",
            EventTag::SchemaInfo => "schema.info",
            EventTag::DirectoryError => "directory.error",
            EventTag::DirectoryTrace => "directory.trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventTag;

    #[test]
    fn test_eventtag_roundtrip() {
        let raw: u64 = EventTag::SchemaInfo.into();
        let back = EventTag::try_from(raw).expect("tag did not round trip");
        assert_eq!(back.pretty(), "schema.info");
        assert!(EventTag::try_from(u64::MAX).is_err());
    }
}
