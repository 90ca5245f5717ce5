#[macro_export]
macro_rules! tagged_event {
    ($level:ident, $event_tag:path, $($arg:tt)*) => {{
        fn assert_eventtag(_: &$crate::EventTag) {}
        assert_eventtag(&$event_tag);
        let event_tag_id: u64 = $event_tag.into();
        $crate::tracing::event!($crate::tracing::Level::$level, event_tag_id, $($arg)*)
    }}
}

#[macro_export]
macro_rules! mapping_error {
    ($($arg:tt)*) => { $crate::tagged_event!(ERROR, $crate::EventTag::MappingError, $($arg)*) }
}

#[macro_export]
macro_rules! mapping_warn {
    ($($arg:tt)*) => { $crate::tagged_event!(WARN, $crate::EventTag::MappingWarn, $($arg)*) }
}

#[macro_export]
macro_rules! mapping_info {
    ($($arg:tt)*) => { $crate::tagged_event!(INFO, $crate::EventTag::MappingInfo, $($arg)*) }
}

#[macro_export]
macro_rules! mapping_trace {
    ($($arg:tt)*) => { $crate::tagged_event!(TRACE, $crate::EventTag::MappingTrace, $($arg)*) }
}

#[macro_export]
macro_rules! schema_error {
    ($($arg:tt)*) => { $crate::tagged_event!(ERROR, $crate::EventTag::SchemaError, $($arg)*) }
}

#[macro_export]
macro_rules! schema_info {
    ($($arg:tt)*) => { $crate::tagged_event!(INFO, $crate::EventTag::SchemaInfo, $($arg)*) }
}

#[macro_export]
macro_rules! directory_error {
    ($($arg:tt)*) => { $crate::tagged_event!(ERROR, $crate::EventTag::DirectoryError, $($arg)*) }
}

#[macro_export]
macro_rules! directory_trace {
    ($($arg:tt)*) => { $crate::tagged_event!(TRACE, $crate::EventTag::DirectoryTrace, $($arg)*) }
}
