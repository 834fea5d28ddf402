//! Assertion helpers

/// Assert the labels a [`CallRecorder`](crate::CallRecorder) saw, in order
#[macro_export]
macro_rules! assert_calls {
    ($recorder:expr, [$($label:expr),* $(,)?]) => {{
        let expected: Vec<String> = vec![$(String::from($label)),*];
        assert_eq!(
            $recorder.labels(),
            expected,
            "recorded calls differ from expected order"
        )
    }};
}

/// Assert the raw value stored under a key in a key-value store
#[macro_export]
macro_rules! assert_stored {
    ($store:expr, $key:expr, None) => {
        assert_eq!(
            {
                use $crate::__private::KeyValueStore as _;
                $store.get_item($key).unwrap()
            },
            None,
            "expected nothing stored under {:?}",
            $key
        )
    };
    ($store:expr, $key:expr, $value:expr) => {
        assert_eq!(
            {
                use $crate::__private::KeyValueStore as _;
                $store.get_item($key).unwrap()
            }
            .as_deref(),
            Some(AsRef::<str>::as_ref(&$value)),
            "unexpected value stored under {:?}",
            $key
        )
    };
}
