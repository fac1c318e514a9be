pub(crate) mod serde_utils;
