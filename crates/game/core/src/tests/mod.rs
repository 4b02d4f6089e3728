//! Cross-module scenarios and the world builders shared by unit tests.

pub(crate) mod helpers;
