//! Bincode option presets.

use bincode::config::{AllowTrailing, FixintEncoding, WithOtherIntEncoding, WithOtherTrailing};
use bincode::{DefaultOptions, Options};

/// Options matching `bincode::serialize` / `bincode::deserialize`.
///
/// Little endian, fixed width integers, no size limit, trailing bytes allowed.
pub type LegacyOptions =
    WithOtherTrailing<WithOtherIntEncoding<DefaultOptions, FixintEncoding>, AllowTrailing>;

/// Build the [`LegacyOptions`] preset.
pub fn legacy_options() -> LegacyOptions {
    DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}
