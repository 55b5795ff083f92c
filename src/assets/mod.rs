/// Avatar tiles and the best-effort resolver.
pub mod avatar;
/// Image decoding and avatar-shaping helpers.
pub mod decode;
/// Avatar byte sources.
pub mod fetch;
