//! Shared constants used across the application

/// tEXt keyword carrying the interchange card for legacy readers.
pub const CHARA_KEYWORD: &str = "chara";

/// tEXt keyword carrying the interchange card for v3-aware readers.
/// The payload is byte-identical to the `chara` chunk.
pub const CCV3_KEYWORD: &str = "ccv3";

/// tEXt keyword carrying the native full-fidelity envelope.
pub const NATIVE_KEYWORD: &str = "swelld";

/// `spec` identifier of the interchange card format.
pub const CARD_SPEC: &str = "chara_card_v3";

/// `spec_version` of the interchange card format.
pub const CARD_SPEC_VERSION: &str = "3.0";

/// `type` identifier of the native export envelope.
pub const NATIVE_TYPE: &str = "swelldreams-character";

/// Envelope format version. Bumped when the native schema changes shape.
pub const NATIVE_VERSION: &str = "1.5";

/// Lorebook scan depth written on every exported card.
pub const LOREBOOK_SCAN_DEPTH: u32 = 10;

/// Lorebook token budget written on every exported card.
pub const LOREBOOK_TOKEN_BUDGET: u32 = 2048;

/// Base for `insertion_order` values of lore entries without an explicit
/// priority. Entry `i` gets `100 + i`, preserving source order.
pub const LOREBOOK_ORDER_BASE: i64 = 100;

/// Edge length of the square placeholder avatar, in pixels.
pub const PLACEHOLDER_SIZE: u32 = 256;
