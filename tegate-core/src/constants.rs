//! Defaults for the upstream API and the fetch pipeline.

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Base URL of the Trading Economics API.
pub const DEFAULT_BASE_URL: &str = "https://api.tradingeconomics.com";

/// Public guest credential accepted by the free tier.
pub const DEFAULT_API_KEY: &str = "guest:guest";

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "c";

/// Query parameter selecting the output format.
pub const FORMAT_PARAM: &str = "f";

/// Output format requested on every call.
pub const FORMAT_JSON: &str = "json";

// ═══════════════════════════════════════════════════════════════════════════════
// RATE GATE & CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum spacing between outbound calls. The free tier asks for 2s.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 2_000;

/// How long a successful response stays fresh (15 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// RETRY SCHEDULE
// ═══════════════════════════════════════════════════════════════════════════════

/// Total attempts per logical call: the first attempt plus four retries.
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay before the first retry. Doubles on each further retry.
pub const BACKOFF_BASE_MS: u64 = 2_000;

/// Upper bound on the exponential part of the delay.
pub const BACKOFF_CAP_MS: u64 = 15_000;

/// Jitter is drawn from `[0, BACKOFF_JITTER_MS)`.
pub const BACKOFF_JITTER_MS: u64 = 250;

/// Status codes retried besides the 5xx range.
pub const RETRYABLE_STATUSES: [u16; 2] = [409, 429];
