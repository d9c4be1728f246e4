pub const EXPERIMENT_DECISIONS_COUNTER: &str = "experiments_decisions_total";
pub const EXPERIMENT_REQUESTS_COUNTER: &str = "experiments_requests_total";
pub const LANDING_DECISIONS_COUNTER: &str = "experiments_landing_decisions_total";
pub const HTTP_REQUESTS_COUNTER: &str = "http_requests_total";
pub const HTTP_REQUESTS_DURATION: &str = "http_requests_duration_seconds";
