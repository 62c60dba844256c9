//! All Paths are recorded here for use throughout this codebase
pub mod base {
    pub const ROOT: &str = "/";
    pub const HEALTH: &str = "/health";
    pub const ABOUT: &str = "/about";
}

pub mod broadcasts {
    pub const COLLECTION: &str = "/broadcasts";
    pub const ITEM: &str = "/broadcasts/:job_id";
    pub const CONFIRM: &str = "/broadcasts/:job_id/confirm";
    pub const DECLINE: &str = "/broadcasts/:job_id/decline";
    pub const CANCEL: &str = "/broadcasts/:job_id/cancel";
    pub const CANCEL_ALL: &str = "/broadcasts/cancel-all";
}

pub mod pacer {
    pub const STATUS: &str = "/pacer";
    pub const RESET: &str = "/pacer/reset";
}

pub fn broadcast_item_path(job_id: u64) -> String {
    broadcasts::ITEM.replace(":job_id", &job_id.to_string())
}
