pub const APP_NAME: &str = "Trade Tariff Monitor";
pub const APP_REPO_URL: &str = "https://github.com/skynatbs/trade_tariff_monitor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// User agent sent with every API request.
pub fn user_agent() -> String {
    format!("trade-tariff-monitor/{} (+{})", version_label(), APP_REPO_URL)
}
