pub mod autoclick;
pub mod capture;
pub mod click;
pub mod settings;

pub use autoclick::{
    ClickEngine, ClickerCommand, ClickerError, ClickerEvent, ClickerResult, ClickerState,
    ClickerStats, MatchCondition, RunSession, SearchRegion, create_clicker_channels,
};
pub use capture::{MonitorInfo, ScreenGrabber, ScreenRect, XcapGrabber, primary_monitor};
pub use click::{EnigoClicker, MouseClicker};
pub use settings::Settings;
