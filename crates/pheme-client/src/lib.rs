pub mod browser;
pub mod driver;

pub use browser::BrowserSession;
pub use driver::CdpDriver;
