//! Routes records emitted through the `log` facade into the tagged logger
use super::levels::LogLevel;
use super::tags::LogTag;
use std::sync::Once;

static INSTALL: Once = Once::new();

struct FacadeBridge;

static BRIDGE: FacadeBridge = FacadeBridge;

impl log::Log for FacadeBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        // Dependency chatter below info only matters when verbose
        metadata.level() <= log::Level::Info || super::get_logger_config().verbose
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = LogTag::Other(record.target().split("::").next().unwrap_or("deps").to_string());
        let message = record.args().to_string();
        super::core::log_internal(tag, LogLevel::from_log_level(record.level()), &message);
    }

    fn flush(&self) {}
}

pub fn install() {
    INSTALL.call_once(|| {
        if log::set_logger(&BRIDGE).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_is_idempotent() {
        install();
        install();

        assert_eq!(log::max_level(), log::LevelFilter::Trace);
        assert!(log::logger().enabled(
            &log::Metadata::builder().level(log::Level::Warn).target("reqwest").build()
        ));
        log::warn!(target: "reqwest", "routed through the tagged logger");
    }
}
