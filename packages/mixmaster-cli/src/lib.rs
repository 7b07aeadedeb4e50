use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");

/// Default config path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "mixmaster.toml";

/// Help styling shared by every mixmaster binary.
pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Magenta.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[cfg(test)]
mod tests {
	#[test]
	fn version_starts_with_package_version() {
		assert!(super::VERSION.starts_with(env!("CARGO_PKG_VERSION")));
	}
}
