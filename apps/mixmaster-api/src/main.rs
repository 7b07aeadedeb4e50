use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mixmaster_api::Args::parse();

	mixmaster_api::run(args).await
}
